// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Typed view over the `events.ticket_types` column.
//!
//! Rows written by older admin forms hold either a JSON object or the same
//! object encoded as a JSON string, and prices that are sometimes strings.
//! Everything is reconciled here so the rest of the crate only sees
//! [`TicketTypes`].

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Key of the type derived from the flat `price` column.
pub const IMPLICIT_TICKET_TYPE: &str = "regular";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TicketTypeSpec {
    #[serde(default, deserialize_with = "lenient_amount")]
    pub price: i64,
    /// `None` means unlimited stock.
    #[serde(default, deserialize_with = "lenient_optional_amount")]
    pub available: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketTypes {
    types: BTreeMap<String, TicketTypeSpec>,
    /// The column as stored. Only `available` is ever patched back into it, so
    /// admin fields such as `name` or `benefits` survive a purchase.
    raw: serde_json::Map<String, serde_json::Value>,
    implicit: bool,
}

#[derive(Error, Debug)]
pub enum TicketTypesError {
    #[error("ticket_types column is not a JSON object: {0}")]
    NotAnObject(String),
    #[error("ticket_types column could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReserveError {
    #[error("unknown ticket type {0}")]
    UnknownType(String),
    #[error("not enough tickets left")]
    SoldOut,
    #[error("total price overflows")]
    PriceOverflow,
}

impl TicketTypes {
    pub fn from_column(
        raw: Option<&serde_json::Value>,
        flat_price: Option<i64>,
    ) -> Result<Self, TicketTypesError> {
        let object = match raw {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(encoded)) => {
                let encoded = encoded.trim();
                if encoded.is_empty() {
                    None
                } else {
                    match serde_json::from_str::<serde_json::Value>(encoded)? {
                        serde_json::Value::Null => None,
                        serde_json::Value::Object(map) => Some(map),
                        other => return Err(TicketTypesError::NotAnObject(other.to_string())),
                    }
                }
            }
            Some(serde_json::Value::Object(map)) => Some(map.clone()),
            Some(other) => return Err(TicketTypesError::NotAnObject(other.to_string())),
        };

        match object {
            Some(map) if !map.is_empty() => {
                let mut types = BTreeMap::new();
                for (key, value) in &map {
                    types.insert(
                        key.clone(),
                        serde_json::from_value::<TicketTypeSpec>(value.clone())?,
                    );
                }
                Ok(Self {
                    types,
                    raw: map,
                    implicit: false,
                })
            }
            _ => Ok(Self::implicit(flat_price.unwrap_or(0))),
        }
    }

    fn implicit(price: i64) -> Self {
        let mut types = BTreeMap::new();
        types.insert(
            IMPLICIT_TICKET_TYPE.to_string(),
            TicketTypeSpec {
                price,
                available: None,
            },
        );
        Self {
            types,
            raw: serde_json::Map::new(),
            implicit: true,
        }
    }

    /// True when the map was derived from the flat price and must not be persisted.
    pub fn is_implicit(&self) -> bool {
        self.implicit
    }

    pub fn get(&self, key: &str) -> Option<&TicketTypeSpec> {
        self.types.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TicketTypeSpec)> {
        self.types.iter()
    }

    /// Takes `quantity` tickets out of stock. Unlimited types are left untouched.
    ///
    /// Nothing changes when the total price for `quantity` would overflow.
    pub fn reserve(&mut self, key: &str, quantity: i64) -> Result<TicketTypeSpec, ReserveError> {
        let spec = self
            .types
            .get_mut(key)
            .ok_or_else(|| ReserveError::UnknownType(key.to_string()))?;
        if spec.price.checked_mul(quantity).is_none() {
            return Err(ReserveError::PriceOverflow);
        }
        if let Some(available) = spec.available {
            if available < quantity {
                return Err(ReserveError::SoldOut);
            }
            let left = available - quantity;
            spec.available = Some(left);
            match self.raw.get_mut(key).and_then(|v| v.as_object_mut()) {
                Some(entry) => {
                    entry.insert("available".to_string(), left.into());
                }
                None => {
                    let rewritten = serde_json::to_value(&*spec).unwrap_or_default();
                    self.raw.insert(key.to_string(), rewritten);
                }
            }
        }
        Ok(spec.clone())
    }

    /// The stored column with the reserved stock applied.
    pub fn to_column(&self) -> serde_json::Value {
        serde_json::Value::Object(self.raw.clone())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Amount {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Amount {
    fn into_i64<E: serde::de::Error>(self) -> Result<i64, E> {
        match self {
            Amount::Int(value) => Ok(value),
            Amount::Float(value) => Ok(value.round() as i64),
            Amount::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Ok(0);
                }
                text.parse::<i64>()
                    .or_else(|_| text.parse::<f64>().map(|v| v.round() as i64))
                    .map_err(|_| E::custom(format!("invalid amount {text:?}")))
            }
        }
    }
}

fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match Option::<Amount>::deserialize(deserializer)? {
        Some(amount) => amount.into_i64(),
        None => Ok(0),
    }
}

fn lenient_optional_amount<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<i64>, D::Error> {
    Option::<Amount>::deserialize(deserializer)?
        .map(Amount::into_i64)
        .transpose()
}
