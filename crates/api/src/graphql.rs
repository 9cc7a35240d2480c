// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{net::IpAddr, sync::Arc};

use juniper::EmptySubscription;
pub use mutation::Mutation;
pub use query::Query;

use crate::{auth::CallerContext, error::ServiceError, store::Store};

mod handlers;
mod mutation;
mod query;

/// Process-wide state shared by every request.
#[derive(Clone)]
pub struct BaseContext {
    pub store: Arc<dyn Store>,
    pub keypair: ed25519_dalek::SigningKey,
}

/// Per-request context: the shared state plus who is asking.
pub struct Context {
    base: BaseContext,
    ip: IpAddr,
    user_agent: String,
    caller: Option<CallerContext>,
}

impl juniper::Context for Context {}

impl Context {
    pub fn new(
        base: BaseContext,
        ip: IpAddr,
        user_agent: String,
        caller: Option<CallerContext>,
    ) -> Self {
        Self {
            base,
            ip,
            user_agent,
            caller,
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.base.store.as_ref()
    }

    pub fn caller(&self) -> Option<&CallerContext> {
        self.caller.as_ref()
    }

    pub fn get_ip(&self) -> &IpAddr {
        &self.ip
    }

    pub fn get_user_agent(&self) -> &str {
        &self.user_agent
    }
}

/// Parses an id argument, naming the argument in the error.
pub fn parse_id(raw: &str, what: &str) -> Result<uuid::Uuid, ServiceError> {
    uuid::Uuid::parse_str(raw.trim())
        .map_err(|_| ServiceError::BadRequest(format!("{what} tidak valid")))
}

pub type Schema = juniper::RootNode<Query, Mutation, EmptySubscription<Context>>;

pub fn schema() -> Schema {
    juniper::RootNode::new(Query, Mutation, EmptySubscription::new())
}
