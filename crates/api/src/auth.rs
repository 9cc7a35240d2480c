// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{net::IpAddr, time::Duration};

use base64::prelude::*;
use ed25519_dalek::{
    Signature, SignatureError, SigningKey, Verifier, VerifyingKey, ed25519::signature::Signer,
};
use hyper::HeaderMap;
use juniper::GraphQLEnum;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Site-wide role issued by the identity provider.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize, Clone, Copy, Ord, PartialOrd, GraphQLEnum)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Member,
    Organizer,
    Admin,
}

/// The resolved caller of a request. Passed explicitly into every service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    pub user_id: uuid::Uuid,
    pub role: UserRole,
    pub username: String,
}

const ALGORITHM: &str = "EdDSA";

#[derive(Serialize, Deserialize)]
struct JwtHeader {
    alg: String,
    typ: String,
}

/// Claims of an access token. `Inner` carries the issuer-specific fields.
#[derive(Serialize, Deserialize)]
#[serde(bound = "Inner: Serialize + DeserializeOwned")]
pub struct JwtPayload<Inner: DeserializeOwned> {
    #[serde(flatten)]
    pub custom_fields: Inner,
    pub sub: uuid::Uuid,
    #[serde(default)]
    pub aud: Vec<String>,
    exp: i64,
    iat: i64,
    nbf: i64,
}

impl<Inner: DeserializeOwned> JwtPayload<Inner> {
    pub fn new_with_duration(
        sub: uuid::Uuid,
        aud: Vec<String>,
        custom_fields: Inner,
        valid_for: Duration,
    ) -> Self {
        let issued_at = chrono::Utc::now().timestamp();
        let lifetime = i64::try_from(valid_for.as_secs()).unwrap_or(i64::MAX);
        Self {
            sub,
            aud,
            custom_fields,
            iat: issued_at,
            nbf: issued_at,
            exp: issued_at.saturating_add(lifetime),
        }
    }

    pub fn is_valid_at(&self, timestamp: i64) -> bool {
        (self.nbf..=self.exp).contains(&timestamp)
    }
}

/// Custom claims issued by the identity provider.
#[derive(Serialize, Deserialize)]
pub struct AuthJwtPayload {
    pub role: UserRole,
    pub username: String,
}

#[derive(Error, Debug)]
pub enum JwtValidationError {
    #[error("Invalid JWT format")]
    InvalidFormat,
    #[error("Base64 decoding error: {0}")]
    Base64DecodingError(#[from] base64::DecodeError),
    #[error("Unsupported JWT algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("Invalid JWT signature: {0}")]
    InvalidSignature(#[from] SignatureError),
    #[error("JWT parsing error: {0}")]
    ParsingError(#[from] serde_json::Error),
    #[error("JWT is not valid at the current time")]
    InvalidTime,
}

#[derive(Error, Debug)]
pub enum JwtGenerationError {
    #[error("JWT signing error: {0}")]
    SigningError(#[from] SignatureError),
    #[error("JWT serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Checks header and signature, then decodes and time-checks the claims.
pub fn parse_and_validate_jwt<T: DeserializeOwned + Serialize>(
    token: &str,
    verifying_key: &VerifyingKey,
) -> Result<JwtPayload<T>, JwtValidationError> {
    let mut segments = token.split('.');
    let (Some(header_segment), Some(payload_segment), Some(signature_segment), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(JwtValidationError::InvalidFormat);
    };

    let header: JwtHeader = serde_json::from_slice(&BASE64_URL_SAFE.decode(header_segment)?)?;
    if header.alg != ALGORITHM {
        return Err(JwtValidationError::UnsupportedAlgorithm(header.alg));
    }

    let signature = Signature::from_slice(&BASE64_URL_SAFE.decode(signature_segment)?)?;
    let signed_data = &token[..header_segment.len() + 1 + payload_segment.len()];
    verifying_key.verify(signed_data.as_bytes(), &signature)?;

    let payload: JwtPayload<T> =
        serde_json::from_slice(&BASE64_URL_SAFE.decode(payload_segment)?)?;
    if !payload.is_valid_at(chrono::Utc::now().timestamp()) {
        return Err(JwtValidationError::InvalidTime);
    }
    Ok(payload)
}

pub fn generate_jwt<T: Serialize>(
    payload: &T,
    signing_key: &SigningKey,
) -> Result<String, JwtGenerationError> {
    let header = JwtHeader {
        alg: ALGORITHM.to_string(),
        typ: "JWT".to_string(),
    };
    let signing_input = format!(
        "{}.{}",
        BASE64_URL_SAFE.encode(serde_json::to_vec(&header)?),
        BASE64_URL_SAFE.encode(serde_json::to_vec(payload)?)
    );
    let signature: Signature = signing_key.try_sign(signing_input.as_bytes())?;
    Ok(format!(
        "{signing_input}.{}",
        BASE64_URL_SAFE.encode(signature.to_bytes())
    ))
}

/// Resolves the caller from a `Bearer` access token. Invalid tokens yield an anonymous caller.
pub fn caller_from_headers(
    headers: &HeaderMap,
    verifying_key: &VerifyingKey,
) -> Option<CallerContext> {
    let auth_str = headers.get("authorization")?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?;
    match parse_and_validate_jwt::<AuthJwtPayload>(token, verifying_key) {
        Ok(jwt) => Some(CallerContext {
            user_id: jwt.sub,
            role: jwt.custom_fields.role,
            username: jwt.custom_fields.username,
        }),
        Err(e) => {
            tracing::debug!("Ignoring invalid access token: {e}");
            None
        }
    }
}

fn is_private(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => ipv4.is_private() || ipv4.is_loopback(),
        IpAddr::V6(ipv6) => ipv6.is_unique_local() || ipv6.is_loopback(),
    }
}

/// Uses the first public `X-Forwarded-For` hop when the peer is a private proxy.
pub fn client_ip(remote_ip: IpAddr, headers: &HeaderMap) -> IpAddr {
    if !is_private(&remote_ip) {
        return remote_ip;
    }
    headers
        .get("x-forwarded-for")
        .and_then(|xff| xff.to_str().ok())
        .and_then(|xff_str| {
            xff_str
                .split(',')
                .filter_map(|ip_str| ip_str.trim().parse::<IpAddr>().ok())
                .find(|ip| !is_private(ip))
        })
        .unwrap_or(remote_ip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn token_for(signing_key: &SigningKey, sub: uuid::Uuid, valid: Duration) -> String {
        let jwt_payload = JwtPayload::new_with_duration(
            sub,
            Vec::new(),
            AuthJwtPayload {
                role: UserRole::Member,
                username: "testuser".to_string(),
            },
            valid,
        );
        generate_jwt(&jwt_payload, signing_key).expect("Failed to generate JWT")
    }

    #[test]
    fn test_jwt_generation_and_validation() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let verifying_key = VerifyingKey::from(&signing_key);
        let sub = uuid::Uuid::now_v7();

        let token = token_for(&signing_key, sub, Duration::from_secs(3600));
        let parsed_payload: JwtPayload<AuthJwtPayload> =
            parse_and_validate_jwt(&token, &verifying_key).expect("Failed to parse JWT");

        assert_eq!(parsed_payload.sub, sub);
        assert_eq!(parsed_payload.custom_fields.role, UserRole::Member);
    }

    #[test]
    fn test_jwt_invalid_signature() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let another_signing_key = SigningKey::generate(&mut OsRng);
        let another_verifying_key = VerifyingKey::from(&another_signing_key);

        let token = token_for(&signing_key, uuid::Uuid::now_v7(), Duration::from_secs(3600));
        let result = parse_and_validate_jwt::<AuthJwtPayload>(&token, &another_verifying_key);
        assert!(matches!(
            result,
            Err(JwtValidationError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_jwt_invalid_time() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let verifying_key = VerifyingKey::from(&signing_key);
        // Expired immediately
        let token = token_for(&signing_key, uuid::Uuid::now_v7(), Duration::from_secs(0));
        std::thread::sleep(std::time::Duration::from_secs(1));
        let result = parse_and_validate_jwt::<AuthJwtPayload>(&token, &verifying_key);
        assert!(matches!(result, Err(JwtValidationError::InvalidTime)));
    }

    #[test]
    fn test_jwt_rejects_malformed_and_foreign_tokens() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let verifying_key = signing_key.verifying_key();
        assert!(matches!(
            parse_and_validate_jwt::<AuthJwtPayload>("a.b", &verifying_key),
            Err(JwtValidationError::InvalidFormat)
        ));

        let token = token_for(&signing_key, uuid::Uuid::now_v7(), Duration::from_secs(60));
        let (_, rest) = token.split_once('.').unwrap();
        let hs256 = BASE64_URL_SAFE.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        assert!(matches!(
            parse_and_validate_jwt::<AuthJwtPayload>(&format!("{hs256}.{rest}"), &verifying_key),
            Err(JwtValidationError::UnsupportedAlgorithm(alg)) if alg == "HS256"
        ));
    }

    #[test]
    fn test_caller_from_headers() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let sub = uuid::Uuid::now_v7();
        let token = token_for(&signing_key, sub, Duration::from_secs(3600));

        let mut headers = HeaderMap::new();
        assert_eq!(caller_from_headers(&headers, &signing_key.verifying_key()), None);

        headers.insert("authorization", format!("Bearer {token}").parse().unwrap());
        let caller = caller_from_headers(&headers, &signing_key.verifying_key()).unwrap();
        assert_eq!(caller.user_id, sub);
        assert_eq!(caller.username, "testuser");

        headers.insert("authorization", "Bearer garbage".parse().unwrap());
        assert_eq!(caller_from_headers(&headers, &signing_key.verifying_key()), None);
    }

    #[test]
    fn test_client_ip_prefers_public_forwarded_hop() {
        let proxy: IpAddr = "10.0.0.2".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(proxy, &headers), proxy);

        headers.insert(
            "x-forwarded-for",
            "192.168.1.4, 203.0.113.9, 198.51.100.1".parse().unwrap(),
        );
        assert_eq!(
            client_ip(proxy, &headers),
            "203.0.113.9".parse::<IpAddr>().unwrap()
        );

        let public: IpAddr = "198.51.100.7".parse().unwrap();
        assert_eq!(client_ip(public, &headers), public);
    }
}
