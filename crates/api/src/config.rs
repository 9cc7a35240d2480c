// SPDX-FileCopyrightText: 2025 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use ed25519_dalek::SigningKey;
use thiserror::Error;

const DEFAULT_LISTEN_ADDR: &str = "[::]:3000";
const DEFAULT_SIGNING_KEY_FILE: &str = "key.json";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable {0} must be set")]
    MissingVar(&'static str),
    #[error("Invalid LISTEN_ADDR {0}: {1}")]
    InvalidListenAddr(String, std::net::AddrParseError),
    #[error("Failed to access signing key file {0}: {1}")]
    SigningKeyIo(PathBuf, std::io::Error),
    #[error("Signing key file {0} is malformed: {1}")]
    SigningKeyFormat(PathBuf, serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub listen_addr: SocketAddr,
    pub signing_key_file: PathBuf,
    pub log_filter: String,
}

impl Config {
    /// Reads the process environment, after loading `.env` if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("Ignoring unreadable .env file: {e}");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::MissingVar("DATABASE_URL"))?;
        let listen_addr = lookup("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen_addr
            .parse()
            .map_err(|e| ConfigError::InvalidListenAddr(listen_addr.clone(), e))?;
        Ok(Self {
            database_url,
            listen_addr,
            signing_key_file: lookup("SIGNING_KEY_FILE")
                .unwrap_or_else(|| DEFAULT_SIGNING_KEY_FILE.to_string())
                .into(),
            log_filter: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    pub fn signing_key(&self) -> Result<SigningKey, ConfigError> {
        load_or_generate_signing_key(&self.signing_key_file)
    }
}

/// Loads the token signing key, creating and persisting one on first start.
pub fn load_or_generate_signing_key(key_file: &Path) -> Result<SigningKey, ConfigError> {
    let io_err = |e| ConfigError::SigningKeyIo(key_file.to_path_buf(), e);
    let format_err = |e| ConfigError::SigningKeyFormat(key_file.to_path_buf(), e);

    if !key_file.exists() {
        let mut csprng = rand::rngs::OsRng;
        let signing_key = SigningKey::generate(&mut csprng);
        let keypair_json = serde_json::to_string_pretty(&signing_key).map_err(format_err)?;
        std::fs::write(key_file, keypair_json).map_err(io_err)?;
        tracing::info!("Generated new signing key and saved to {}", key_file.display());
        return Ok(signing_key);
    }
    let keypair_json = std::fs::read_to_string(key_file).map_err(io_err)?;
    serde_json::from_str(&keypair_json).map_err(format_err)
}
