//! Environment configuration.
//!
//! Values come from process environment variables, with `.env` loaded by
//! `main` beforehand. Parsing goes through a lookup function so tests can
//! supply their own environment.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Which store backs the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Neo4j,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neo4jSettings {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: Option<String>,
    pub max_connections: usize,
    pub fetch_size: usize,
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub backend: Backend,
    /// Present only for the Neo4j backend.
    pub neo4j: Option<Neo4jSettings>,
    pub export_dir: PathBuf,
    pub server_host: String,
    pub server_port: u16,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("STORYGRAPH_BACKEND").as_deref() {
            None | Some("neo4j") => Backend::Neo4j,
            Some("memory") => Backend::Memory,
            Some(other) => {
                return Err(SettingsError::Invalid {
                    var: "STORYGRAPH_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let neo4j = match backend {
            Backend::Neo4j => Some(Neo4jSettings {
                uri: lookup("NEO4J_URI").unwrap_or_else(|| "bolt://localhost:7687".into()),
                user: lookup("NEO4J_USER")
                    .or_else(|| lookup("NEO4J_USERNAME"))
                    .unwrap_or_else(|| "neo4j".into()),
                password: lookup("NEO4J_PASSWORD")
                    .filter(|p| !p.is_empty())
                    .ok_or(SettingsError::Missing("NEO4J_PASSWORD"))?,
                database: lookup("NEO4J_DATABASE").filter(|d| !d.is_empty()),
                max_connections: parse_or(&lookup, "NEO4J_MAX_CONNECTIONS", 50)?,
                fetch_size: parse_or(&lookup, "NEO4J_FETCH_SIZE", 200)?,
                connect_timeout: Duration::from_secs(parse_or(
                    &lookup,
                    "NEO4J_CONNECT_TIMEOUT_SECS",
                    10,
                )?),
            }),
            Backend::Memory => None,
        };

        let server_port = match lookup("SERVER_PORT").or_else(|| lookup("PORT")) {
            Some(raw) => raw.parse().map_err(|_| SettingsError::Invalid {
                var: "SERVER_PORT",
                value: raw,
            })?,
            None => 3000,
        };

        Ok(Self {
            backend,
            neo4j,
            export_dir: lookup("PROFILE_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("memory/character")),
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port,
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, SettingsError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        Some(raw) => raw
            .parse()
            .map_err(|_| SettingsError::Invalid { var, value: raw }),
        None => Ok(default),
    }
}
