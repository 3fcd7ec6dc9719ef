//! Process-wide configuration, loaded once at startup.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default character budget per chunk.
pub const DEFAULT_MAX_CHARS: usize = 12_000;
/// Default page limit per chunk.
pub const DEFAULT_MAX_PAGES_PER_CHUNK: usize = 5;
/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;
/// Timeout for fetching a PDF from a URL.
pub const FETCH_TIMEOUT_SECS: u64 = 60;

/// Limits used when grouping pages into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    #[serde(rename = "maxChars")]
    pub max_chars: usize,
    #[serde(rename = "maxPagesPerChunk")]
    pub max_pages_per_chunk: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            max_pages_per_chunk: DEFAULT_MAX_PAGES_PER_CHUNK,
        }
    }
}

/// Top-level PaperLens configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperLensConfig {
    /// HTTP server port.
    pub port: u16,
    /// Chunking limits.
    pub chunking: ChunkingConfig,
    /// Timeout in seconds for remote PDF fetches.
    pub fetch_timeout_secs: u64,
}

impl Default for PaperLensConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            chunking: ChunkingConfig::default(),
            fetch_timeout_secs: FETCH_TIMEOUT_SECS,
        }
    }
}

impl PaperLensConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = lookup("PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("PORT must be a port number, got {:?}", port)))?;
        }
        if let Some(v) = lookup("PAPERLENS_MAX_CHARS") {
            config.chunking.max_chars = parse_limit("PAPERLENS_MAX_CHARS", &v)?;
        }
        if let Some(v) = lookup("PAPERLENS_MAX_PAGES") {
            config.chunking.max_pages_per_chunk = parse_limit("PAPERLENS_MAX_PAGES", &v)?;
        }

        Ok(config)
    }
}

fn parse_limit(key: &str, value: &str) -> Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::Config(format!(
            "{} must be a positive integer, got {:?}",
            key, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PaperLensConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.chunking.max_chars, 12_000);
        assert_eq!(config.chunking.max_pages_per_chunk, 5);
        assert_eq!(config.fetch_timeout_secs, 60);
    }

    #[test]
    fn test_overrides() {
        let config = PaperLensConfig::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("PAPERLENS_MAX_CHARS", "8000"),
            ("PAPERLENS_MAX_PAGES", "3"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.chunking.max_chars, 8000);
        assert_eq!(config.chunking.max_pages_per_chunk, 3);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let err = PaperLensConfig::from_lookup(lookup(&[("PAPERLENS_MAX_PAGES", "0")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_bad_port_rejected() {
        let err = PaperLensConfig::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
