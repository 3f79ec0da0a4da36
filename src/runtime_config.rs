//! # Runtime Configuration Module
//!
//! Environment-variable configuration for the contract-test runtime: where
//! durable spec-cache entries live and which execution partition this
//! process belongs to.
//!
//! ## Environment Variables
//!
//! ### `BRRTR_CONTRACT_CACHE`
//!
//! `off`, `false` or `0` disables the durable cache layer. The in-memory
//! index is always used. Default: on.
//!
//! ### `BRRTR_CONTRACT_CACHE_DIR`
//!
//! Directory for durable cache entries. Default: the platform temp directory.
//!
//! ### `BRRTR_CONTRACT_PARTITION`
//!
//! Execution-partition token. Parallel test runners give every worker
//! process its own token so workers never read each other's entries. Falls
//! back to `TEST_TOKEN`, then to the empty string.
//!
//! ## Usage
//!
//! ```rust
//! use brrtrouter_contract::runtime_config::ContractConfig;
//!
//! let config = ContractConfig::from_env();
//! println!("Durable cache: {:?}", config.cache_dir);
//! ```
//!
//! ```bash
//! # Isolate two workers sharing /tmp
//! BRRTR_CONTRACT_PARTITION=1 cargo test &
//! BRRTR_CONTRACT_PARTITION=2 cargo test &
//! ```

use std::env;
use std::path::PathBuf;

/// Spec-cache configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractConfig {
    /// Directory for durable entries, `None` when the durable layer is off
    pub cache_dir: Option<PathBuf>,
    /// Execution-partition token (may be empty)
    pub partition: String,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            cache_dir: Some(env::temp_dir()),
            partition: String::new(),
        }
    }
}

impl ContractConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let enabled = !matches!(
            lookup("BRRTR_CONTRACT_CACHE")
                .map(|v| v.trim().to_ascii_lowercase())
                .as_deref(),
            Some("off" | "false" | "0")
        );

        let cache_dir = enabled.then(|| {
            lookup("BRRTR_CONTRACT_CACHE_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir)
        });

        let partition = lookup("BRRTR_CONTRACT_PARTITION")
            .or_else(|| lookup("TEST_TOKEN"))
            .unwrap_or_default();

        ContractConfig {
            cache_dir,
            partition,
        }
    }

    /// Memory index only, nothing written to disk.
    pub fn memory_only() -> Self {
        Self {
            cache_dir: None,
            partition: String::new(),
        }
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn with_partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = partition.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ContractConfig::from_lookup(lookup(&[]));
        assert_eq!(config.cache_dir, Some(env::temp_dir()));
        assert_eq!(config.partition, "");
    }

    #[test]
    fn test_cache_disabled() {
        for value in ["off", "FALSE", "0"] {
            let config = ContractConfig::from_lookup(lookup(&[
                ("BRRTR_CONTRACT_CACHE", value),
                ("BRRTR_CONTRACT_CACHE_DIR", "/var/cache/contracts"),
            ]));
            assert_eq!(config.cache_dir, None, "value {value}");
        }
    }

    #[test]
    fn test_cache_dir_override() {
        let config = ContractConfig::from_lookup(lookup(&[(
            "BRRTR_CONTRACT_CACHE_DIR",
            "/var/cache/contracts",
        )]));
        assert_eq!(config.cache_dir, Some(PathBuf::from("/var/cache/contracts")));
    }

    #[test]
    fn test_partition_falls_back_to_test_token() {
        let config = ContractConfig::from_lookup(lookup(&[("TEST_TOKEN", "3")]));
        assert_eq!(config.partition, "3");

        let config = ContractConfig::from_lookup(lookup(&[
            ("TEST_TOKEN", "3"),
            ("BRRTR_CONTRACT_PARTITION", "worker-7"),
        ]));
        assert_eq!(config.partition, "worker-7");
    }
}
