//! # Runtime Configuration Module
//!
//! Environment-driven settings for the dispatcher.
//!
//! ## Environment Variables
//!
//! ### `SWITCHYARD_CONTEXT_POOL`
//!
//! Number of idle request contexts kept for reuse. Accepts decimal
//! (`512`) or hexadecimal (`0x200`). `0` disables pooling.
//!
//! Default: `256`
//!
//! ## Usage
//!
//! ```rust
//! use switchyard::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Context pool: {}", config.context_pool_capacity);
//! ```

use std::env;

/// Default number of pooled contexts
pub const DEFAULT_CONTEXT_POOL: usize = 256;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum idle contexts retained between requests
    pub context_pool_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            context_pool_capacity: DEFAULT_CONTEXT_POOL,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let context_pool_capacity = lookup("SWITCHYARD_CONTEXT_POOL")
            .and_then(|val| parse_size(&val))
            .unwrap_or(DEFAULT_CONTEXT_POOL);
        RuntimeConfig {
            context_pool_capacity,
        }
    }
}

fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    match val.strip_prefix("0x") {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => val.parse().ok(),
    }
}
