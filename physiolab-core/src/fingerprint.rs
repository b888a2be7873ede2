//! Content fingerprints — deterministic identities for signals and configs.
//!
//! - `SignalHash`: BLAKE3 over the sample bits and the time axis. Two signals
//!   with the same content hash identically, wherever they live in memory.
//! - `ConfigHash`: BLAKE3 over an indicator kind + its resolved parameters.
//! - `CacheKey`: the pair, used to memoize indicator results.

use crate::signal::{Signal, TimeAxis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Content hash of a signal (hex BLAKE3).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalHash(pub String);

impl SignalHash {
    pub fn of(signal: &Signal) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(signal.len() as u64).to_le_bytes());
        for v in signal.values() {
            hasher.update(&v.to_bits().to_le_bytes());
        }
        match signal.axis() {
            TimeAxis::Uniform { fs } => {
                hasher.update(b"uniform");
                hasher.update(&fs.to_bits().to_le_bytes());
            }
            TimeAxis::Explicit { times } => {
                hasher.update(b"explicit");
                for t in times {
                    hasher.update(&t.to_bits().to_le_bytes());
                }
            }
        }
        Self(hasher.finalize().to_hex().to_string())
    }
}

impl fmt::Display for SignalHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Indicator kind plus resolved parameter values.
///
/// Uses `BTreeMap` for deterministic key ordering during serialization → hashing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub kind: String,
    pub params: BTreeMap<String, f64>,
}

impl IndicatorConfig {
    pub fn config_hash(&self) -> ConfigHash {
        // BTreeMap keeps key order stable
        let json = serde_json::to_string(self).expect("IndicatorConfig must serialize");
        ConfigHash(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

/// Hash of an `IndicatorConfig` (hex BLAKE3).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigHash(pub String);

impl fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Memoization key: which indicator, with which parameters, on which data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub config: ConfigHash,
    pub signal: SignalHash,
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // short prefixes are plenty for log lines
        let c = self.config.0.get(..12).unwrap_or(&self.config.0);
        let s = self.signal.0.get(..12).unwrap_or(&self.signal.0);
        write!(f, "{c}:{s}")
    }
}
