//! Settings — default parameter values and input layout, loaded from TOML.
//!
//! ```toml
//! sampling_rate = 64.0
//!
//! [defaults]
//! delta = 0.5
//! pre_max = 1.0
//!
//! [indicators.peaks_num]
//! delta = 0.8
//!
//! [columns]
//! signal = "bvp"
//! time = "timestamp"
//! separator = ","
//! ```
//!
//! Parameter precedence, lowest first: `[defaults]` (only names the kind
//! declares), `[indicators.<kind>]`, then caller overrides.

use crate::indicators::{Indicator, IndicatorKind, UnknownIndicator};
use crate::params::{ParamMap, ParameterError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse settings TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("settings table [indicators]: {0}")]
    UnknownIndicator(#[from] UnknownIndicator),

    #[error("sampling_rate must be finite and > 0, got {0}")]
    InvalidSamplingRate(f64),
}

/// Where the signal lives in a delimited input file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnSettings {
    pub signal: String,
    pub time: Option<String>,
    pub separator: char,
}

impl Default for ColumnSettings {
    fn default() -> Self {
        Self {
            signal: "signal".to_string(),
            time: None,
            separator: ',',
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Sampling rate in Hz, used when the input has no time column.
    pub sampling_rate: Option<f64>,
    /// Values applied to every indicator that declares the parameter.
    pub defaults: ParamMap,
    /// Per-kind values, keyed by indicator name.
    pub indicators: BTreeMap<String, ParamMap>,
    pub columns: ColumnSettings,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse settings from a TOML string and check indicator names.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        for name in settings.indicators.keys() {
            name.parse::<IndicatorKind>()?;
        }
        if let Some(fs) = settings.sampling_rate {
            if !fs.is_finite() || fs <= 0.0 {
                return Err(SettingsError::InvalidSamplingRate(fs));
            }
        }
        Ok(settings)
    }

    /// Effective raw parameters for `kind`.
    pub fn params_for(&self, kind: IndicatorKind, overrides: &ParamMap) -> ParamMap {
        let declared = kind.descriptors();
        let mut params: ParamMap = self
            .defaults
            .iter()
            .filter(|(name, _)| declared.iter().any(|d| d.name == name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        if let Some(specific) = self.indicators.get(kind.name()) {
            params.extend(specific.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        params.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        params
    }

    /// Build `kind` from these settings plus `overrides`.
    pub fn indicator(
        &self,
        kind: IndicatorKind,
        overrides: &ParamMap,
    ) -> Result<Indicator, ParameterError> {
        Indicator::new(kind, &self.params_for(kind, overrides))
    }
}
