//! Parameter descriptors — declared, typed, validated algorithm inputs.
//!
//! Every indicator kind publishes a static table of descriptors. Raw values
//! arrive as a `ParamMap` (from code, a settings file or the command line) and
//! are resolved against that table before any computation object exists.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Caller-supplied parameter values, keyed by name.
///
/// `BTreeMap` keeps iteration (and therefore hashing) order deterministic.
pub type ParamMap = BTreeMap<String, ParamValue>;

/// A raw parameter value as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Numeric view of a resolved value. Text yields `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(i) => Some(*i as f64),
            ParamValue::Float(f) => Some(*f),
            ParamValue::Text(_) => None,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::Float(x) => write!(f, "{x}"),
            ParamValue::Text(s) => write!(f, "{s:?}"),
        }
    }
}

/// Declared type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Float,
    Integer,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKind::Float => f.write_str("float"),
            ParamKind::Integer => f.write_str("integer"),
        }
    }
}

/// Fatal parameter problems, raised at construction time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParameterError {
    #[error("missing required parameter '{name}'")]
    Missing { name: String },

    #[error("parameter '{name}' expects {expected}, got {found}")]
    WrongType {
        name: String,
        expected: ParamKind,
        found: String,
    },

    #[error("parameter '{name}' = {value} violates constraint ({rule})")]
    Invalid {
        name: String,
        value: f64,
        rule: &'static str,
    },

    #[error("unknown parameter '{name}' (accepted: {accepted})")]
    Unknown { name: String, accepted: String },
}

/// One named input of an indicator.
#[derive(Debug, Clone)]
pub struct ParameterDescriptor {
    pub name: &'static str,
    /// `None` means the caller must supply a value.
    pub default: Option<f64>,
    pub kind: ParamKind,
    pub description: &'static str,
    /// Human-readable form of `validity`, used in error messages.
    pub rule: &'static str,
    pub validity: fn(f64) -> bool,
}

impl ParameterDescriptor {
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    /// Coerce and validate a supplied value, falling back to the default.
    pub fn resolve(&self, provided: Option<&ParamValue>) -> Result<ParamValue, ParameterError> {
        let value = match provided {
            Some(raw) => self.coerce(raw)?,
            None => match self.default {
                Some(default) => default,
                None => {
                    return Err(ParameterError::Missing {
                        name: self.name.to_string(),
                    })
                }
            },
        };

        if !value.is_finite() || !(self.validity)(value) {
            return Err(ParameterError::Invalid {
                name: self.name.to_string(),
                value,
                rule: self.rule,
            });
        }

        Ok(match self.kind {
            ParamKind::Float => ParamValue::Float(value),
            ParamKind::Integer => ParamValue::Int(value as i64),
        })
    }

    /// Numeric shorthand for [`ParameterDescriptor::resolve`].
    pub fn resolve_f64(&self, provided: Option<&ParamValue>) -> Result<f64, ParameterError> {
        let resolved = self.resolve(provided)?;
        // resolve() only ever returns numeric variants
        Ok(resolved.as_f64().unwrap_or(f64::NAN))
    }

    fn coerce(&self, raw: &ParamValue) -> Result<f64, ParameterError> {
        let wrong_type = || ParameterError::WrongType {
            name: self.name.to_string(),
            expected: self.kind,
            found: raw.to_string(),
        };
        match (self.kind, raw) {
            (ParamKind::Float, ParamValue::Float(f)) => Ok(*f),
            (ParamKind::Float, ParamValue::Int(i)) => Ok(*i as f64),
            (ParamKind::Float, ParamValue::Text(s)) => s.trim().parse().map_err(|_| wrong_type()),
            (ParamKind::Integer, ParamValue::Int(i)) => Ok(*i as f64),
            (ParamKind::Integer, ParamValue::Float(f)) if f.fract() == 0.0 => Ok(*f),
            (ParamKind::Integer, ParamValue::Float(_)) => Err(wrong_type()),
            (ParamKind::Integer, ParamValue::Text(s)) => s
                .trim()
                .parse::<i64>()
                .map(|i| i as f64)
                .map_err(|_| wrong_type()),
        }
    }
}

/// Reject names in `provided` that no descriptor declares.
pub fn check_known(
    descriptors: &[ParameterDescriptor],
    provided: &ParamMap,
) -> Result<(), ParameterError> {
    for name in provided.keys() {
        if !descriptors.iter().any(|d| d.name == name) {
            let accepted = descriptors
                .iter()
                .map(|d| d.name)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ParameterError::Unknown {
                name: name.clone(),
                accepted,
            });
        }
    }
    Ok(())
}

/// Validity predicate shared by every amplitude/time parameter.
pub fn positive(x: f64) -> bool {
    x > 0.0
}
