//! Configuration errors.
//!
//! Tunables are validated once, when a controller or camera is built from
//! settings. Nothing in the per-tick path returns these errors.

use thiserror::Error;

/// Result alias for configuration checks.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Rejected configuration value.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Value is NaN or infinite.
    #[error("{field} must be finite (got {value})")]
    NonFinite { field: &'static str, value: f32 },

    /// Value must be zero or greater.
    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f32 },

    /// Value must be strictly greater than zero.
    #[error("{field} must be greater than zero (got {value})")]
    NotPositive { field: &'static str, value: f32 },

    /// Value must lie inside an inclusive range.
    #[error("{field} must be within [{min}, {max}] (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    /// Value must be strictly below `limit`.
    #[error("{field} must be below {limit} (got {value})")]
    NotBelow {
        field: &'static str,
        value: f32,
        limit: f32,
    },

    /// Two related values are in the wrong order.
    #[error("{lower} ({lower_value}) must not exceed {upper} ({upper_value})")]
    Ordering {
        lower: &'static str,
        lower_value: f32,
        upper: &'static str,
        upper_value: f32,
    },

    /// A keybind names a key we cannot map.
    #[error("unknown key `{key}` bound to action `{action}`")]
    UnknownKey { action: String, key: String },

    /// One key bound to two actions.
    #[error("key `{key}` is bound to both `{first}` and `{second}`")]
    DuplicateKey {
        key: String,
        first: &'static str,
        second: &'static str,
    },

    /// A keybind names an action outside the fixed vocabulary.
    #[error("unknown action `{0}` in keybinds")]
    UnknownAction(String),

    /// The settings directory watcher could not be created.
    #[error("settings watcher error: {0}")]
    Watch(#[from] notify::Error),
}

/// Reject NaN/inf.
pub(crate) fn finite(field: &'static str, value: f32) -> Result<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { field, value })
    }
}

/// Finite and `>= 0`.
pub(crate) fn non_negative(field: &'static str, value: f32) -> Result<f32> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(value)
}

/// Finite and `> 0`.
pub(crate) fn positive(field: &'static str, value: f32) -> Result<f32> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(ConfigError::NotPositive { field, value });
    }
    Ok(value)
}

/// Finite and inside `[min, max]`.
pub(crate) fn in_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<f32> {
    finite(field, value)?;
    if value < min || value > max {
        return Err(ConfigError::OutOfRange { field, value, min, max });
    }
    Ok(value)
}

/// Finite and `< limit`.
pub(crate) fn below(field: &'static str, value: f32, limit: f32) -> Result<f32> {
    finite(field, value)?;
    if value >= limit {
        return Err(ConfigError::NotBelow { field, value, limit });
    }
    Ok(value)
}

/// `lower <= upper`, both already known to be finite.
pub(crate) fn ordered(
    (lower, lower_value): (&'static str, f32),
    (upper, upper_value): (&'static str, f32),
) -> Result<()> {
    if lower_value > upper_value {
        return Err(ConfigError::Ordering { lower, lower_value, upper, upper_value });
    }
    Ok(())
}
