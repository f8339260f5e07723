//! Intensity — fragrance strength on the device's 1–10 scale.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::value::{coerce_int, display};

/// Validated fragrance intensity in `1..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Intensity(u8);

impl Intensity {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;
    /// Value calling UIs pre-fill when the user does not choose one.
    pub const DEFAULT: Intensity = Intensity(4);

    /// Validate a raw intensity.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidIntensity`] outside `1..=10`.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidIntensity(value.to_string()))
    }

    /// Parse a required service-call field, coercing numeric strings.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] for `null` and
    /// [`ValidationError::InvalidIntensity`] for anything out of range or
    /// non-numeric.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        if value.is_null() {
            return Err(ValidationError::MissingField("intensity"));
        }
        let raw = coerce_int(value)
            .ok_or_else(|| ValidationError::InvalidIntensity(display(value)))?;
        Self::new(raw)
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Coarse level name used by the diffuser's intensity selector.
    #[must_use]
    pub fn level(self) -> IntensityLevel {
        match self.0 {
            0..=3 => IntensityLevel::Subtle,
            4..=7 => IntensityLevel::Medium,
            _ => IntensityLevel::Strong,
        }
    }
}

impl Default for Intensity {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i64> for Intensity {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Intensity> for u8 {
    fn from(intensity: Intensity) -> Self {
        intensity.0
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Named intensity bands: 1–3 subtle, 4–7 medium, 8–10 strong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntensityLevel {
    Subtle,
    Medium,
    Strong,
}

impl IntensityLevel {
    /// Match a level name, ignoring case and surrounding blanks.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "subtle" => Some(Self::Subtle),
            "medium" => Some(Self::Medium),
            "strong" => Some(Self::Strong),
            _ => None,
        }
    }

    /// Representative 1–10 value sent when a level is picked by name.
    #[must_use]
    pub fn representative(self) -> Intensity {
        match self {
            Self::Subtle => Intensity(3),
            Self::Medium => Intensity(6),
            Self::Strong => Intensity(10),
        }
    }
}

impl fmt::Display for IntensityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subtle => f.write_str("subtle"),
            Self::Medium => f.write_str("medium"),
            Self::Strong => f.write_str("strong"),
        }
    }
}
