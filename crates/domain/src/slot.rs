//! Slot — a fragrance cartridge bay on a diffuser.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;
use crate::value::{coerce_int, display};

/// One of the two fragrance bays. Single-bay devices only use [`Slot::One`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Slot {
    One,
    Two,
}

impl Slot {
    /// Every slot, in ascending order.
    pub const ALL: [Slot; 2] = [Slot::One, Slot::Two];

    /// Numeric bay identifier (`1` or `2`).
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    /// Parse an optional service-call field.
    ///
    /// Integers and numeric strings are accepted. `null` or an empty string
    /// mean "not given" and yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidSlot`] for anything else.
    pub fn from_value(value: &Value) -> Result<Option<Self>, ValidationError> {
        match value {
            Value::Null => return Ok(None),
            Value::String(s) if s.trim().is_empty() => return Ok(None),
            _ => {}
        }
        coerce_int(value)
            .and_then(|n| Self::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| ValidationError::InvalidSlot {
                slot: display(value),
                device: None,
            })
    }
}

impl TryFrom<i64> for Slot {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(ValidationError::InvalidSlot {
                slot: other.to_string(),
                device: None,
            }),
        }
    }
}

impl TryFrom<u8> for Slot {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(value))
    }
}

impl From<Slot> for u8 {
    fn from(slot: Slot) -> Self {
        slot.number()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}
