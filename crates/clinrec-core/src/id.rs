//! Patient record identifier.
//!
//! The identifier is assigned by the caller at record creation and is
//! immutable afterwards. Uniqueness within the record store is enforced by
//! the store itself.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest accepted patient identifier.
pub const PATIENT_ID_MIN: i64 = 1;

/// Largest accepted patient identifier.
pub const PATIENT_ID_MAX: i64 = 999_999;

/// Error returned when a patient identifier is out of range or malformed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatientIdError {
    #[error("patient id must be between {PATIENT_ID_MIN} and {PATIENT_ID_MAX}, got {0}")]
    OutOfRange(i64),

    #[error("patient id is not a valid integer: {0}")]
    NotAnInteger(String),
}

/// A patient record identifier.
///
/// Wraps the numeric id from the source dataset and guarantees it lies in
/// the accepted range. Serialized as a plain integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(i64);

impl PatientId {
    /// Creates a patient id, validating the accepted range.
    ///
    /// # Errors
    ///
    /// Returns `PatientIdError::OutOfRange` if the value is outside
    /// `PATIENT_ID_MIN..=PATIENT_ID_MAX`.
    pub fn new(value: i64) -> Result<Self, PatientIdError> {
        if (PATIENT_ID_MIN..=PATIENT_ID_MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(PatientIdError::OutOfRange(value))
        }
    }

    /// Returns the numeric value of this id.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PatientId {
    type Err = PatientIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .parse::<i64>()
            .map_err(|_| PatientIdError::NotAnInteger(s.to_string()))?;
        Self::new(value)
    }
}

impl TryFrom<i64> for PatientId {
    type Error = PatientIdError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
