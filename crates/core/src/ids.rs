//! Identifier types.
//!
//! - [`PatientId`]: the opaque patient reference supplied by callers. It doubles as a storage
//!   directory name, so its character set is restricted.
//! - [`RecordId`]: a UUID v4 assigned to every persisted vitals record, always rendered in
//!   canonical form (32 lowercase hex characters, no hyphens).
//! - [`RecordedBy`]: the recorder of an observation. Trimmed, never empty.

use crate::constants::MAX_PATIENT_ID_LEN;
use crate::error::{EvaluationError, EvaluationResult};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Validated patient identifier.
///
/// Accepts ASCII alphanumerics plus `.`, `-` and `_`, between 1 and 64 bytes after trimming.
/// Hospital numbers such as `P001` are valid.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatientId(String);

impl PatientId {
    pub fn parse(input: &str) -> EvaluationResult<Self> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Err(EvaluationError::InvalidInput(
                "patient id cannot be empty".into(),
            ));
        }

        if trimmed.len() > MAX_PATIENT_ID_LEN {
            return Err(EvaluationError::InvalidInput(format!(
                "patient id exceeds maximum length of {} characters",
                MAX_PATIENT_ID_LEN
            )));
        }

        // `.` and `..` would escape the patient directory in the file store.
        if trimmed.bytes().all(|b| b == b'.') {
            return Err(EvaluationError::InvalidInput(
                "patient id cannot consist only of '.'".into(),
            ));
        }

        let ok = trimmed
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'.' | b'-' | b'_'));
        if !ok {
            return Err(EvaluationError::InvalidInput(
                "patient id contains invalid characters (only alphanumeric, '.', '-', '_' allowed)"
                    .into(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PatientId {
    type Err = EvaluationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatientId::parse(s)
    }
}

impl serde::Serialize for PatientId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for PatientId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PatientId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Identifier of one persisted vitals record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Allocates a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an identifier that must already be canonical.
    ///
    /// Hyphenated or uppercase forms are rejected so that every record has exactly one
    /// textual representation.
    pub fn parse(input: &str) -> EvaluationResult<Self> {
        if !Self::is_canonical(input) {
            return Err(EvaluationError::InvalidInput(format!(
                "record id must be 32 lowercase hex characters without hyphens, got: '{}'",
                input
            )));
        }
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| EvaluationError::InvalidInput(format!("invalid record id: {e}")))
    }

    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for RecordId {
    type Err = EvaluationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordId::parse(s)
    }
}

impl serde::Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RecordId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Who recorded an observation.
///
/// Stamped by the evaluation service from the authenticated caller, never from the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedBy(String);

impl RecordedBy {
    pub fn new(input: impl AsRef<str>) -> EvaluationResult<Self> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(EvaluationError::InvalidInput(
                "recorded_by cannot be empty".into(),
            ));
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for RecordedBy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for RecordedBy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RecordedBy::new(&s).map_err(serde::de::Error::custom)
    }
}
