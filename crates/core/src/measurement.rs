//! Measurement types.
//!
//! [`RawMeasurement`] is what arrives from a caller: every field optional, numbers possibly sent
//! as strings by form inputs. [`MeasurementSet`] is the validated, typed observation that the
//! scorer consumes and the store persists. Only the validator converts one into the other.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A numeric input as submitted: a JSON number or a string holding one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Returns `None` for blank text, `Some(Err(()))` for text that is not a number.
    pub(crate) fn to_number(&self) -> Option<Result<f64, ()>> {
        match self {
            RawValue::Number(n) => Some(Ok(*n)),
            RawValue::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else {
                    Some(s.parse::<f64>().map_err(|_| ()))
                }
            }
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        RawValue::Number(f64::from(value))
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Number(value as f64)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_owned())
    }
}

/// Untrusted vitals submission.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawMeasurement {
    pub respiratory_rate: Option<RawValue>,
    pub oxygen_saturation: Option<RawValue>,
    pub supplemental_oxygen: Option<bool>,
    pub systolic_bp: Option<RawValue>,
    pub diastolic_bp: Option<RawValue>,
    pub heart_rate: Option<RawValue>,
    pub consciousness: Option<String>,
    pub temperature: Option<RawValue>,
    pub weight: Option<RawValue>,
    pub notes: Option<String>,
}

/// ACVPU consciousness level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsciousnessLevel {
    #[default]
    Alert,
    Confused,
    Voice,
    Pain,
    Unresponsive,
}

impl ConsciousnessLevel {
    /// Parses the accepted spellings, case-insensitively.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "alert" | "a" => Some(Self::Alert),
            "confused" | "confusion" | "new_confusion" | "c" => Some(Self::Confused),
            "voice" | "v" => Some(Self::Voice),
            "pain" | "p" => Some(Self::Pain),
            "unresponsive" | "u" => Some(Self::Unresponsive),
            _ => None,
        }
    }

    /// Scoring collapses the scale to alert / not alert.
    pub fn is_alert(self) -> bool {
        matches!(self, Self::Alert)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Confused => "confused",
            Self::Voice => "voice",
            Self::Pain => "pain",
            Self::Unresponsive => "unresponsive",
        }
    }
}

impl fmt::Display for ConsciousnessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body temperature held as whole tenths of a degree Celsius.
///
/// Band edges such as 35.0 / 35.1 are defined at one decimal place, so the value is fixed to
/// that precision on construction and compared as an integer thereafter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Temperature(i16);

impl Temperature {
    /// Rounds to one decimal place, half away from zero. `None` for non-finite input or
    /// values that do not fit.
    pub fn from_celsius(celsius: f64) -> Option<Self> {
        if !celsius.is_finite() {
            return None;
        }
        let tenths = (celsius * 10.0).round();
        if tenths < i16::MIN as f64 || tenths > i16::MAX as f64 {
            return None;
        }
        Some(Self(tenths as i16))
    }

    pub fn from_tenths(tenths: i16) -> Self {
        Self(tenths)
    }

    pub fn tenths(self) -> i16 {
        self.0
    }

    pub fn celsius(self) -> f64 {
        f64::from(self.0) / 10.0
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.celsius())
    }
}

impl Serialize for Temperature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_f64(self.celsius())
    }
}

impl<'de> Deserialize<'de> for Temperature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let celsius = f64::deserialize(deserializer)?;
        Temperature::from_celsius(celsius)
            .ok_or_else(|| serde::de::Error::custom("temperature out of representable range"))
    }
}

/// One validated clinical observation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSet {
    pub respiratory_rate: u16,
    pub oxygen_saturation: u8,
    pub supplemental_oxygen: bool,
    pub systolic_bp: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diastolic_bp: Option<u16>,
    pub heart_rate: u16,
    pub consciousness: ConsciousnessLevel,
    pub temperature: Temperature,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
