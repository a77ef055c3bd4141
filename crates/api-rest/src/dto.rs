//! Request and response bodies.
//!
//! Core types stay free of HTTP and OpenAPI concerns; these mirror them for the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use vitals_core::{
    MeasurementSet, PatientId, PatientStatus, RawMeasurement, RawValue, SubScore, VitalsRecord,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterPatientReq {
    pub patient_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterPatientRes {
    pub patient_id: String,
    /// False if the patient was already registered.
    pub created: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientStatusRes {
    pub patient_id: String,
    /// One of `unassessed`, `stable`, `medium`, `high`.
    pub status: String,
}

impl PatientStatusRes {
    pub fn new(patient_id: &PatientId, status: PatientStatus) -> Self {
        Self {
            patient_id: patient_id.to_string(),
            status: status.as_str().to_string(),
        }
    }
}

/// A vitals submission. Numeric fields accept numbers or numeric strings.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SubmitVitalsReq {
    pub recorded_by: String,
    #[schema(value_type = Option<f64>)]
    pub respiratory_rate: Option<RawValue>,
    #[schema(value_type = Option<f64>)]
    pub oxygen_saturation: Option<RawValue>,
    pub supplemental_oxygen: Option<bool>,
    #[schema(value_type = Option<f64>)]
    pub systolic_bp: Option<RawValue>,
    #[schema(value_type = Option<f64>)]
    pub diastolic_bp: Option<RawValue>,
    #[schema(value_type = Option<f64>)]
    pub heart_rate: Option<RawValue>,
    /// `alert`, `confused`, `voice`, `pain` or `unresponsive`. Defaults to `alert`.
    pub consciousness: Option<String>,
    /// Degrees Celsius.
    #[schema(value_type = Option<f64>)]
    pub temperature: Option<RawValue>,
    /// Kilograms.
    #[schema(value_type = Option<f64>)]
    pub weight: Option<RawValue>,
    pub notes: Option<String>,
}

impl SubmitVitalsReq {
    /// Splits the recorder from the measurement payload.
    pub fn into_parts(self) -> (String, RawMeasurement) {
        let measurement = RawMeasurement {
            respiratory_rate: self.respiratory_rate,
            oxygen_saturation: self.oxygen_saturation,
            supplemental_oxygen: self.supplemental_oxygen,
            systolic_bp: self.systolic_bp,
            diastolic_bp: self.diastolic_bp,
            heart_rate: self.heart_rate,
            consciousness: self.consciousness,
            temperature: self.temperature,
            weight: self.weight,
            notes: self.notes,
        };
        (self.recorded_by, measurement)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubScoreRes {
    pub parameter: String,
    pub band_points: u8,
    /// Supplemental oxygen points, on the oxygen saturation entry only.
    pub adjustment: u8,
    pub points: u8,
    pub critical: bool,
}

impl From<&SubScore> for SubScoreRes {
    fn from(s: &SubScore) -> Self {
        Self {
            parameter: s.parameter.as_str().to_string(),
            band_points: s.band_points,
            adjustment: s.adjustment,
            points: s.points(),
            critical: s.critical,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeasurementRes {
    pub respiratory_rate: u16,
    pub oxygen_saturation: u8,
    pub supplemental_oxygen: bool,
    pub systolic_bp: u16,
    pub diastolic_bp: Option<u16>,
    pub heart_rate: u16,
    pub consciousness: String,
    pub temperature: f64,
    pub weight_kg: Option<f64>,
    pub notes: Option<String>,
}

impl From<&MeasurementSet> for MeasurementRes {
    fn from(m: &MeasurementSet) -> Self {
        Self {
            respiratory_rate: m.respiratory_rate,
            oxygen_saturation: m.oxygen_saturation,
            supplemental_oxygen: m.supplemental_oxygen,
            systolic_bp: m.systolic_bp,
            diastolic_bp: m.diastolic_bp,
            heart_rate: m.heart_rate,
            consciousness: m.consciousness.as_str().to_string(),
            temperature: m.temperature.celsius(),
            weight_kg: m.weight_kg,
            notes: m.notes.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VitalsRecordRes {
    pub record_id: String,
    pub patient_id: String,
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    pub recorded_by: String,
    pub news2_score: u8,
    /// `low`, `medium` or `high`.
    pub alert_tier: String,
    pub alert_colour: String,
    pub alert_label: String,
    pub critical: bool,
    pub sub_scores: Vec<SubScoreRes>,
    pub measurement: MeasurementRes,
    /// Advisory text, returned on submission only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<String>,
}

impl VitalsRecordRes {
    pub fn new(record: &VitalsRecord, interpretation: Option<String>) -> Self {
        let tier = record.evaluation.alert_tier;
        Self {
            record_id: record.id.to_string(),
            patient_id: record.patient_id.to_string(),
            sequence: record.sequence,
            recorded_at: record.recorded_at,
            recorded_by: record.recorded_by.to_string(),
            news2_score: record.evaluation.composite_score,
            alert_tier: tier.as_str().to_string(),
            alert_colour: tier.colour().to_string(),
            alert_label: tier.label().to_string(),
            critical: record.evaluation.critical,
            sub_scores: record
                .evaluation
                .sub_scores
                .iter()
                .map(SubScoreRes::from)
                .collect(),
            measurement: MeasurementRes::from(&record.measurement),
            interpretation,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryParams {
    /// Maximum number of records to return. Must be at least 1.
    pub limit: Option<usize>,
    /// Only return records with a sequence strictly below this value.
    pub before: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VitalsHistoryRes {
    pub patient_id: String,
    /// Newest first.
    pub records: Vec<VitalsRecordRes>,
    /// Pass as `before` to fetch the next (older) page. Absent when no older records remain.
    pub next_before: Option<u64>,
}

impl VitalsHistoryRes {
    pub fn new(patient_id: &PatientId, records: &[VitalsRecord]) -> Self {
        // Sequences are gap-free from 1, so anything above 1 has older records behind it.
        let next_before = records
            .last()
            .map(|r| r.sequence)
            .filter(|&sequence| sequence > 1);
        Self {
            patient_id: patient_id.to_string(),
            records: records.iter().map(|r| VitalsRecordRes::new(r, None)).collect(),
            next_before,
        }
    }
}
