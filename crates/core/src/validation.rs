//! Measurement validation.
//!
//! Converts a [`RawMeasurement`] into a [`MeasurementSet`] or reports every offending field at
//! once. Out-of-range values are rejected rather than clamped: a clamped transcription error
//! would produce a plausible but wrong score.

use crate::constants::{
    DIASTOLIC_BP_RANGE, HEART_RATE_RANGE, OXYGEN_SATURATION_RANGE, RESPIRATORY_RATE_RANGE,
    SYSTOLIC_BP_RANGE, TEMPERATURE_TENTHS_RANGE,
};
use crate::error::ValidationErrors;
use crate::measurement::{
    ConsciousnessLevel, MeasurementSet, RawMeasurement, RawValue, Temperature,
};

/// Validates a raw submission.
///
/// # Errors
///
/// Returns [`ValidationErrors`] listing every field that is missing, non-numeric, fractional
/// where a whole number is required, or outside its physiological bound.
pub fn validate(raw: &RawMeasurement) -> Result<MeasurementSet, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let respiratory_rate = required_whole(
        &mut errors,
        "respiratory_rate",
        raw.respiratory_rate.as_ref(),
        RESPIRATORY_RATE_RANGE,
    );
    let oxygen_saturation = required_whole(
        &mut errors,
        "oxygen_saturation",
        raw.oxygen_saturation.as_ref(),
        OXYGEN_SATURATION_RANGE,
    );
    let systolic_bp = required_whole(
        &mut errors,
        "systolic_bp",
        raw.systolic_bp.as_ref(),
        SYSTOLIC_BP_RANGE,
    );
    let diastolic_bp = optional_whole(
        &mut errors,
        "diastolic_bp",
        raw.diastolic_bp.as_ref(),
        DIASTOLIC_BP_RANGE,
    );
    let heart_rate = required_whole(
        &mut errors,
        "heart_rate",
        raw.heart_rate.as_ref(),
        HEART_RATE_RANGE,
    );
    let temperature = required_temperature(&mut errors, raw.temperature.as_ref());
    let weight_kg = optional_weight(&mut errors, raw.weight.as_ref());

    let consciousness = match raw.consciousness.as_deref().map(str::trim) {
        None | Some("") => Some(ConsciousnessLevel::Alert),
        Some(value) => {
            let parsed = ConsciousnessLevel::parse(value);
            if parsed.is_none() {
                errors.push(
                    "consciousness",
                    "must be one of alert, confused, voice, pain, unresponsive",
                );
            }
            parsed
        }
    };

    match (
        respiratory_rate,
        oxygen_saturation,
        systolic_bp,
        heart_rate,
        temperature,
        consciousness,
    ) {
        (Some(rr), Some(spo2), Some(sbp), Some(hr), Some(temp), Some(acvpu))
            if errors.is_empty() =>
        {
            Ok(MeasurementSet {
                respiratory_rate: rr,
                // Bounded to 0..=100 above.
                oxygen_saturation: spo2 as u8,
                supplemental_oxygen: raw.supplemental_oxygen.unwrap_or(false),
                systolic_bp: sbp,
                diastolic_bp,
                heart_rate: hr,
                consciousness: acvpu,
                temperature: temp,
                weight_kg,
                notes: raw.notes.clone(),
            })
        }
        _ => Err(errors),
    }
}

/// Reads a numeric input. `None` means absent (missing or blank); errors are recorded.
fn number(errors: &mut ValidationErrors, field: &str, raw: Option<&RawValue>) -> Option<f64> {
    match raw.and_then(RawValue::to_number) {
        None => None,
        Some(Err(())) => {
            errors.push(field, "must be numeric");
            None
        }
        Some(Ok(n)) if !n.is_finite() => {
            errors.push(field, "must be a finite number");
            None
        }
        Some(Ok(n)) => Some(n),
    }
}

fn whole(errors: &mut ValidationErrors, field: &str, n: f64, (min, max): (u16, u16)) -> Option<u16> {
    if n.fract() != 0.0 {
        errors.push(field, "must be a whole number");
        return None;
    }
    if n < f64::from(min) || n > f64::from(max) {
        errors.push(field, format!("must be between {min} and {max}, got {n}"));
        return None;
    }
    Some(n as u16)
}

fn required_whole(
    errors: &mut ValidationErrors,
    field: &str,
    raw: Option<&RawValue>,
    range: (u16, u16),
) -> Option<u16> {
    let present = raw.and_then(RawValue::to_number).is_some();
    match number(errors, field, raw) {
        Some(n) => whole(errors, field, n, range),
        None => {
            if !present {
                errors.push(field, "is required");
            }
            None
        }
    }
}

fn optional_whole(
    errors: &mut ValidationErrors,
    field: &str,
    raw: Option<&RawValue>,
    range: (u16, u16),
) -> Option<u16> {
    number(errors, field, raw).and_then(|n| whole(errors, field, n, range))
}

fn required_temperature(
    errors: &mut ValidationErrors,
    raw: Option<&RawValue>,
) -> Option<Temperature> {
    const FIELD: &str = "temperature";
    let (min, max) = TEMPERATURE_TENTHS_RANGE;
    let present = raw.and_then(RawValue::to_number).is_some();

    let Some(celsius) = number(errors, FIELD, raw) else {
        if !present {
            errors.push(FIELD, "is required");
        }
        return None;
    };

    let in_range = (f64::from(min) / 10.0..=f64::from(max) / 10.0).contains(&celsius);
    match Temperature::from_celsius(celsius) {
        Some(t) if in_range => Some(t),
        _ => {
            errors.push(
                FIELD,
                format!(
                    "must be between {} and {} °C, got {celsius}",
                    Temperature::from_tenths(min),
                    Temperature::from_tenths(max)
                ),
            );
            None
        }
    }
}

fn optional_weight(errors: &mut ValidationErrors, raw: Option<&RawValue>) -> Option<f64> {
    let weight = number(errors, "weight", raw)?;
    if weight <= 0.0 {
        errors.push("weight", "must be a positive number of kilograms");
        return None;
    }
    Some(weight)
}
