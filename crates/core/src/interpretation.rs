//! Clinical interpretation text.
//!
//! Interpretation is advisory. It is produced after a record has been scored, classified and
//! persisted, and it never feeds back into the score or the tier. Implementations may be slow
//! or unavailable; the service bounds every call with a timeout and drops the text on failure.

use crate::alert::{Evaluation, HIGH_COMPOSITE_THRESHOLD, MEDIUM_COMPOSITE_THRESHOLD};
use crate::error::InterpretationError;
use crate::measurement::MeasurementSet;
use async_trait::async_trait;

/// Closing line appended to every rule-based interpretation.
pub const CLINICIAN_VALIDATION_NOTICE: &str = "[AI SUPPORT: Validation by clinician required]";

#[async_trait]
pub trait Interpreter: Send + Sync {
    async fn interpret(
        &self,
        measurement: &MeasurementSet,
        evaluation: &Evaluation,
    ) -> Result<String, InterpretationError>;
}

/// Deterministic, rule-based interpreter.
///
/// Recognises a handful of deterioration patterns, lists isolated abnormal findings, and puts
/// the NEWS2 composite in context.
#[derive(Clone, Copy, Debug, Default)]
pub struct RuleBasedInterpreter;

impl RuleBasedInterpreter {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous form of [`Interpreter::interpret`].
    pub fn render(&self, m: &MeasurementSet, evaluation: &Evaluation) -> String {
        let temp = m.temperature.tenths();
        let hr = m.heart_rate;
        let rr = m.respiratory_rate;
        let sbp = m.systolic_bp;
        let spo2 = m.oxygen_saturation;

        let mut impressions: Vec<&str> = Vec::new();
        let mut recommendations: Vec<&str> = Vec::new();
        let mut findings: Vec<String> = Vec::new();

        let sepsis_signs = [temp > 383 || temp < 360, hr > 90, rr > 20, sbp < 100]
            .iter()
            .filter(|&&sign| sign)
            .count();
        if sepsis_signs >= 2 {
            impressions
                .push("POSSIBLE SEPSIS: Multiple systemic inflammatory response signs detected.");
            recommendations.push("URGENT: Sepsis screening required (Lactate, Blood Cultures)");
            recommendations.push("Assess urine output and mental status");
        }

        if sbp < 90 && hr > 100 {
            impressions.push("POSSIBLE SHOCK: Hypotension with compensatory tachycardia.");
            recommendations.push("URGENT: Assess fluid status and perfusion");
            recommendations.push("Prepare for fluid resuscitation");
        }

        if spo2 < 92 && rr > 24 {
            impressions.push("RESPIRATORY DISTRESS: Hypoxia with tachypnoea.");
            recommendations.push("URGENT: Respiratory assessment required");
            recommendations.push("Consider ABG and chest imaging");
        }

        if sbp > 180 || m.diastolic_bp.is_some_and(|dia| dia > 120) {
            impressions.push("HYPERTENSIVE CRISIS: Critical blood pressure elevation.");
            recommendations.push("Immediate medical review required");
            recommendations
                .push("Assess for end-organ damage (chest pain, headache, vision changes)");
        }

        if temp > 380 {
            findings.push(format!("Pyrexia ({}°C)", m.temperature));
        } else if temp < 350 {
            findings.push(format!("Hypothermia ({}°C)", m.temperature));
        }

        if hr > 100 {
            findings.push(format!("Tachycardia ({hr} bpm)"));
        } else if hr < 60 {
            findings.push(format!("Bradycardia ({hr} bpm)"));
        }

        if spo2 < 94 {
            findings.push(format!("Hypoxia ({spo2}%)"));
        }

        let composite = evaluation.composite_score;
        if composite >= HIGH_COMPOSITE_THRESHOLD {
            findings.push(format!("CRITICAL NEWS2 Score ({composite})"));
        } else if composite >= MEDIUM_COMPOSITE_THRESHOLD {
            findings.push(format!("High NEWS2 Score ({composite})"));
        }

        let mut text = String::new();

        if !impressions.is_empty() {
            text.push_str("POTENTIAL CLINICAL IMPLICATIONS:\n");
            let lines: Vec<String> = impressions.iter().map(|i| format!("⚠️ {i}")).collect();
            text.push_str(&lines.join("\n"));
            text.push_str("\n\n");
        }

        text.push_str("VITAL SIGNS ANALYSIS:\n");
        if findings.is_empty() {
            text.push_str("• Vital signs stable within normal limits.");
        } else {
            let lines: Vec<String> = findings.iter().map(|f| format!("• {f}")).collect();
            text.push_str(&lines.join("\n"));
        }

        if !recommendations.is_empty() {
            text.push_str("\n\nRECOMMENDATIONS:\n");
            let lines: Vec<String> = recommendations.iter().map(|r| format!("-> {r}")).collect();
            text.push_str(&lines.join("\n"));
        }

        text.push_str("\n\n");
        text.push_str(CLINICIAN_VALIDATION_NOTICE);
        text
    }
}

#[async_trait]
impl Interpreter for RuleBasedInterpreter {
    async fn interpret(
        &self,
        measurement: &MeasurementSet,
        evaluation: &Evaluation,
    ) -> Result<String, InterpretationError> {
        Ok(self.render(measurement, evaluation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::{ConsciousnessLevel, Temperature};
    use crate::news2;

    fn normal() -> MeasurementSet {
        MeasurementSet {
            respiratory_rate: 16,
            oxygen_saturation: 98,
            supplemental_oxygen: false,
            systolic_bp: 120,
            diastolic_bp: Some(80),
            heart_rate: 72,
            consciousness: ConsciousnessLevel::Alert,
            temperature: Temperature::from_tenths(370),
            weight_kg: None,
            notes: None,
        }
    }

    fn render(m: &MeasurementSet) -> String {
        let evaluation = Evaluation::from_score(news2::score(m));
        RuleBasedInterpreter::new().render(m, &evaluation)
    }

    #[test]
    fn normal_vitals_are_stable() {
        let text = render(&normal());
        assert!(text.contains("Vital signs stable within normal limits."));
        assert!(!text.contains("POTENTIAL CLINICAL IMPLICATIONS"));
        assert!(!text.contains("RECOMMENDATIONS"));
        assert!(text.ends_with(CLINICIAN_VALIDATION_NOTICE));
    }

    #[test]
    fn sepsis_needs_two_signs() {
        let mut m = normal();
        m.heart_rate = 95;
        assert!(!render(&m).contains("POSSIBLE SEPSIS"));

        m.temperature = Temperature::from_tenths(385);
        let text = render(&m);
        assert!(text.contains("POSSIBLE SEPSIS"));
        assert!(text.contains("Pyrexia (38.5°C)"));
        assert!(text.contains("-> URGENT: Sepsis screening required"));
    }

    #[test]
    fn shock_pattern() {
        let mut m = normal();
        m.systolic_bp = 85;
        m.heart_rate = 120;
        let text = render(&m);
        assert!(text.contains("POSSIBLE SHOCK"));
        assert!(text.contains("Tachycardia (120 bpm)"));
    }

    #[test]
    fn respiratory_distress_pattern() {
        let mut m = normal();
        m.oxygen_saturation = 88;
        m.respiratory_rate = 28;
        m.heart_rate = 115;
        let text = render(&m);
        assert!(text.contains("RESPIRATORY DISTRESS"));
        assert!(text.contains("Hypoxia (88%)"));
        assert!(text.contains("CRITICAL NEWS2 Score"));
    }

    #[test]
    fn hypertensive_crisis_from_either_pressure() {
        let mut m = normal();
        m.diastolic_bp = Some(125);
        assert!(render(&m).contains("HYPERTENSIVE CRISIS"));

        let mut m = normal();
        m.systolic_bp = 190;
        m.diastolic_bp = None;
        assert!(render(&m).contains("HYPERTENSIVE CRISIS"));
    }

    #[test]
    fn isolated_findings() {
        let mut m = normal();
        m.temperature = Temperature::from_tenths(345);
        m.heart_rate = 55;
        let text = render(&m);
        assert!(text.contains("Hypothermia (34.5°C)"));
        assert!(text.contains("Bradycardia (55 bpm)"));
    }

    #[test]
    fn composite_context() {
        let mut m = normal();
        m.respiratory_rate = 22;
        m.oxygen_saturation = 93;
        m.heart_rate = 95;
        let evaluation = Evaluation::from_score(news2::score(&m));
        assert_eq!(evaluation.composite_score, 5);
        let text = RuleBasedInterpreter::new().render(&m, &evaluation);
        assert!(text.contains("High NEWS2 Score (5)"));
    }

    #[tokio::test]
    async fn trait_call_matches_render() {
        let m = normal();
        let evaluation = Evaluation::from_score(news2::score(&m));
        let interpreter = RuleBasedInterpreter::new();
        let text = interpreter.interpret(&m, &evaluation).await.unwrap();
        assert_eq!(text, interpreter.render(&m, &evaluation));
    }
}
