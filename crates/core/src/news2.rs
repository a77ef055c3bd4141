//! NEWS2 scoring.
//!
//! Each scored parameter is mapped through its own band table. The tables are plain data:
//! an ordered list of `(lower bound, points)` pairs, lower bounds inclusive, the first band
//! open-ended downwards. Retuning a threshold is an edit to a table, not to the lookup.
//!
//! Supplemental oxygen adds a fixed adjustment to the oxygen-saturation entry. A parameter that
//! lands in a band flagged `critical` (its extreme band) sets the score's critical flag
//! regardless of the composite total.

use crate::measurement::MeasurementSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Points added to the oxygen-saturation entry when supplemental oxygen is in use.
pub const SUPPLEMENTAL_OXYGEN_POINTS: u8 = 2;

/// Upper bound of the composite score: six parameters at 3 plus the oxygen adjustment.
pub const MAX_COMPOSITE_SCORE: u8 = 6 * 3 + SUPPLEMENTAL_OXYGEN_POINTS;

/// The six scored parameters, in reporting order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    RespiratoryRate,
    OxygenSaturation,
    SystolicBp,
    HeartRate,
    Consciousness,
    Temperature,
}

impl Parameter {
    pub const ALL: [Parameter; 6] = [
        Parameter::RespiratoryRate,
        Parameter::OxygenSaturation,
        Parameter::SystolicBp,
        Parameter::HeartRate,
        Parameter::Consciousness,
        Parameter::Temperature,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Parameter::RespiratoryRate => "respiratory_rate",
            Parameter::OxygenSaturation => "oxygen_saturation",
            Parameter::SystolicBp => "systolic_bp",
            Parameter::HeartRate => "heart_rate",
            Parameter::Consciousness => "consciousness",
            Parameter::Temperature => "temperature",
        }
    }

    /// The band table this parameter is scored against.
    pub fn table(self) -> &'static BandTable {
        match self {
            Parameter::RespiratoryRate => &RESPIRATORY_RATE,
            Parameter::OxygenSaturation => &OXYGEN_SATURATION,
            Parameter::SystolicBp => &SYSTOLIC_BP,
            Parameter::HeartRate => &HEART_RATE,
            Parameter::Consciousness => &CONSCIOUSNESS,
            Parameter::Temperature => &TEMPERATURE,
        }
    }

    /// The value this parameter is banded on, in the table's units.
    fn banded_value(self, m: &MeasurementSet) -> i32 {
        match self {
            Parameter::RespiratoryRate => i32::from(m.respiratory_rate),
            Parameter::OxygenSaturation => i32::from(m.oxygen_saturation),
            Parameter::SystolicBp => i32::from(m.systolic_bp),
            Parameter::HeartRate => i32::from(m.heart_rate),
            Parameter::Consciousness => i32::from(!m.consciousness.is_alert()),
            Parameter::Temperature => i32::from(m.temperature.tenths()),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One band: values at or above `lower` (and below the next band's `lower`) score `points`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Band {
    pub lower: i32,
    pub points: u8,
    /// The band borders physiological collapse.
    pub critical: bool,
}

const fn band(lower: i32, points: u8) -> Band {
    Band {
        lower,
        points,
        critical: false,
    }
}

const fn extreme(lower: i32, points: u8) -> Band {
    Band {
        lower,
        points,
        critical: true,
    }
}

/// Ordered bands for one parameter. The first band must start at `i32::MIN`.
#[derive(Debug)]
pub struct BandTable {
    pub parameter: Parameter,
    pub bands: &'static [Band],
}

impl BandTable {
    /// Returns the band `value` falls in.
    pub fn lookup(&self, value: i32) -> Band {
        let idx = self.bands.partition_point(|b| b.lower <= value);
        self.bands[idx.saturating_sub(1)]
    }
}

pub static RESPIRATORY_RATE: BandTable = BandTable {
    parameter: Parameter::RespiratoryRate,
    bands: &[
        extreme(i32::MIN, 3),
        band(9, 1),
        band(12, 0),
        band(21, 2),
        extreme(25, 3),
    ],
};

pub static OXYGEN_SATURATION: BandTable = BandTable {
    parameter: Parameter::OxygenSaturation,
    bands: &[extreme(i32::MIN, 3), band(92, 2), band(94, 1), band(96, 0)],
};

pub static SYSTOLIC_BP: BandTable = BandTable {
    parameter: Parameter::SystolicBp,
    bands: &[
        extreme(i32::MIN, 3),
        band(91, 2),
        band(101, 1),
        band(111, 0),
        extreme(220, 3),
    ],
};

pub static HEART_RATE: BandTable = BandTable {
    parameter: Parameter::HeartRate,
    bands: &[
        extreme(i32::MIN, 3),
        band(41, 1),
        band(51, 0),
        band(91, 1),
        band(111, 2),
        extreme(131, 3),
    ],
};

/// 0 = alert, 1 = not alert.
pub static CONSCIOUSNESS: BandTable = BandTable {
    parameter: Parameter::Consciousness,
    bands: &[band(i32::MIN, 0), extreme(1, 3)],
};

/// Tenths of a degree Celsius.
pub static TEMPERATURE: BandTable = BandTable {
    parameter: Parameter::Temperature,
    bands: &[
        extreme(i32::MIN, 3),
        band(351, 1),
        band(361, 0),
        band(381, 1),
        band(391, 2),
    ],
};

/// Points for one parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubScore {
    pub parameter: Parameter,
    /// Points from the band table alone.
    pub band_points: u8,
    /// Supplemental oxygen adjustment; only ever non-zero on the oxygen-saturation entry.
    #[serde(default)]
    pub adjustment: u8,
    pub critical: bool,
}

impl SubScore {
    pub fn points(&self) -> u8 {
        self.band_points + self.adjustment
    }
}

/// Result of scoring one measurement set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct News2Score {
    /// One entry per parameter, in [`Parameter::ALL`] order.
    pub sub_scores: Vec<SubScore>,
    pub composite: u8,
    pub critical: bool,
}

impl News2Score {
    pub fn sub_score(&self, parameter: Parameter) -> Option<&SubScore> {
        self.sub_scores.iter().find(|s| s.parameter == parameter)
    }

    /// Highest band points of any single parameter, excluding the oxygen adjustment.
    pub fn max_band_points(&self) -> u8 {
        self.sub_scores
            .iter()
            .map(|s| s.band_points)
            .max()
            .unwrap_or(0)
    }
}

/// Scores a validated measurement set. Pure and total.
pub fn score(measurement: &MeasurementSet) -> News2Score {
    let sub_scores: Vec<SubScore> = Parameter::ALL
        .iter()
        .map(|&parameter| {
            let band = parameter.table().lookup(parameter.banded_value(measurement));
            let adjustment =
                if parameter == Parameter::OxygenSaturation && measurement.supplemental_oxygen {
                    SUPPLEMENTAL_OXYGEN_POINTS
                } else {
                    0
                };
            SubScore {
                parameter,
                band_points: band.points,
                adjustment,
                critical: band.critical,
            }
        })
        .collect();

    let composite: u8 = sub_scores.iter().map(SubScore::points).sum();
    let critical = sub_scores.iter().any(|s| s.critical);

    tracing::debug!(composite, critical, "scored measurement set");

    News2Score {
        sub_scores,
        composite,
        critical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::{AlertTier, Evaluation};
    use crate::measurement::{ConsciousnessLevel, Temperature};

    fn normal() -> MeasurementSet {
        MeasurementSet {
            respiratory_rate: 16,
            oxygen_saturation: 97,
            supplemental_oxygen: false,
            systolic_bp: 120,
            diastolic_bp: None,
            heart_rate: 70,
            consciousness: ConsciousnessLevel::Alert,
            temperature: Temperature::from_tenths(370),
            weight_kg: None,
            notes: None,
        }
    }

    fn points(m: &MeasurementSet) -> Vec<u8> {
        score(m).sub_scores.iter().map(SubScore::points).collect()
    }

    #[test]
    fn tables_are_well_formed() {
        for parameter in Parameter::ALL {
            let table = parameter.table();
            assert_eq!(table.parameter, parameter);
            assert_eq!(table.bands[0].lower, i32::MIN, "{parameter}");
            assert!(
                table.bands.windows(2).all(|w| w[0].lower < w[1].lower),
                "{parameter} bands must be strictly ascending"
            );
            assert!(table.bands.iter().all(|b| b.points <= 3));
            // Every 3-point band is the parameter's extreme band.
            assert!(table
                .bands
                .iter()
                .all(|b| b.critical == (b.points == 3)));
        }
    }

    #[test]
    fn normal_observation_scores_zero() {
        let s = score(&normal());
        assert_eq!(s.composite, 0);
        assert!(!s.critical);
        assert_eq!(s.sub_scores.len(), 6);
    }

    #[test]
    fn respiratory_rate_band_edges() {
        let cases = [
            (0, 3),
            (8, 3),
            (9, 1),
            (11, 1),
            (12, 0),
            (20, 0),
            (21, 2),
            (24, 2),
            (25, 3),
            (60, 3),
        ];
        for (value, expected) in cases {
            let m = MeasurementSet {
                respiratory_rate: value,
                ..normal()
            };
            let s = score(&m);
            assert_eq!(
                s.sub_score(Parameter::RespiratoryRate).unwrap().points(),
                expected,
                "respiratory rate {value}"
            );
        }
    }

    #[test]
    fn oxygen_saturation_band_edges() {
        let cases = [(0, 3), (91, 3), (92, 2), (93, 2), (94, 1), (95, 1), (96, 0), (100, 0)];
        for (value, expected) in cases {
            let m = MeasurementSet {
                oxygen_saturation: value,
                ..normal()
            };
            assert_eq!(
                score(&m).sub_score(Parameter::OxygenSaturation).unwrap().points(),
                expected,
                "SpO2 {value}"
            );
        }
    }

    #[test]
    fn supplemental_oxygen_adds_two_to_saturation_entry_only() {
        let m = MeasurementSet {
            supplemental_oxygen: true,
            ..normal()
        };
        let s = score(&m);
        let spo2 = s.sub_score(Parameter::OxygenSaturation).unwrap();

        assert_eq!(spo2.band_points, 0);
        assert_eq!(spo2.adjustment, SUPPLEMENTAL_OXYGEN_POINTS);
        assert_eq!(s.composite, 2);
        assert!(!s.critical);
        assert!(s
            .sub_scores
            .iter()
            .filter(|s| s.parameter != Parameter::OxygenSaturation)
            .all(|s| s.adjustment == 0));
    }

    #[test]
    fn systolic_bp_band_edges() {
        let cases = [
            (0, 3),
            (90, 3),
            (91, 2),
            (100, 2),
            (101, 1),
            (110, 1),
            (111, 0),
            (219, 0),
            (220, 3),
            (300, 3),
        ];
        for (value, expected) in cases {
            let m = MeasurementSet {
                systolic_bp: value,
                ..normal()
            };
            assert_eq!(
                score(&m).sub_score(Parameter::SystolicBp).unwrap().points(),
                expected,
                "SBP {value}"
            );
        }
    }

    #[test]
    fn heart_rate_band_edges() {
        let cases = [
            (0, 3),
            (40, 3),
            (41, 1),
            (50, 1),
            (51, 0),
            (90, 0),
            (91, 1),
            (110, 1),
            (111, 2),
            (130, 2),
            (131, 3),
            (300, 3),
        ];
        for (value, expected) in cases {
            let m = MeasurementSet {
                heart_rate: value,
                ..normal()
            };
            assert_eq!(
                score(&m).sub_score(Parameter::HeartRate).unwrap().points(),
                expected,
                "HR {value}"
            );
        }
    }

    #[test]
    fn consciousness_alert_vs_not_alert() {
        for (level, expected) in [
            (ConsciousnessLevel::Alert, 0),
            (ConsciousnessLevel::Confused, 3),
            (ConsciousnessLevel::Voice, 3),
            (ConsciousnessLevel::Pain, 3),
            (ConsciousnessLevel::Unresponsive, 3),
        ] {
            let m = MeasurementSet {
                consciousness: level,
                ..normal()
            };
            let s = score(&m);
            assert_eq!(
                s.sub_score(Parameter::Consciousness).unwrap().points(),
                expected,
                "{level}"
            );
            assert_eq!(s.critical, expected == 3);
        }
    }

    #[test]
    fn temperature_band_edges() {
        let cases = [
            (250, 3),
            (350, 3),
            (351, 1),
            (360, 1),
            (361, 0),
            (380, 0),
            (381, 1),
            (390, 1),
            (391, 2),
            (450, 2),
        ];
        for (tenths, expected) in cases {
            let m = MeasurementSet {
                temperature: Temperature::from_tenths(tenths),
                ..normal()
            };
            let s = score(&m);
            assert_eq!(
                s.sub_score(Parameter::Temperature).unwrap().points(),
                expected,
                "temperature {tenths}"
            );
            // 2 points for pyrexia is not an extreme band.
            assert_eq!(s.critical, expected == 3, "temperature {tenths}");
        }
    }

    #[test]
    fn scenario_mild_tachypnoea() {
        let m = MeasurementSet {
            respiratory_rate: 24,
            oxygen_saturation: 94,
            supplemental_oxygen: false,
            systolic_bp: 115,
            heart_rate: 88,
            consciousness: ConsciousnessLevel::Alert,
            temperature: Temperature::from_tenths(365),
            ..normal()
        };

        assert_eq!(points(&m), vec![2, 1, 0, 0, 0, 0]);
        let s = score(&m);
        assert_eq!(s.composite, 3);
        assert!(!s.critical);
    }

    #[test]
    fn scenario_multi_organ_deterioration() {
        let m = MeasurementSet {
            respiratory_rate: 9,
            oxygen_saturation: 92,
            supplemental_oxygen: true,
            systolic_bp: 95,
            heart_rate: 135,
            consciousness: ConsciousnessLevel::Confused,
            temperature: Temperature::from_tenths(349),
            ..normal()
        };

        assert_eq!(points(&m), vec![1, 4, 2, 3, 3, 3]);
        let s = score(&m);
        assert_eq!(s.composite, 16);
        assert!(s.critical);
        assert_eq!(Evaluation::from_score(s).alert_tier, AlertTier::High);
    }

    #[test]
    fn maximum_composite_is_twenty() {
        let m = MeasurementSet {
            respiratory_rate: 30,
            oxygen_saturation: 85,
            supplemental_oxygen: true,
            systolic_bp: 80,
            heart_rate: 150,
            consciousness: ConsciousnessLevel::Unresponsive,
            temperature: Temperature::from_tenths(340),
            ..normal()
        };

        let s = score(&m);
        assert_eq!(s.composite, MAX_COMPOSITE_SCORE);
        assert_eq!(s.composite, 20);
    }

    #[test]
    fn composite_stays_in_range_and_critical_tracks_extreme_bands() {
        let rrs = [0, 8, 9, 12, 21, 25, 60];
        let spo2s = [0, 91, 92, 94, 96, 100];
        let sbps = [0, 90, 91, 101, 111, 220];
        let hrs = [0, 40, 41, 51, 91, 111, 131];
        let temps = [250, 350, 351, 361, 381, 391, 450];

        for &rr in &rrs {
            for &spo2 in &spo2s {
                for &sbp in &sbps {
                    for &hr in &hrs {
                        for &temp in &temps {
                            for o2 in [false, true] {
                                for acvpu in [ConsciousnessLevel::Alert, ConsciousnessLevel::Pain]
                                {
                                    let m = MeasurementSet {
                                        respiratory_rate: rr,
                                        oxygen_saturation: spo2,
                                        supplemental_oxygen: o2,
                                        systolic_bp: sbp,
                                        heart_rate: hr,
                                        consciousness: acvpu,
                                        temperature: Temperature::from_tenths(temp),
                                        ..normal()
                                    };
                                    let s = score(&m);
                                    assert!(s.composite <= MAX_COMPOSITE_SCORE);
                                    assert_eq!(
                                        s.composite,
                                        s.sub_scores.iter().map(SubScore::points).sum::<u8>()
                                    );
                                    assert_eq!(s.critical, s.max_band_points() == 3);
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn scoring_is_deterministic() {
        let m = MeasurementSet {
            respiratory_rate: 22,
            heart_rate: 112,
            ..normal()
        };
        assert_eq!(score(&m), score(&m));
    }
}
