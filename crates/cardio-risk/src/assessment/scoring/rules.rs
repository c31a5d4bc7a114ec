use super::{RiskScorer, ScorerKind, ScoringError};
use crate::assessment::domain::{
    Gender, MetricLevel, PatientRecord, RiskAssessment, RiskFactor, RiskLabel, ScoreComponent,
};

/// Ceiling applied to the point-derived probability.
const PROBABILITY_CAP: f64 = 0.95;

/// Deterministic point accumulation over independent risk factors.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedScorer;

impl RuleBasedScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn components(&self, record: &PatientRecord) -> Vec<ScoreComponent> {
        let mut components = Vec::new();
        let mut credit = |factor: RiskFactor, points: u32, notes: String| {
            if points > 0 {
                components.push(ScoreComponent {
                    factor,
                    points,
                    notes,
                });
            }
        };

        let age_points = match record.age {
            age if age > 60 => 30,
            age if age > 50 => 20,
            age if age > 40 => 10,
            _ => 0,
        };
        credit(RiskFactor::Age, age_points, format!("age {}", record.age));

        let bmi = record.bmi();
        let bmi_points = if bmi > 30.0 {
            20
        } else if bmi > 25.0 {
            10
        } else {
            0
        };
        credit(RiskFactor::BodyMassIndex, bmi_points, format!("BMI {bmi:.1}"));

        let (systolic, diastolic) = (record.systolic, record.diastolic);
        let bp_points = if systolic >= 140 || diastolic >= 90 {
            25
        } else if systolic >= 130 || diastolic >= 85 {
            15
        } else {
            0
        };
        credit(
            RiskFactor::BloodPressure,
            bp_points,
            format!("blood pressure {systolic}/{diastolic} mmHg"),
        );

        credit(
            RiskFactor::Cholesterol,
            level_points(record.cholesterol),
            format!("cholesterol {}", record.cholesterol.label()),
        );
        credit(
            RiskFactor::Glucose,
            level_points(record.glucose),
            format!("glucose {}", record.glucose.label()),
        );

        if record.smoking {
            credit(RiskFactor::Smoking, 25, "current smoker".to_string());
        }
        if record.alcohol {
            credit(RiskFactor::Alcohol, 10, "regular alcohol intake".to_string());
        }
        if !record.physical_activity {
            credit(
                RiskFactor::PhysicalInactivity,
                15,
                "no regular physical activity".to_string(),
            );
        }
        if record.gender == Gender::Male {
            credit(RiskFactor::Sex, 5, "male sex".to_string());
        }

        components
    }
}

fn level_points(level: MetricLevel) -> u32 {
    match level {
        MetricLevel::WellAboveNormal => 20,
        MetricLevel::AboveNormal => 10,
        MetricLevel::Normal => 0,
    }
}

impl RiskScorer for RuleBasedScorer {
    fn kind(&self) -> ScorerKind {
        ScorerKind::Rules
    }

    fn score(&self, record: &PatientRecord) -> Result<RiskAssessment, ScoringError> {
        let components = self.components(record);
        let risk_score: u32 = components.iter().map(|component| component.points).sum();
        let probability = (f64::from(risk_score) / 100.0).min(PROBABILITY_CAP);

        Ok(RiskAssessment {
            risk_level: RiskLabel::from_probability(probability),
            probability,
            risk_score,
            scorer: ScorerKind::Rules,
            components,
        })
    }
}
