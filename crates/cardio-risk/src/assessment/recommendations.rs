use super::domain::{Gender, PatientRecord, RecommendationSet, RiskAssessment, RiskLabel};

const TOTAL_CHOLESTEROL_ADVICE_MG_DL: f64 = 200.0;
const FASTING_GLUCOSE_ADVICE_MG_DL: f64 = 100.0;
const LOW_HDL_MG_DL: f64 = 40.0;
const MALE_WAIST_LIMIT_CM: f64 = 102.0;
const FEMALE_WAIST_LIMIT_CM: f64 = 88.0;

/// Maps a record and its assessment onto fixed advice strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationGenerator;

impl RecommendationGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(
        &self,
        record: &PatientRecord,
        assessment: &RiskAssessment,
    ) -> RecommendationSet {
        let mut set = RecommendationSet::default();
        let panel = record.clinical.as_ref();

        let cholesterol_high = record.cholesterol.is_elevated()
            || panel.is_some_and(|p| p.total_cholesterol >= TOTAL_CHOLESTEROL_ADVICE_MG_DL);
        if cholesterol_high {
            push(
                &mut set.diet,
                &[
                    "Limit saturated fats and cholesterol-rich foods",
                    "Increase fiber intake with whole grains and vegetables",
                ],
            );
        }

        let glucose_high = record.glucose.is_elevated()
            || panel.is_some_and(|p| p.fasting_blood_sugar >= FASTING_GLUCOSE_ADVICE_MG_DL);
        if glucose_high {
            push(
                &mut set.diet,
                &[
                    "Reduce sugar and refined carbohydrate intake",
                    "Choose low glycemic index foods",
                ],
            );
        }

        if panel.is_some_and(|p| p.hdl < LOW_HDL_MG_DL) {
            push(
                &mut set.diet,
                &["Add healthy fats such as olive oil, nuts, and oily fish to support HDL levels"],
            );
        }

        push(
            &mut set.diet,
            &[
                "Eat more fruits, vegetables, and lean proteins",
                "Reduce sodium intake to control blood pressure",
            ],
        );

        if record.smoking {
            push(
                &mut set.lifestyle,
                &[
                    "Quit smoking - this is the most important change you can make",
                    "Seek support through smoking cessation programs",
                ],
            );
        }

        if !record.physical_activity {
            push(
                &mut set.lifestyle,
                &[
                    "Start with 30 minutes of moderate exercise 5 days a week",
                    "Include both cardio and strength training activities",
                ],
            );
        }

        if record.alcohol {
            push(
                &mut set.lifestyle,
                &["Limit alcohol consumption to moderate levels"],
            );
        }

        let waist_limit = match record.gender {
            Gender::Male => MALE_WAIST_LIMIT_CM,
            Gender::Female => FEMALE_WAIST_LIMIT_CM,
        };
        if panel.is_some_and(|p| p.abdominal_circumference_cm > waist_limit) {
            push(
                &mut set.lifestyle,
                &["Work toward a healthier waist circumference through diet and regular activity"],
            );
        }

        push(
            &mut set.lifestyle,
            &[
                "Manage stress through relaxation techniques",
                "Ensure adequate sleep (7-9 hours per night)",
            ],
        );

        match assessment.risk_level {
            RiskLabel::High => push(
                &mut set.medical,
                &[
                    "Schedule an appointment with a cardiologist soon",
                    "Discuss medication options with your healthcare provider",
                ],
            ),
            RiskLabel::Medium => push(
                &mut set.medical,
                &[
                    "Consult with your primary care physician",
                    "Consider more frequent health check-ups",
                ],
            ),
            RiskLabel::Low => {}
        }

        if panel.is_some_and(|p| p.diabetes) {
            push(
                &mut set.medical,
                &["Review your diabetes management plan and blood sugar targets with your doctor"],
            );
        }

        if panel.is_some_and(|p| p.family_history) {
            push(
                &mut set.medical,
                &["Tell your doctor about your family history of heart disease"],
            );
        }

        push(
            &mut set.medical,
            &[
                "Get regular cardiovascular health screenings",
                "Keep track of your blood pressure and cholesterol levels",
            ],
        );

        set
    }
}

fn push(target: &mut Vec<String>, advice: &[&str]) {
    target.extend(advice.iter().map(|line| line.to_string()));
}
