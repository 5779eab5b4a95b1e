use super::{FallbackMode, REPORT_TITLE};
use crate::{PatientInfo, PredictionResult};
use chrono::NaiveDateTime;

const NOT_AVAILABLE: &str = "N/A";
const UNKNOWN: &str = "Unknown";

pub const DISCLAIMER: &str = "This report was generated by an automated image classifier and is \
intended to support, not replace, clinical judgement. All results must be reviewed and confirmed \
by a qualified hematologist or pathologist before any diagnostic or treatment decision is made.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Warning,
    Normal,
}

impl Tone {
    pub fn for_label(label: &str) -> Self {
        if crate::is_positive_label(label) {
            Tone::Warning
        } else {
            Tone::Normal
        }
    }

    pub fn rgb(&self) -> (f32, f32, f32) {
        match self {
            Tone::Warning => (0.80, 0.15, 0.15),
            Tone::Normal => (0.13, 0.55, 0.25),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title { title: String, subtitle: String },
    Section(String),
    Field { label: &'static str, value: String },
    Classification { label: String, tone: Tone },
    Confidence(String),
    Interpretation(String),
    Probability { label: String, percent: String },
    Timestamp(String),
    Disclaimer(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl ReportLayout {
    pub fn build(
        patient: &PatientInfo,
        prediction: &PredictionResult,
        mode: FallbackMode,
        generated_at: NaiveDateTime,
    ) -> Self {
        let mut blocks = vec![
            Block::Title {
                title: REPORT_TITLE.to_string(),
                subtitle: "Blood smear image classification".to_string(),
            },
            Block::Section("Patient Information".to_string()),
        ];

        let gender = patient.gender.map(|g| g.title().to_string()).unwrap_or_default();
        let fields = [
            ("Name", patient.name.as_str(), NOT_AVAILABLE),
            ("Age", patient.age.as_str(), NOT_AVAILABLE),
            ("Gender", gender.as_str(), UNKNOWN),
            ("Phone", patient.phone.as_str(), NOT_AVAILABLE),
            ("Email", patient.email.as_str(), NOT_AVAILABLE),
        ];
        for (label, value, fallback) in fields {
            let value = value.trim();
            match (value.is_empty(), mode) {
                (false, _) => blocks.push(Block::Field { label, value: value.to_string() }),
                (true, FallbackMode::Lenient) => {
                    blocks.push(Block::Field { label, value: fallback.to_string() })
                }
                (true, FallbackMode::Strict) => {}
            }
        }

        let label = match prediction.prediction.trim() {
            "" => UNKNOWN.to_string(),
            label => label.to_string(),
        };
        let tone = Tone::for_label(&label);

        blocks.push(Block::Section("Classification Result".to_string()));
        blocks.push(Block::Classification { label, tone });
        blocks.push(Block::Confidence(prediction.confidence_percent()));
        blocks.push(Block::Interpretation(interpretation(tone).to_string()));

        if let Some(probabilities) = prediction.probabilities.as_ref().filter(|p| !p.is_empty()) {
            blocks.push(Block::Section("Class Probabilities".to_string()));
            for (label, value) in probabilities {
                blocks.push(Block::Probability {
                    label: label.clone(),
                    percent: format!("{:.2}%", value * 100.0),
                });
            }
        }

        blocks.push(Block::Timestamp(format!(
            "Generated on {}",
            generated_at.format("%Y-%m-%d %H:%M:%S")
        )));
        blocks.push(Block::Disclaimer(DISCLAIMER.to_string()));

        Self { title: REPORT_TITLE.to_string(), blocks }
    }

    pub fn classification(&self) -> Option<(&str, Tone)> {
        self.blocks.iter().find_map(|block| match block {
            Block::Classification { label, tone } => Some((label.as_str(), *tone)),
            _ => None,
        })
    }

    pub fn confidence(&self) -> Option<&str> {
        self.blocks.iter().find_map(|block| match block {
            Block::Confidence(text) => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn field(&self, wanted: &str) -> Option<&str> {
        self.blocks.iter().find_map(|block| match block {
            Block::Field { label, value } if *label == wanted => Some(value.as_str()),
            _ => None,
        })
    }
}

fn interpretation(tone: Tone) -> &'static str {
    match tone {
        Tone::Warning => {
            "The analyzed blood smear shows features consistent with leukemia. \
             Prompt follow-up with a hematologist is recommended."
        }
        Tone::Normal => {
            "The analyzed blood smear shows no features consistent with leukemia. \
             Routine follow-up is recommended if symptoms persist."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Gender;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap().and_hms_opt(9, 30, 0).unwrap()
    }

    fn jane() -> PatientInfo {
        PatientInfo {
            name: "Jane Doe".into(),
            age: "34".into(),
            gender: Some(Gender::Female),
            phone: "555-0100".into(),
            email: "jane@example.com".into(),
        }
    }

    fn prediction(label: &str, confidence: f64) -> PredictionResult {
        PredictionResult { prediction: label.into(), confidence, probabilities: None }
    }

    #[test]
    fn positive_scenario() {
        let layout = ReportLayout::build(&jane(), &prediction("Leukemia", 0.92), FallbackMode::Strict, generated_at());

        assert_eq!(layout.classification(), Some(("Leukemia", Tone::Warning)));
        assert_eq!(layout.confidence(), Some("92.0%"));
        assert_eq!(layout.field("Gender"), Some("Female"));
        assert!(layout.blocks.iter().any(|b| matches!(b, Block::Timestamp(t) if t.contains("2026-10-14 09:30:00"))));
        assert!(matches!(layout.blocks.last(), Some(Block::Disclaimer(_))));
    }

    #[test]
    fn tone_and_interpretation_agree_regardless_of_case() {
        let layout = ReportLayout::build(&jane(), &prediction("leukemia", 0.7), FallbackMode::Strict, generated_at());
        assert_eq!(layout.classification(), Some(("leukemia", Tone::Warning)));
        assert!(layout.blocks.iter().any(
            |b| matches!(b, Block::Interpretation(text) if text.contains("consistent with leukemia") && !text.contains("no features"))
        ));

        let layout = ReportLayout::build(&jane(), &prediction("Healthy", 0.7), FallbackMode::Strict, generated_at());
        assert_eq!(layout.classification(), Some(("Healthy", Tone::Normal)));
    }

    #[test]
    fn strict_omits_and_lenient_fills_missing_fields() {
        let patient = PatientInfo { name: "Jane Doe".into(), email: "jane@example.com".into(), ..Default::default() };
        let result = prediction("Healthy", 0.81);

        let strict = ReportLayout::build(&patient, &result, FallbackMode::Strict, generated_at());
        assert_eq!(strict.field("Age"), None);
        assert_eq!(strict.field("Gender"), None);

        let lenient = ReportLayout::build(&patient, &result, FallbackMode::Lenient, generated_at());
        assert_eq!(lenient.field("Age"), Some("N/A"));
        assert_eq!(lenient.field("Phone"), Some("N/A"));
        assert_eq!(lenient.field("Gender"), Some("Unknown"));
        assert_eq!(lenient.field("Name"), Some("Jane Doe"));
    }

    #[test]
    fn both_modes_agree_on_classification() {
        let result = prediction("Leukemia", 0.9234);
        let strict = ReportLayout::build(&jane(), &result, FallbackMode::Strict, generated_at());
        let lenient = ReportLayout::build(&jane(), &result, FallbackMode::Lenient, generated_at());

        assert_eq!(strict.classification(), lenient.classification());
        assert_eq!(strict.confidence(), lenient.confidence());
        assert_eq!(strict, lenient);
    }

    #[test]
    fn probabilities_listed_with_two_decimals() {
        let mut probabilities = BTreeMap::new();
        probabilities.insert("Healthy".to_string(), 0.08123);
        probabilities.insert("Leukemia".to_string(), 0.91877);
        let result = PredictionResult { probabilities: Some(probabilities), ..prediction("Leukemia", 0.91877) };

        let layout = ReportLayout::build(&jane(), &result, FallbackMode::Strict, generated_at());
        let items: Vec<_> = layout
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Probability { label, percent } => Some((label.as_str(), percent.as_str())),
                _ => None,
            })
            .collect();
        assert_eq!(items, vec![("Healthy", "8.12%"), ("Leukemia", "91.88%")]);
    }

    #[test]
    fn empty_probability_map_has_no_section() {
        let result = PredictionResult { probabilities: Some(BTreeMap::new()), ..prediction("Healthy", 0.5) };
        let layout = ReportLayout::build(&jane(), &result, FallbackMode::Strict, generated_at());
        assert!(!layout.blocks.contains(&Block::Section("Class Probabilities".into())));
    }
}
