pub mod error;
pub mod inference;
pub mod mail;
pub mod report;
pub mod session;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

pub use error::ClientError;
pub use session::{Session, SessionError, Step};

/// MIME types accepted by the inference service.
pub const ALLOWED_MIME_TYPES: [&str; 3] = ["image/bmp", "image/jpeg", "image/png"];

/// Label the classifier uses for a positive finding.
pub const POSITIVE_LABEL: &str = "Leukemia";

pub fn is_allowed_mime_type(mime_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime_type)
}

pub fn is_positive_label(label: &str) -> bool {
    label.trim().eq_ignore_ascii_case(POSITIVE_LABEL)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn title(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum PatientField {
    Name,
    Age,
    Gender,
    Phone,
    Email,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

impl PatientInfo {
    /// Returns a copy with one field replaced. An unrecognised gender clears it.
    pub fn with_field(&self, field: PatientField, value: impl Into<String>) -> Self {
        let value = value.into();
        let mut next = self.clone();
        match field {
            PatientField::Name => next.name = value,
            PatientField::Age => next.age = value,
            PatientField::Gender => next.gender = value.trim().parse().ok(),
            PatientField::Phone => next.phone = value,
            PatientField::Email => next.email = value,
        }
        next
    }

    pub fn is_complete(&self) -> bool {
        [&self.name, &self.age, &self.phone, &self.email]
            .iter()
            .all(|value| !value.trim().is_empty())
            && self.gender.is_some()
    }

    pub fn has_email(&self) -> bool {
        !self.email.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<BTreeMap<String, f64>>,
}

impl PredictionResult {
    pub fn is_positive(&self) -> bool {
        is_positive_label(&self.prediction)
    }

    pub fn confidence_percent(&self) -> String {
        format!("{:.1}%", self.confidence * 100.0)
    }
}

/// A user-selected image. `H` is the platform file handle.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedImage<H> {
    pub id: u64,
    pub handle: H,
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub preview: Option<String>,
}

impl<H> SelectedImage<H> {
    pub fn new(handle: H, name: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        Self {
            id: 0,
            handle,
            name: name.into(),
            mime_type: mime_type.into(),
            size,
            preview: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ApiStatus {
    Online,
    Offline,
    #[default]
    Checking,
}

impl ApiStatus {
    /// Maps a probe outcome: `Some(status)` for a response, `None` for a
    /// transport failure or timeout.
    pub fn from_probe(status: Option<u16>) -> Self {
        match status {
            Some(code) if (200..300).contains(&code) => ApiStatus::Online,
            _ => ApiStatus::Offline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> PatientInfo {
        PatientInfo {
            name: "Jane Doe".into(),
            age: "34".into(),
            gender: Some(Gender::Female),
            phone: "555-0100".into(),
            email: "jane@example.com".into(),
        }
    }

    #[test]
    fn with_field_leaves_original_untouched() {
        let original = PatientInfo::default();
        let updated = original.with_field(PatientField::Name, "Jane Doe");

        assert_eq!(original.name, "");
        assert_eq!(updated.name, "Jane Doe");
    }

    #[test]
    fn gender_parses_lowercase_and_rejects_unknown() {
        let info = PatientInfo::default().with_field(PatientField::Gender, "female");
        assert_eq!(info.gender, Some(Gender::Female));

        let info = info.with_field(PatientField::Gender, "unknown");
        assert_eq!(info.gender, None);
    }

    #[test]
    fn completeness_requires_every_field() {
        assert!(jane().is_complete());

        for field in [PatientField::Name, PatientField::Age, PatientField::Phone, PatientField::Email] {
            let info = jane().with_field(field, "   ");
            assert!(!info.is_complete(), "{field} blank should be incomplete");
        }

        let mut no_gender = jane();
        no_gender.gender = None;
        assert!(!no_gender.is_complete());
    }

    #[test]
    fn patient_info_uses_camel_case_wire_format() {
        let json = serde_json::to_value(jane()).unwrap();
        assert_eq!(json["gender"], "female");
        assert_eq!(json["email"], "jane@example.com");
    }

    #[test]
    fn positive_label_is_case_insensitive() {
        assert!(is_positive_label("Leukemia"));
        assert!(is_positive_label("leukemia"));
        assert!(is_positive_label("LEUKEMIA "));
        assert!(!is_positive_label("Healthy"));
    }

    #[test]
    fn mime_allowlist_is_exact() {
        assert!(is_allowed_mime_type("image/png"));
        assert!(is_allowed_mime_type("image/bmp"));
        assert!(!is_allowed_mime_type("image/gif"));
        assert!(!is_allowed_mime_type("image/PNG"));
        assert!(!is_allowed_mime_type("image/jpg"));
    }

    #[test]
    fn probe_status_mapping() {
        assert_eq!(ApiStatus::from_probe(Some(200)), ApiStatus::Online);
        assert_eq!(ApiStatus::from_probe(Some(204)), ApiStatus::Online);
        assert_eq!(ApiStatus::from_probe(Some(503)), ApiStatus::Offline);
        assert_eq!(ApiStatus::from_probe(None), ApiStatus::Offline);
    }

    #[test]
    fn confidence_percent_has_one_decimal() {
        let result = PredictionResult {
            prediction: "Leukemia".into(),
            confidence: 0.92,
            probabilities: None,
        };
        assert_eq!(result.confidence_percent(), "92.0%");
    }
}
