//! Screening report rendering, shared by the browser download and the
//! report-mail service.
//!
//! [`ReportLayout::build`] decides what goes on the page; [`pdf::paint`]
//! draws it. The only difference between the two callers is the
//! [`FallbackMode`].

pub mod layout;
pub mod pdf;

pub use layout::{Block, ReportLayout, Tone};
pub use pdf::RenderedReport;

use crate::{PatientInfo, PredictionResult};
use chrono::{NaiveDate, NaiveDateTime};

pub const REPORT_TITLE: &str = "Leukemia Screening Report";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackMode {
    /// Empty patient fields are left off the report.
    Strict,
    /// Empty patient fields are printed as "N/A" (gender as "Unknown").
    Lenient,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("PDF font error: {0}")]
    Font(String),
    #[error("PDF save error: {0}")]
    Save(String),
}

pub fn render_pdf(
    patient: &PatientInfo,
    prediction: &PredictionResult,
    mode: FallbackMode,
    generated_at: NaiveDateTime,
) -> Result<RenderedReport, RenderError> {
    let layout = ReportLayout::build(patient, prediction, mode, generated_at);
    pdf::paint(&layout)
}

/// `leukemia-report-<name-slug>-<YYYY-MM-DD>.pdf`
pub fn report_filename(patient_name: &str, date: NaiveDate) -> String {
    let slug = patient_name
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    let slug = if slug.is_empty() { "patient".to_string() } else { slug };
    format!("leukemia-report-{}-{}.pdf", slug, date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    #[test]
    fn filename_slugs_name() {
        assert_eq!(report_filename("Jane Doe", date()), "leukemia-report-jane-doe-2026-10-14.pdf");
        assert_eq!(
            report_filename("  Mary   Ann\tSMITH ", date()),
            "leukemia-report-mary-ann-smith-2026-10-14.pdf"
        );
    }

    #[test]
    fn filename_without_name() {
        assert_eq!(report_filename("", date()), "leukemia-report-patient-2026-10-14.pdf");
    }
}
