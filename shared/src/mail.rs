//! Wire types for the report-mail service.

use crate::error::ClientError;
use crate::{PatientInfo, PredictionResult};
use serde::{Deserialize, Serialize};

pub const SEND_REPORT_PATH: &str = "/api/send-report";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReportRequest {
    #[serde(default)]
    pub patient_info: Option<PatientInfo>,
    #[serde(default)]
    pub prediction: Option<PredictionResult>,
    /// Image as a `data:` URI, if the client has a preview.
    #[serde(default)]
    pub image_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendReportResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SendReportResponse {
    pub fn ok() -> Self {
        Self { success: true, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, error: Some(error.into()) }
    }
}

/// Maps a failed send-report response onto the client taxonomy.
pub fn send_report_error(status: u16, body: &str) -> ClientError {
    let message = serde_json::from_str::<SendReportResponse>(body)
        .ok()
        .and_then(|response| response.error)
        .unwrap_or_else(|| format!("mail service returned status {}", status));

    match status {
        400 => ClientError::Validation(message),
        502 | 503 | 504 => ClientError::Delivery(message),
        _ => ClientError::Internal(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_camel_case_keys() {
        let request = SendReportRequest {
            patient_info: Some(PatientInfo::default()),
            prediction: None,
            image_data: Some("data:image/png;base64,AAAA".into()),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("patientInfo").is_some());
        assert!(json.get("imageData").is_some());
    }

    #[test]
    fn error_status_mapping() {
        let body = r#"{"success":false,"error":"Patient email is required"}"#;
        assert_eq!(
            send_report_error(400, body),
            ClientError::Validation("Patient email is required".into())
        );
        assert!(matches!(send_report_error(502, body), ClientError::Delivery(_)));
        assert!(matches!(send_report_error(500, ""), ClientError::Internal(m) if m.contains("500")));
    }
}
