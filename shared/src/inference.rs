//! Response handling for the inference service's `/predict` endpoint.

use crate::error::ClientError;
use crate::PredictionResult;
use serde::Deserialize;

pub const PREDICT_PATH: &str = "/predict";

/// Multipart field the service reads the upload from.
pub const UPLOAD_FIELD: &str = "file";

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// Parses a `200` body into a [`PredictionResult`].
pub fn parse_prediction(body: &str) -> Result<PredictionResult, ClientError> {
    let result: PredictionResult =
        serde_json::from_str(body).map_err(|e| ClientError::Protocol(e.to_string()))?;

    check_probability("confidence", result.confidence)?;
    if let Some(probabilities) = &result.probabilities {
        for (label, value) in probabilities {
            check_probability(label, *value)?;
        }
    }
    if result.prediction.trim().is_empty() {
        return Err(ClientError::Protocol("prediction label is empty".into()));
    }

    Ok(result)
}

fn check_probability(name: &str, value: f64) -> Result<(), ClientError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ClientError::Protocol(format!("{name} out of range: {value}")))
    }
}

/// Builds the error for a non-success response. `detail` is taken from the
/// JSON body when it is a string, otherwise the status line is used.
pub fn service_error(status: u16, status_text: &str, body: &str) -> ClientError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.detail)
        .and_then(|detail| detail.as_str().map(str::to_owned))
        .filter(|detail| !detail.trim().is_empty())
        .unwrap_or_else(|| format!("{} {}", status, status_text).trim().to_string());

    ClientError::Service { status, detail }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_body() {
        let result = parse_prediction(r#"{"prediction":"Leukemia","confidence":0.92}"#).unwrap();
        assert_eq!(result.prediction, "Leukemia");
        assert_eq!(result.confidence, 0.92);
        assert!(result.probabilities.is_none());
    }

    #[test]
    fn parses_probabilities() {
        let body = r#"{"prediction":"Healthy","confidence":0.8,
                       "probabilities":{"Healthy":0.8,"Leukemia":0.2}}"#;
        let result = parse_prediction(body).unwrap();
        let probabilities = result.probabilities.unwrap();
        assert_eq!(probabilities.len(), 2);
        assert_eq!(probabilities["Leukemia"], 0.2);
    }

    #[test]
    fn rejects_wrong_shape() {
        assert!(matches!(
            parse_prediction(r#"{"error":"Error during prediction"}"#),
            Err(ClientError::Protocol(_))
        ));
        assert!(matches!(parse_prediction("not json"), Err(ClientError::Protocol(_))));
    }

    #[test]
    fn rejects_out_of_range_confidence() {
        assert!(matches!(
            parse_prediction(r#"{"prediction":"Leukemia","confidence":92}"#),
            Err(ClientError::Protocol(_))
        ));
        assert!(matches!(
            parse_prediction(r#"{"prediction":"Leukemia","confidence":0.9,"probabilities":{"Healthy":-0.1}}"#),
            Err(ClientError::Protocol(_))
        ));
    }

    #[test]
    fn service_error_uses_detail_when_present() {
        let err = service_error(503, "Service Unavailable", r#"{"detail":"Model not loaded yet. Please try again in a moment."}"#);
        assert_eq!(
            err,
            ClientError::Service {
                status: 503,
                detail: "Model not loaded yet. Please try again in a moment.".into()
            }
        );
    }

    #[test]
    fn service_error_falls_back_to_status_line() {
        let err = service_error(502, "Bad Gateway", "<html>proxy error</html>");
        assert_eq!(err, ClientError::Service { status: 502, detail: "502 Bad Gateway".into() });

        let err = service_error(422, "Unprocessable Entity", r#"{"detail":[{"loc":["body","file"]}]}"#);
        assert_eq!(err, ClientError::Service { status: 422, detail: "422 Unprocessable Entity".into() });
    }
}
