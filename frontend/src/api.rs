use crate::config;
use futures::future::{select, Either};
use gloo_file::File as GlooFile;
use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;
use shared::inference::{parse_prediction, service_error, PREDICT_PATH, UPLOAD_FIELD};
use shared::mail::{send_report_error, SendReportRequest, SendReportResponse, SEND_REPORT_PATH};
use shared::{ApiStatus, ClientError, PredictionResult};

/// Probes the inference service root. Anything but a 2xx within the timeout
/// counts as offline.
pub async fn probe_health() -> ApiStatus {
    let url = config::endpoint(config::inference_api_url(), "/");
    let request = Box::pin(Request::get(&url).send());
    let timeout = Box::pin(TimeoutFuture::new(config::health_timeout_ms()));

    match select(request, timeout).await {
        Either::Left((Ok(response), _)) => {
            log::info!("Health probe {} returned {}", url, response.status());
            ApiStatus::from_probe(Some(response.status()))
        }
        Either::Left((Err(e), _)) => {
            log::warn!("Health probe {} failed: {}", url, e);
            ApiStatus::from_probe(None)
        }
        Either::Right(_) => {
            log::warn!("Health probe {} timed out", url);
            ApiStatus::from_probe(None)
        }
    }
}

pub async fn classify(file: &GlooFile) -> Result<PredictionResult, ClientError> {
    let base = config::inference_api_url();
    let url = config::endpoint(base, PREDICT_PATH);

    let form_data = web_sys::FormData::new()
        .map_err(|e| ClientError::Internal(format!("could not build upload form: {:?}", e)))?;
    form_data
        .append_with_blob_and_filename(UPLOAD_FIELD, file.as_ref(), &file.name())
        .map_err(|e| ClientError::Internal(format!("could not attach image: {:?}", e)))?;

    let request = Request::post(&url)
        .body(form_data)
        .map_err(|e| ClientError::Internal(e.to_string()))?;

    let response = request.send().await.map_err(|e| {
        log::error!("Upload to {} failed: {}", url, e);
        ClientError::Network(base.to_string())
    })?;

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if !response.ok() {
        log::warn!("Classification service returned {}", status);
        return Err(service_error(status, &response.status_text(), &body));
    }

    parse_prediction(&body)
}

pub async fn send_report(request: &SendReportRequest) -> Result<(), ClientError> {
    let url = config::endpoint(config::mailer_api_url(), SEND_REPORT_PATH);

    let response = Request::post(&url)
        .json(request)
        .map_err(|e| ClientError::Internal(e.to_string()))?
        .send()
        .await
        .map_err(|e| ClientError::Delivery(format!("could not reach the report service: {}", e)))?;

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if !response.ok() {
        return Err(send_report_error(status, &body));
    }

    match serde_json::from_str::<SendReportResponse>(&body) {
        Ok(SendReportResponse { success: true, .. }) => Ok(()),
        Ok(SendReportResponse { error, .. }) => Err(ClientError::Internal(
            error.unwrap_or_else(|| "the report service rejected the request".into()),
        )),
        Err(e) => Err(ClientError::Internal(format!("unexpected report service response: {}", e))),
    }
}
