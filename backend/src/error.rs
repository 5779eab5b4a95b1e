use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use shared::mail::SendReportResponse;

#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("{0}")]
    Validation(String),
    #[error("Failed to send email: {0}")]
    Delivery(String),
    #[error("Failed to generate report: {0}")]
    Internal(String),
}

impl From<shared::report::RenderError> for MailerError {
    fn from(err: shared::report::RenderError) -> Self {
        MailerError::Internal(err.to_string())
    }
}

impl ResponseError for MailerError {
    fn status_code(&self) -> StatusCode {
        match self {
            MailerError::Validation(_) => StatusCode::BAD_REQUEST,
            MailerError::Delivery(_) => StatusCode::BAD_GATEWAY,
            MailerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(SendReportResponse::failed(self.to_string()))
    }
}
