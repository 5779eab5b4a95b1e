use thiserror::Error;

/// Failures a workflow action can end in. `Display` is the message shown to
/// the operator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),
    #[error("Invalid file type \"{0}\". Only image/bmp, image/jpeg and image/png are allowed.")]
    UnsupportedType(String),
    #[error("Could not connect to the classification service at {0}. Please make sure it is running.")]
    Network(String),
    #[error("Classification service error ({status}): {detail}")]
    Service { status: u16, detail: String },
    #[error("Unexpected response from the classification service: {0}")]
    Protocol(String),
    #[error("Failed to deliver the report: {0}")]
    Delivery(String),
    #[error("Failed to generate the report: {0}")]
    Render(String),
    #[error("Something went wrong: {0}")]
    Internal(String),
}

impl ClientError {
    pub fn incomplete_patient_info() -> Self {
        ClientError::Validation("Please fill in all patient information fields.".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_message_points_at_service() {
        let message = ClientError::Network("http://127.0.0.1:8000".into()).to_string();
        assert!(message.contains("make sure it is running"));
        assert!(message.contains("http://127.0.0.1:8000"));
    }
}
