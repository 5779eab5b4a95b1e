pub mod message;
pub mod smtp;

use crate::error::MailerError;
use chrono::{Local, NaiveDateTime};
use futures::future::BoxFuture;
use lettre::message::Mailbox;
use lettre::Message;
use shared::mail::SendReportRequest;
use shared::report::{pdf, report_filename, FallbackMode, ReportLayout};
use shared::{PatientInfo, PredictionResult};
use std::sync::Arc;
use uuid::Uuid;

/// Outbound delivery of a composed report email.
pub trait ReportTransport: Send + Sync {
    fn deliver(&self, message: Message) -> BoxFuture<'_, Result<(), MailerError>>;
}

#[derive(Clone)]
pub struct ReportMailer {
    transport: Arc<dyn ReportTransport>,
    sender: Mailbox,
    subject: String,
}

impl ReportMailer {
    pub fn new(transport: Arc<dyn ReportTransport>, sender: Mailbox, subject: impl Into<String>) -> Self {
        Self {
            transport,
            sender,
            subject: subject.into(),
        }
    }

    pub async fn send(&self, request: SendReportRequest, request_id: Uuid) -> Result<(), MailerError> {
        self.send_at(request, request_id, Local::now().naive_local()).await
    }

    pub async fn send_at(
        &self,
        request: SendReportRequest,
        request_id: Uuid,
        generated_at: NaiveDateTime,
    ) -> Result<(), MailerError> {
        let (patient, prediction) = validate(&request)?;
        let recipient: Mailbox = patient
            .email
            .trim()
            .parse()
            .map_err(|_| MailerError::Validation("Patient email address is invalid".into()))?;

        let layout = ReportLayout::build(patient, prediction, FallbackMode::Lenient, generated_at);
        let report = pdf::paint(&layout)?;
        let filename = report_filename(&patient.name, generated_at.date());
        log::info!(
            "[{}] Rendered {} ({} page(s), {} bytes)",
            request_id,
            filename,
            report.pages,
            report.bytes.len()
        );

        let image = request.image_data.as_deref().and_then(|data| {
            let decoded = message::decode_image(data);
            if decoded.is_none() {
                log::warn!("[{}] Ignoring image data that is not a BMP, JPEG or PNG", request_id);
            }
            decoded
        });

        let email = message::compose(
            message::Envelope {
                from: self.sender.clone(),
                to: recipient,
                subject: &self.subject,
            },
            &layout,
            message::PdfAttachment { filename, bytes: report.bytes },
            image,
        )?;

        log::info!("[{}] Delivering report to a recipient at {}", request_id, email_domain(&patient.email));
        self.transport.deliver(email).await
    }
}

fn validate(request: &SendReportRequest) -> Result<(&PatientInfo, &PredictionResult), MailerError> {
    let patient = request
        .patient_info
        .as_ref()
        .ok_or_else(|| MailerError::Validation("Patient information is required".into()))?;
    let prediction = request
        .prediction
        .as_ref()
        .ok_or_else(|| MailerError::Validation("Prediction result is required".into()))?;
    if !patient.has_email() {
        return Err(MailerError::Validation("Patient email is required".into()));
    }
    Ok((patient, prediction))
}

/// Only the domain is logged; the full address is patient data.
fn email_domain(email: &str) -> &str {
    email.rsplit_once('@').map(|(_, domain)| domain).unwrap_or("unknown domain")
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use tokio::sync::Mutex;

    /// Keeps delivered messages in memory, or fails every delivery.
    #[derive(Default)]
    pub struct MemoryTransport {
        pub sent: Mutex<Vec<Message>>,
        pub fail_with: Option<String>,
    }

    impl MemoryTransport {
        pub fn failing(reason: &str) -> Self {
            Self {
                sent: Mutex::default(),
                fail_with: Some(reason.to_string()),
            }
        }
    }

    impl ReportTransport for MemoryTransport {
        fn deliver(&self, message: Message) -> BoxFuture<'_, Result<(), MailerError>> {
            Box::pin(async move {
                if let Some(reason) = &self.fail_with {
                    return Err(MailerError::Delivery(reason.clone()));
                }
                self.sent.lock().await.push(message);
                Ok(())
            })
        }
    }
}
