//! The intake → upload → results workflow.
//!
//! `Session` holds every piece of per-patient state and is only mutated
//! through the transition methods below. It knows nothing about timers or
//! the network: the caller starts an operation with `begin_*`, performs the
//! I/O, and hands the outcome back with the matching `finish_*` together with
//! the [`Ticket`] it was given. A ticket issued before a reset is stale and
//! its outcome is dropped.
//!
//! The auto-reset countdown advances only through [`Session::tick`], which
//! the caller invokes once per elapsed second while
//! [`Session::countdown_active`] holds.

use crate::error::ClientError;
use crate::mail::SendReportRequest;
use crate::{is_allowed_mime_type, ApiStatus, PatientField, PatientInfo, PredictionResult, SelectedImage};
use strum_macros::Display;
use thiserror::Error;

/// Seconds the results screen stays up before the session resets itself.
pub const COUNTDOWN_SECONDS: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Step {
    #[default]
    Intake,
    Upload,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Action {
    #[strum(serialize = "updating patient information")]
    UpdateField,
    #[strum(serialize = "editing patient information")]
    EditPatientInfo,
    #[strum(serialize = "submitting patient information")]
    Submit,
    #[strum(serialize = "selecting an image")]
    SelectImage,
    #[strum(serialize = "uploading")]
    Upload,
    #[strum(serialize = "sending the report")]
    SendReport,
    #[strum(serialize = "generating the report")]
    GenerateReport,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("{action} is not available in the {from} step")]
    InvalidTransition { from: Step, action: Action },
    #[error("{0} is already in progress")]
    Busy(Action),
    #[error("the report has already been sent for this result")]
    AlreadySent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InFlight {
    pub upload: bool,
    pub send: bool,
    pub generate: bool,
}

/// Proof that an operation was started in a given session epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    epoch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The countdown is not armed; nothing changed.
    Idle,
    /// One second elapsed; the value is the remaining time.
    Running(u32),
    /// The countdown reached zero and the session was reset.
    Expired,
}

#[derive(Debug, Clone)]
pub struct Session<H> {
    step: Step,
    patient: PatientInfo,
    image: Option<SelectedImage<H>>,
    prediction: Option<PredictionResult>,
    countdown: u32,
    report_sent: bool,
    in_flight: InFlight,
    error: Option<String>,
    notice: Option<String>,
    api_status: ApiStatus,
    epoch: u64,
    next_image_id: u64,
}

impl<H> Default for Session<H> {
    fn default() -> Self {
        Self {
            step: Step::Intake,
            patient: PatientInfo::default(),
            image: None,
            prediction: None,
            countdown: 0,
            report_sent: false,
            in_flight: InFlight::default(),
            error: None,
            notice: None,
            api_status: ApiStatus::Checking,
            epoch: 0,
            next_image_id: 1,
        }
    }
}

impl<H> Session<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn patient(&self) -> &PatientInfo {
        &self.patient
    }

    pub fn image(&self) -> Option<&SelectedImage<H>> {
        self.image.as_ref()
    }

    pub fn prediction(&self) -> Option<&PredictionResult> {
        self.prediction.as_ref()
    }

    pub fn countdown(&self) -> u32 {
        self.countdown
    }

    pub fn report_sent(&self) -> bool {
        self.report_sent
    }

    pub fn in_flight(&self) -> InFlight {
        self.in_flight
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn api_status(&self) -> ApiStatus {
        self.api_status
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Shows `error` as the single visible message.
    pub fn record_error(&mut self, error: &ClientError) {
        self.error = Some(error.to_string());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    // Intake

    pub fn update_field(&mut self, field: PatientField, value: impl Into<String>) -> Result<(), SessionError> {
        self.require_step(Step::Intake, Action::UpdateField)?;
        self.patient = self.patient.with_field(field, value);
        Ok(())
    }

    pub fn submit_intake(&mut self) -> Result<(), SessionError> {
        self.require_step(Step::Intake, Action::Submit)?;
        if !self.patient.is_complete() {
            return Err(self.fail(ClientError::incomplete_patient_info()));
        }
        self.step = Step::Upload;
        self.error = None;
        Ok(())
    }

    /// Back-navigation from upload. Patient fields are kept.
    pub fn edit_patient_info(&mut self) -> Result<(), SessionError> {
        self.require_step(Step::Upload, Action::EditPatientInfo)?;
        if self.in_flight.upload {
            return Err(SessionError::Busy(Action::Upload));
        }
        self.step = Step::Intake;
        self.error = None;
        Ok(())
    }

    // Image selection

    /// Validates and installs a new image, returning its id for the preview
    /// decode. A rejected file leaves the current image and result in place.
    pub fn select_image(&mut self, mut image: SelectedImage<H>) -> Result<u64, SessionError> {
        self.require_step(Step::Upload, Action::SelectImage)?;
        if self.in_flight.upload {
            return Err(SessionError::Busy(Action::Upload));
        }
        if !is_allowed_mime_type(&image.mime_type) {
            return Err(self.fail(ClientError::UnsupportedType(image.mime_type)));
        }

        image.id = self.next_image_id;
        image.preview = None;
        self.next_image_id += 1;

        let id = image.id;
        self.image = Some(image);
        self.prediction = None;
        self.error = None;
        self.notice = None;
        Ok(id)
    }

    /// Attaches a decoded preview. Ignored if the image was replaced meanwhile.
    pub fn attach_preview(&mut self, image_id: u64, data_uri: String) -> bool {
        match self.image.as_mut() {
            Some(image) if image.id == image_id => {
                image.preview = Some(data_uri);
                true
            }
            _ => false,
        }
    }

    pub fn preview_failed(&mut self, image_id: u64, reason: &str) -> bool {
        match self.image.as_ref() {
            Some(image) if image.id == image_id => {
                self.notice = Some(format!(
                    "Preview could not be generated ({reason}). The image can still be analyzed."
                ));
                true
            }
            _ => false,
        }
    }

    // Service health

    pub fn begin_health_check(&mut self) {
        self.api_status = ApiStatus::Checking;
    }

    pub fn finish_health_check(&mut self, status: ApiStatus) {
        self.api_status = status;
    }

    // Classification

    pub fn can_upload(&self) -> bool {
        self.step == Step::Upload
            && self.image.is_some()
            && self.api_status == ApiStatus::Online
            && !self.in_flight.upload
    }

    pub fn begin_upload(&mut self) -> Result<Ticket, SessionError> {
        self.require_step(Step::Upload, Action::Upload)?;
        if self.in_flight.upload {
            return Err(SessionError::Busy(Action::Upload));
        }
        if self.image.is_none() {
            return Err(self.fail(ClientError::Validation("Please select an image first.".into())));
        }
        if self.api_status != ApiStatus::Online {
            return Err(self.fail(ClientError::Validation(
                "The classification service is not available. Retry the connection check first.".into(),
            )));
        }
        self.in_flight.upload = true;
        self.error = None;
        Ok(self.ticket())
    }

    /// Applies a classification outcome. Returns `false` for a stale ticket.
    pub fn finish_upload(&mut self, ticket: Ticket, outcome: Result<PredictionResult, ClientError>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.in_flight.upload = false;
        match outcome {
            Ok(prediction) => {
                self.prediction = Some(prediction);
                self.step = Step::Results;
                self.countdown = COUNTDOWN_SECONDS;
                self.report_sent = false;
                self.error = None;
            }
            Err(error) => self.record_error(&error),
        }
        true
    }

    // Countdown

    pub fn countdown_active(&self) -> bool {
        self.step == Step::Results && self.prediction.is_some() && self.countdown > 0
    }

    pub fn tick(&mut self) -> Tick {
        if !self.countdown_active() {
            return Tick::Idle;
        }
        self.countdown -= 1;
        if self.countdown == 0 {
            self.reset();
            Tick::Expired
        } else {
            Tick::Running(self.countdown)
        }
    }

    /// Full reset back to intake. The service status is kept.
    pub fn reset(&mut self) {
        self.step = Step::Intake;
        self.patient = PatientInfo::default();
        self.image = None;
        self.prediction = None;
        self.countdown = 0;
        self.report_sent = false;
        self.in_flight = InFlight::default();
        self.error = None;
        self.notice = None;
        self.epoch += 1;
    }

    // Reports

    pub fn can_send_report(&self) -> bool {
        self.step == Step::Results
            && self.prediction.is_some()
            && !self.report_sent
            && !self.in_flight.send
    }

    pub fn can_generate_report(&self) -> bool {
        self.step == Step::Results && self.prediction.is_some() && !self.in_flight.generate
    }

    pub fn begin_send_report(&mut self) -> Result<Ticket, SessionError> {
        self.require_results(Action::SendReport)?;
        if self.in_flight.send {
            return Err(SessionError::Busy(Action::SendReport));
        }
        if self.report_sent {
            return Err(SessionError::AlreadySent);
        }
        if !self.patient.has_email() {
            return Err(self.fail(ClientError::Validation(
                "Patient email is required to send the report.".into(),
            )));
        }
        self.in_flight.send = true;
        Ok(self.ticket())
    }

    pub fn finish_send_report(&mut self, ticket: Ticket, outcome: Result<(), ClientError>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.in_flight.send = false;
        match outcome {
            Ok(()) => {
                self.report_sent = true;
                self.error = None;
            }
            Err(error) => self.record_error(&error),
        }
        true
    }

    pub fn begin_generate_report(&mut self) -> Result<Ticket, SessionError> {
        self.require_results(Action::GenerateReport)?;
        if self.in_flight.generate {
            return Err(SessionError::Busy(Action::GenerateReport));
        }
        self.in_flight.generate = true;
        Ok(self.ticket())
    }

    pub fn finish_generate_report(&mut self, ticket: Ticket, outcome: Result<(), ClientError>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.in_flight.generate = false;
        match outcome {
            Ok(()) => self.error = None,
            Err(error) => self.record_error(&error),
        }
        true
    }

    /// Payload for the report-mail service built from the current result.
    pub fn report_request(&self) -> Option<SendReportRequest> {
        let prediction = self.prediction.clone()?;
        Some(SendReportRequest {
            patient_info: Some(self.patient.clone()),
            prediction: Some(prediction),
            image_data: self.image.as_ref().and_then(|image| image.preview.clone()),
        })
    }

    fn ticket(&self) -> Ticket {
        Ticket { epoch: self.epoch }
    }

    /// Whether `ticket` was issued in the current epoch.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.epoch == self.epoch
    }

    fn require_step(&self, step: Step, action: Action) -> Result<(), SessionError> {
        if self.step == step {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition { from: self.step, action })
        }
    }

    fn require_results(&self, action: Action) -> Result<(), SessionError> {
        self.require_step(Step::Results, action)?;
        if self.prediction.is_none() {
            return Err(SessionError::InvalidTransition { from: self.step, action });
        }
        Ok(())
    }

    fn fail(&mut self, error: ClientError) -> SessionError {
        self.record_error(&error);
        SessionError::Client(error)
    }
}
