use super::super::{Model, Msg};
use super::utils::{first_file, save_file};
use crate::api;
use chrono::Local;
use gloo_file::callbacks::read_as_data_url;
use gloo_file::File as GlooFile;
use gloo_timers::callback::Timeout;
use shared::report::{render_pdf, report_filename, FallbackMode};
use shared::session::{SessionError, Tick, Ticket};
use shared::{ClientError, PatientField, PredictionResult, SelectedImage};
use wasm_bindgen_futures::spawn_local;
use web_sys::{ClipboardEvent, DragEvent};
use yew::prelude::*;

fn log_rejected(action: &str, error: &SessionError) {
    match error {
        SessionError::Client(e) => log::warn!("{} failed: {}", action, e),
        other => log::debug!("{} ignored: {}", action, other),
    }
}

pub fn handle_update_field(model: &mut Model, field: PatientField, value: String) -> bool {
    match model.session.update_field(field, value) {
        Ok(()) => true,
        Err(e) => {
            log_rejected("Field update", &e);
            false
        }
    }
}

pub fn handle_submit_intake(model: &mut Model) -> bool {
    if let Err(e) = model.session.submit_intake() {
        log_rejected("Patient intake", &e);
    }
    true
}

pub fn handle_edit_patient_info(model: &mut Model) -> bool {
    model.cancel_countdown();
    if let Err(e) = model.session.edit_patient_info() {
        log_rejected("Back navigation", &e);
    }
    true
}

pub fn handle_file_selected(model: &mut Model, ctx: &Context<Model>, file: GlooFile) -> bool {
    let image = SelectedImage::new(file.clone(), file.name(), file.raw_mime_type(), file.size());

    match model.session.select_image(image) {
        Ok(image_id) => {
            let link = ctx.link().clone();
            // Replacing the reader drops any decode still running for the old file.
            model.preview_reader = Some(read_as_data_url(&file, move |outcome| {
                link.send_message(Msg::PreviewDecoded(image_id, outcome.map_err(|e| e.to_string())));
            }));
        }
        Err(e) => log_rejected(&format!("Selecting {}", file.name()), &e),
    }
    true
}

pub fn handle_preview_decoded(model: &mut Model, image_id: u64, outcome: Result<String, String>) -> bool {
    model.preview_reader = None;
    match outcome {
        Ok(data_uri) => model.session.attach_preview(image_id, data_uri),
        Err(reason) => {
            log::warn!("Preview decode failed: {}", reason);
            model.session.preview_failed(image_id, &reason)
        }
    }
}

pub fn handle_drop(model: &mut Model, ctx: &Context<Model>, event: DragEvent) -> bool {
    event.prevent_default();
    model.is_dragging = false;

    if let Some(file) = event
        .data_transfer()
        .and_then(|data_transfer| data_transfer.files())
        .and_then(|file_list| first_file(&file_list))
    {
        ctx.link().send_message(Msg::FileSelected(file));
    }

    true
}

pub fn handle_paste(model: &mut Model, ctx: &Context<Model>, event: ClipboardEvent) -> bool {
    if model.session.step() != shared::Step::Upload {
        return false;
    }
    if let Some(file) = event
        .clipboard_data()
        .and_then(|data_transfer| data_transfer.files())
        .and_then(|file_list| first_file(&file_list))
    {
        event.prevent_default();
        ctx.link().send_message(Msg::FileSelected(file));
        return true;
    }
    false
}

pub fn handle_check_health(model: &mut Model, ctx: &Context<Model>) -> bool {
    model.session.begin_health_check();
    let link = ctx.link().clone();
    spawn_local(async move {
        let status = api::probe_health().await;
        link.send_message(Msg::HealthChecked(status));
    });
    true
}

pub fn handle_upload(model: &mut Model, ctx: &Context<Model>) -> bool {
    let ticket = match model.session.begin_upload() {
        Ok(ticket) => ticket,
        Err(e) => {
            log_rejected("Upload", &e);
            return true;
        }
    };
    let Some(file) = model.session.image().map(|image| image.handle.clone()) else {
        return true;
    };

    let link = ctx.link().clone();
    spawn_local(async move {
        log::info!("Uploading {} for classification", file.name());
        let outcome = api::classify(&file).await;
        link.send_message(Msg::UploadFinished(ticket, outcome));
    });
    true
}

pub fn handle_upload_finished(
    model: &mut Model,
    ticket: Ticket,
    outcome: Result<PredictionResult, ClientError>,
) -> bool {
    if let Ok(prediction) = &outcome {
        log::info!("Classification: {} ({})", prediction.prediction, prediction.confidence_percent());
    }
    if !model.session.finish_upload(ticket, outcome) {
        log::debug!("Dropping classification result from a previous session");
        return false;
    }
    true
}

pub fn handle_countdown_tick(model: &mut Model, epoch: u64) -> bool {
    // The timeout that produced this message has fired.
    model.countdown_timer = None;
    if epoch != model.session.epoch() {
        return false;
    }
    match model.session.tick() {
        Tick::Idle => false,
        Tick::Running(_) => true,
        Tick::Expired => {
            log::info!("Results timed out, session reset");
            model.preview_reader = None;
            true
        }
    }
}

pub fn handle_download_report(model: &mut Model, ctx: &Context<Model>) -> bool {
    let ticket = match model.session.begin_generate_report() {
        Ok(ticket) => ticket,
        Err(e) => {
            log_rejected("Report generation", &e);
            return false;
        }
    };

    // Yield once so the button can show its busy state before rendering.
    let link = ctx.link().clone();
    model.report_timeout = Some(Timeout::new(0, move || {
        link.send_message(Msg::RenderReport(ticket));
    }));
    true
}

pub fn handle_render_report(model: &mut Model, ticket: Ticket) -> bool {
    model.report_timeout = None;
    if !model.session.is_current(ticket) {
        log::debug!("Dropping report render from a previous session");
        return false;
    }
    let Some(prediction) = model.session.prediction().cloned() else {
        return model.session.finish_generate_report(ticket, Ok(()));
    };
    let patient = model.session.patient().clone();
    let now = Local::now().naive_local();

    let outcome = render_pdf(&patient, &prediction, FallbackMode::Strict, now)
        .map_err(|e| ClientError::Render(e.to_string()))
        .and_then(|report| {
            let filename = report_filename(&patient.name, now.date());
            log::info!("Saving report {} ({} page(s))", filename, report.pages);
            save_file(&report.bytes, &filename, "application/pdf")
        });

    model.session.finish_generate_report(ticket, outcome)
}

pub fn handle_send_report(model: &mut Model, ctx: &Context<Model>) -> bool {
    let ticket = match model.session.begin_send_report() {
        Ok(ticket) => ticket,
        Err(e) => {
            log_rejected("Sending report", &e);
            return true;
        }
    };
    let Some(request) = model.session.report_request() else {
        return model.session.finish_send_report(ticket, Err(ClientError::Internal("no result to report".into())));
    };

    let link = ctx.link().clone();
    spawn_local(async move {
        let outcome = api::send_report(&request).await;
        link.send_message(Msg::ReportSent(ticket, outcome));
    });
    true
}

pub fn handle_report_sent(model: &mut Model, ticket: Ticket, outcome: Result<(), ClientError>) -> bool {
    match &outcome {
        Ok(()) => log::info!("Report emailed"),
        Err(e) => log::warn!("Report email failed: {}", e),
    }
    model.session.finish_send_report(ticket, outcome)
}

pub fn handle_reset(model: &mut Model) -> bool {
    model.cancel_countdown();
    if let Some(timeout) = model.report_timeout.take() {
        timeout.cancel();
    }
    model.preview_reader = None;
    model.session.reset();
    true
}
