mod api;
mod components;
mod config;

use components::{handlers, header, intake_form, preview_area, results, status, upload_section, utils};
use gloo_events::EventListener;
use gloo_file::callbacks::FileReader;
use gloo_file::File as GlooFile;
use gloo_timers::callback::Timeout;
use shared::session::Ticket;
use shared::{ApiStatus, ClientError, PatientField, PredictionResult, Session, Step};
use wasm_bindgen::JsCast;
use web_sys::{ClipboardEvent, DragEvent};
use yew::prelude::*;

const TICK_MS: u32 = 1_000;

// Yew msg components
pub enum Msg {
    // Intake
    UpdateField(PatientField, String),
    SubmitIntake,
    EditPatientInfo,

    // Image selection
    FileSelected(GlooFile),
    PreviewDecoded(u64, Result<String, String>),
    SetDragging(bool),
    HandleDrop(DragEvent),
    HandlePaste(ClipboardEvent),

    // Inference service
    CheckHealth,
    HealthChecked(ApiStatus),
    Upload,
    UploadFinished(Ticket, Result<PredictionResult, ClientError>),

    // Results
    CountdownTick(u64),
    DownloadReport,
    RenderReport(Ticket),
    SendReport,
    ReportSent(Ticket, Result<(), ClientError>),
    Reset,
    DismissError,
}

pub struct Model {
    session: Session<GlooFile>,
    is_dragging: bool,
    paste_listener: Option<EventListener>,
    preview_reader: Option<FileReader>,
    countdown_timer: Option<Timeout>,
    report_timeout: Option<Timeout>,
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let mut model = Self {
            session: Session::new(),
            is_dragging: false,
            paste_listener: None,
            preview_reader: None,
            countdown_timer: None,
            report_timeout: None,
        };

        let link = ctx.link().clone();
        let window = web_sys::window().expect("no global `window` exists");
        let listener = EventListener::new(&window, "paste", move |event| {
            if let Some(clipboard_event) = event.dyn_ref::<ClipboardEvent>() {
                link.send_message(Msg::HandlePaste(clipboard_event.clone()));
            }
        });
        model.paste_listener = Some(listener);

        ctx.link().send_message(Msg::CheckHealth);
        model
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        let render = match msg {
            // Intake
            Msg::UpdateField(field, value) => handlers::handle_update_field(self, field, value),
            Msg::SubmitIntake => handlers::handle_submit_intake(self),
            Msg::EditPatientInfo => handlers::handle_edit_patient_info(self),

            // Image selection
            Msg::FileSelected(file) => handlers::handle_file_selected(self, ctx, file),
            Msg::PreviewDecoded(id, outcome) => handlers::handle_preview_decoded(self, id, outcome),
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }
            Msg::HandleDrop(event) => handlers::handle_drop(self, ctx, event),
            Msg::HandlePaste(event) => handlers::handle_paste(self, ctx, event),

            // Inference service
            Msg::CheckHealth => handlers::handle_check_health(self, ctx),
            Msg::HealthChecked(status) => {
                self.session.finish_health_check(status);
                true
            }
            Msg::Upload => handlers::handle_upload(self, ctx),
            Msg::UploadFinished(ticket, outcome) => handlers::handle_upload_finished(self, ticket, outcome),

            // Results
            Msg::CountdownTick(epoch) => handlers::handle_countdown_tick(self, epoch),
            Msg::DownloadReport => handlers::handle_download_report(self, ctx),
            Msg::RenderReport(ticket) => handlers::handle_render_report(self, ticket),
            Msg::SendReport => handlers::handle_send_report(self, ctx),
            Msg::ReportSent(ticket, outcome) => handlers::handle_report_sent(self, ticket, outcome),
            Msg::Reset => handlers::handle_reset(self),
            Msg::DismissError => {
                self.session.clear_error();
                true
            }
        };

        self.sync_countdown(ctx);
        render
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container">
                { header::render_header() }
                <div class="top-right">
                    { status::render_api_status(self.session.api_status(), ctx.link()) }
                </div>

                <main class="main-content">
                    { utils::render_error_message(self, ctx) }
                    { utils::render_notice(self) }
                    {
                        match self.session.step() {
                            Step::Intake => intake_form::render_intake_form(self, ctx),
                            Step::Upload => html! {
                                <>
                                    { upload_section::render_upload_section(self, ctx) }
                                    { preview_area::render_preview_area(self, ctx) }
                                </>
                            },
                            Step::Results => results::render_results(self, ctx),
                        }
                    }
                </main>

                <footer class="app-footer">
                    <p>{"Leukemia Screening | Results must be reviewed by a qualified professional"}</p>
                </footer>
            </div>
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        self.cancel_countdown();
        self.preview_reader = None;
        if let Some(timeout) = self.report_timeout.take() {
            timeout.cancel();
        }
    }
}

impl Model {
    /// Keeps exactly one pending one-second timeout while the countdown is
    /// armed, scheduled from the current remaining value.
    fn sync_countdown(&mut self, ctx: &Context<Self>) {
        if !self.session.countdown_active() {
            self.cancel_countdown();
            return;
        }
        if self.countdown_timer.is_none() {
            let link = ctx.link().clone();
            let epoch = self.session.epoch();
            self.countdown_timer = Some(Timeout::new(TICK_MS, move || {
                link.send_message(Msg::CountdownTick(epoch));
            }));
        }
    }

    fn cancel_countdown(&mut self) {
        if let Some(timer) = self.countdown_timer.take() {
            timer.cancel();
        }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Screening client starting, inference service at {}", config::inference_api_url());
    yew::Renderer::<Model>::new().render();
}
