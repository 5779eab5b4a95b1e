use super::super::{Model, Msg};
use super::utils::format_countdown;
use shared::report::Tone;
use yew::prelude::*;

pub fn render_results(model: &Model, ctx: &Context<Model>) -> Html {
    let Some(result) = model.session.prediction() else {
        return html! { <p class="no-results-message">{"No analysis result available."}</p> };
    };
    let link = ctx.link();
    let session = &model.session;

    let tone_class = match Tone::for_label(&result.prediction) {
        Tone::Warning => "positive",
        Tone::Normal => "negative",
    };
    let confidence = result.confidence * 100.0;
    let patient_name = session.patient().name.clone();

    html! {
        <div class={classes!("results-container", tone_class)}>
            <div class="result-header">
                <h2 title={format!("Analysis results for: {}", patient_name)}>
                    <span class={classes!("classification", tone_class)}>{ &result.prediction }</span>
                    <span class="analyzed-filename-display">{format!("({})", patient_name)}</span>
                </h2>
                <div class="confidence-meter">
                    <div class="meter-label">{"Confidence:"}</div>
                    <div class="meter">
                        <div class="meter-fill" style={format!("width: {}%", confidence)}></div>
                    </div>
                    <div class="meter-value">{ result.confidence_percent() }</div>
                </div>
            </div>
            {
                if let Some(probabilities) = &result.probabilities {
                    html! {
                        <div class="detailed-results">
                            <h3>{"Class Probabilities"}</h3>
                            <div class="result-bars">
                                { for probabilities.iter().map(|(label, &value)| {
                                    let percentage = value * 100.0;
                                    html! {
                                        <div class="result-item">
                                            <div class="result-label">{ label }</div>
                                            <div class="result-bar-container">
                                                <div class="result-bar" style={format!("width: {}%", percentage)}></div>
                                            </div>
                                            <div class="result-value">{ format!("{:.2}%", percentage) }</div>
                                        </div>
                                    }
                                })}
                            </div>
                        </div>
                    }
                } else {
                    html! {}
                }
            }
            <p class="countdown">
                <i class="fa-solid fa-clock"></i>
                { format!(" Session resets in {}", format_countdown(session.countdown())) }
            </p>
            <div class="button-container">
                <button
                    class="analyze-btn"
                    onclick={link.callback(|_| Msg::DownloadReport)}
                    disabled={!session.can_generate_report()}
                >
                    if session.in_flight().generate {
                        <><i class="fa-solid fa-spinner fa-spin"></i>{" Generating..."}</>
                    } else {
                        <><i class="fa-solid fa-file-pdf"></i>{" Download Report"}</>
                    }
                </button>
                <button
                    class="analyze-btn"
                    onclick={link.callback(|_| Msg::SendReport)}
                    disabled={!session.can_send_report()}
                >
                    if session.in_flight().send {
                        <><i class="fa-solid fa-spinner fa-spin"></i>{" Sending..."}</>
                    } else if session.report_sent() {
                        <><i class="fa-solid fa-check"></i>{" Report Sent"}</>
                    } else {
                        <><i class="fa-solid fa-envelope"></i>{ format!(" Email to {}", session.patient().email) }</>
                    }
                </button>
                <button
                    id="clear-all-btn"
                    class="analyze-btn"
                    style="background-color: var(--clear-color);"
                    onclick={link.callback(|_| Msg::Reset)}
                >
                    <i class="fa-solid fa-rotate-left"></i>{" New Patient"}
                </button>
            </div>
        </div>
    }
}
