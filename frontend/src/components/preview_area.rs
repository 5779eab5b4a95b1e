use super::super::{Model, Msg};
use shared::ApiStatus;
use yew::prelude::*;

pub fn render_preview_area(model: &Model, ctx: &Context<Model>) -> Html {
    let Some(image) = model.session.image() else {
        return html! {};
    };
    let link = ctx.link();

    html! {
        <div id="preview-container">
            {
                match &image.preview {
                    Some(data_uri) => html! {
                        <img id="actual-image-preview" src={data_uri.clone()} alt="Image Preview" />
                    },
                    None if model.preview_reader.is_some() => html! {
                        <div class="loading-preview">
                            <i class="fa-solid fa-spinner fa-spin fa-2x"></i>
                            <p style="margin-left: 10px;">{"Loading preview..."}</p>
                        </div>
                    },
                    None => html! {
                        <div class="unavailable-preview">
                            <p>{"Preview unavailable"}</p>
                        </div>
                    },
                }
            }
            <p class="file-details">
                { format!("{} | {} | {:.1} KB", image.name, image.mime_type, image.size as f64 / 1024.0) }
            </p>
            <div class="button-container">
                <button
                    class="analyze-btn"
                    onclick={link.callback(|_| Msg::Upload)}
                    disabled={!model.session.can_upload()}
                    title={upload_hint(model)}
                >
                    { render_analyze_button_content(model) }
                </button>
            </div>
        </div>
    }
}

fn upload_hint(model: &Model) -> &'static str {
    match model.session.api_status() {
        ApiStatus::Online => "Send the image for classification",
        ApiStatus::Offline => "The classification service is offline",
        ApiStatus::Checking => "Checking the classification service...",
    }
}

fn render_analyze_button_content(model: &Model) -> Html {
    if model.session.in_flight().upload {
        html! { <><i class="fa-solid fa-spinner fa-spin"></i>{" Analyzing..."}</> }
    } else {
        let filename = model
            .session
            .image()
            .map(|image| image.name.clone())
            .unwrap_or_else(|| "Selected Image".to_string());

        let display_name = if filename.chars().count() > 20 {
            format!("{}...", filename.chars().take(17).collect::<String>())
        } else {
            filename
        };

        html! { <><i class="fa-solid fa-magnifying-glass"></i>{ format!(" Analyze \"{}\"", display_name) }</> }
    }
}
