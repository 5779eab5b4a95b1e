use super::super::{Model, Msg};
use gloo_file::{Blob, File as GlooFile, ObjectUrl};
use gloo_timers::callback::Timeout;
use shared::ClientError;
use wasm_bindgen::JsCast;
use web_sys::{FileList, HtmlAnchorElement};
use yew::prelude::*;

/// Only one image is analysed per session; extra files are ignored.
pub fn first_file(file_list: &FileList) -> Option<GlooFile> {
    if file_list.length() > 1 {
        log::warn!("{} files provided, using the first one", file_list.length());
    }
    file_list.item(0).map(GlooFile::from)
}

pub fn format_countdown(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Hands `bytes` to the browser as a download named `filename`.
pub fn save_file(bytes: &[u8], filename: &str, mime_type: &str) -> Result<(), ClientError> {
    let blob = Blob::new_with_options(bytes, Some(mime_type));
    let url = ObjectUrl::from(blob);

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| ClientError::Internal("no document available".into()))?;
    let anchor = document
        .create_element("a")
        .map_err(|e| ClientError::Internal(format!("{:?}", e)))?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|_| ClientError::Internal("could not create download link".into()))?;

    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.click();

    // Revoke the object URL once the browser has picked up the download.
    Timeout::new(1_000, move || drop(url)).forget();
    Ok(())
}

pub fn render_error_message(model: &Model, ctx: &Context<Model>) -> Html {
    if let Some(error_msg) = model.session.error() {
        html! {
            <div class="error-message">
                <i class="fa-solid fa-circle-exclamation"></i>
                <p>{ error_msg }</p>
                <button class="dismiss-btn" title="Dismiss" onclick={ctx.link().callback(|_| Msg::DismissError)}>
                    <i class="fa-solid fa-xmark"></i>
                </button>
            </div>
        }
    } else {
        html! {}
    }
}

pub fn render_notice(model: &Model) -> Html {
    match model.session.notice() {
        Some(notice) => html! {
            <div class="notice-message">
                <i class="fa-solid fa-triangle-exclamation"></i>
                <p>{ notice }</p>
            </div>
        },
        None => html! {},
    }
}
