use super::super::Model;
use super::super::Msg;
use super::utils::first_file;
use shared::ALLOWED_MIME_TYPES;
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, HtmlInputElement};
use yew::prelude::*;

pub fn render_upload_section(model: &Model, ctx: &Context<Model>) -> Html {
    let patient = model.session.patient();
    let link = ctx.link();

    html! {
        <div class="upload-section">
            <div class="patient-summary">
                <p>{ format!("Patient: {} ({} y)", patient.name, patient.age) }</p>
                <button
                    class="link-btn"
                    onclick={link.callback(|_| Msg::EditPatientInfo)}
                    disabled={model.session.in_flight().upload}
                >
                    <i class="fa-solid fa-pen"></i>{" Edit patient information"}
                </button>
                <button
                    class="link-btn"
                    onclick={link.callback(|_| Msg::Reset)}
                >
                    <i class="fa-solid fa-rotate-left"></i>{" Start over"}
                </button>
            </div>
            { render_file_input_area(model, ctx) }
        </div>
    }
}

fn render_file_input_area(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link();
    let handle_change = link.batch_callback(|e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let file = input.files().as_ref().and_then(first_file);

        input.set_value("");
        file.map(Msg::FileSelected)
    });

    let handle_drag_over = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(true)
    });

    let handle_drag_leave = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(false)
    });

    let handle_drop = link.callback(Msg::HandleDrop);
    let trigger_file_input = Callback::from(|_: MouseEvent| {
        if let Some(input) = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id("file-input"))
        {
            if let Ok(html_input) = input.dyn_into::<web_sys::HtmlElement>() {
                html_input.click();
            }
        }
    });

    html! {
        <>
            <input
                type="file"
                id="file-input"
                accept={ALLOWED_MIME_TYPES.join(",")}
                style="display: none;"
                onchange={handle_change}
            />

            <button
                id="upload-button"
                class="analyze-btn"
                onclick={trigger_file_input.clone()}
            >
                <i class="fa-solid fa-upload"></i> {" Select Image"}
            </button>

            <div
                id="drop-zone"
                class={classes!("upload-area", model.is_dragging.then_some("drag-over"))}
                ondragover={handle_drag_over}
                ondragleave={handle_drag_leave}
                ondrop={handle_drop}
                onclick={trigger_file_input}
            >
                <div class="upload-placeholder">
                    <i class="fa-solid fa-cloud-arrow-up"></i>
                    <p>{"Drag & drop a blood smear image here, paste, or click"}</p>
                    <p class="file-types">{"Supported formats: BMP, JPEG, PNG"}</p>
                </div>
            </div>
        </>
    }
}
