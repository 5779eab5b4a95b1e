use super::super::{Model, Msg};
use shared::{Gender, PatientField};
use strum::IntoEnumIterator;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

pub fn render_intake_form(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link();
    let patient = model.session.patient();

    let onsubmit = link.callback(|e: SubmitEvent| {
        e.prevent_default();
        Msg::SubmitIntake
    });
    let on_gender = link.callback(|e: Event| {
        let select: HtmlSelectElement = e.target_unchecked_into();
        Msg::UpdateField(PatientField::Gender, select.value())
    });
    let selected_gender = patient.gender.map(|g| g.to_string()).unwrap_or_default();

    html! {
        <form class="intake-form" {onsubmit}>
            <h2><i class="fa-solid fa-user"></i>{" Patient Information"}</h2>
            { text_input(ctx, PatientField::Name, "Full name", "text", &patient.name) }
            { text_input(ctx, PatientField::Age, "Age", "number", &patient.age) }
            <label class="form-field">
                <span>{"Gender"}</span>
                <select onchange={on_gender}>
                    <option value="" selected={selected_gender.is_empty()}>{"Select..."}</option>
                    { for Gender::iter().map(|gender| {
                        let value = gender.to_string();
                        html! {
                            <option value={value.clone()} selected={value == selected_gender}>
                                { gender.title() }
                            </option>
                        }
                    })}
                </select>
            </label>
            { text_input(ctx, PatientField::Phone, "Phone", "tel", &patient.phone) }
            { text_input(ctx, PatientField::Email, "Email", "email", &patient.email) }
            <div class="button-container">
                <button type="submit" class="analyze-btn">
                    { "Continue to upload " }<i class="fa-solid fa-arrow-right"></i>
                </button>
                <button
                    type="button"
                    class="analyze-btn"
                    style="background-color: var(--clear-color);"
                    onclick={link.callback(|_| Msg::Reset)}
                >
                    <i class="fa-solid fa-rotate-left"></i>{" Clear"}
                </button>
            </div>
        </form>
    }
}

fn text_input(ctx: &Context<Model>, field: PatientField, label: &'static str, kind: &'static str, value: &str) -> Html {
    let oninput = ctx.link().callback(move |e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        Msg::UpdateField(field, input.value())
    });

    html! {
        <label class="form-field">
            <span>{ label }</span>
            <input type={kind} value={value.to_string()} {oninput} />
        </label>
    }
}
