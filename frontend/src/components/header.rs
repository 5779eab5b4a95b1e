use yew::prelude::*;

/// Renders the application header
pub fn render_header() -> Html {
    html! {
        <header class="app-header">
            <h1><i class="fa-solid fa-microscope"></i> {" Leukemia Screening"}</h1>
            <p class="subtitle">{"Blood smear classification and patient reporting"}</p>
        </header>
    }
}
