use super::super::{Model, Msg};
use shared::ApiStatus;
use yew::html::Scope;
use yew::prelude::*;

pub fn render_api_status(status: ApiStatus, link: &Scope<Model>) -> Html {
    let (class, label) = match status {
        ApiStatus::Online => ("api-status online", "Service online"),
        ApiStatus::Offline => ("api-status offline", "Service offline"),
        ApiStatus::Checking => ("api-status checking", "Checking service..."),
    };

    html! {
        <div class={class}>
            <span class="status-dot"></span>
            <span>{ label }</span>
            if status == ApiStatus::Offline {
                <button
                    class="retry-btn"
                    title="Check the classification service again"
                    onclick={link.callback(|_| Msg::CheckHealth)}
                >
                    <i class="fa-solid fa-rotate-right"></i>{" Retry"}
                </button>
            }
        </div>
    }
}
