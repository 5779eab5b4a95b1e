//! Build-time settings, read with `option_env!` when the WASM bundle is compiled.

const DEFAULT_INFERENCE_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_HEALTH_TIMEOUT_MS: u32 = 5_000;

/// Base URL of the inference service.
pub fn inference_api_url() -> &'static str {
    option_env!("INFERENCE_API_URL").unwrap_or(DEFAULT_INFERENCE_API_URL)
}

/// Base URL of the report-mail service. Empty means same origin.
pub fn mailer_api_url() -> &'static str {
    option_env!("MAILER_API_URL").unwrap_or("")
}

pub fn health_timeout_ms() -> u32 {
    option_env!("HEALTH_TIMEOUT_MS")
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_HEALTH_TIMEOUT_MS)
}

pub fn endpoint(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
