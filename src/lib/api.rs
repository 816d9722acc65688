//! HTTP helpers for JSON APIs with consistent timeouts and error handling. The
//! subscription client uses these helpers instead of building requests itself so
//! the abort timeout and the error-body policy live in one place. The helpers do
//! not store tokens; they only attach headers provided by callers.
//!
//! Error bodies are only parsed when the server labels them as JSON. Anything
//! else is logged (sanitized) and replaced with a generic message.

use serde::Deserialize;
use tracing::warn;

#[cfg(target_arch = "wasm32")]
use {
    super::{config::AppConfig, errors::AppError},
    gloo_net::http::Request,
    gloo_timers::callback::Timeout,
    serde::Serialize,
    serde_json::to_string,
    web_sys::AbortController,
};

/// Default request timeout (milliseconds) applied to all HTTP helpers.
#[cfg(target_arch = "wasm32")]
const DEFAULT_TIMEOUT_MS: u32 = 10_000;
/// Maximum number of error body characters surfaced to the UI or logs.
const MAX_ERROR_CHARS: usize = 200;
/// Used when a JSON error body carries no usable `error` field.
pub const GENERIC_FAILURE_MESSAGE: &str = "Newsletter subscription failed";
/// Used when the server answers with a non-JSON error body.
pub const UNEXPECTED_FAILURE_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Posts JSON with custom headers and ignores any 2xx response body.
#[cfg(target_arch = "wasm32")]
pub async fn post_json_with_headers<B: Serialize>(
    path: &str,
    body: &B,
    headers: &[(String, String)],
) -> Result<(), AppError> {
    let url = build_url(path);
    let payload = to_string(body)
        .map_err(|err| AppError::Serialization(format!("Failed to encode request: {err}")))?;
    let response = send_with_timeout(move |signal| {
        let mut builder = Request::post(&url)
            .header("Content-Type", "application/json")
            .abort_signal(Some(signal));

        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder
            .body(payload)
            .map_err(|err| AppError::Serialization(format!("Failed to build request: {err}")))
    })
    .await?;

    handle_empty_response(response).await
}

/// Builds a URL from the configured API base URL and the provided path.
#[cfg(target_arch = "wasm32")]
fn build_url(path: &str) -> String {
    let config = AppConfig::load();
    build_url_with_base(&config.api_base_url, path)
}

/// Builds a URL from an explicit base URL and the provided path. An empty base
/// keeps the path relative to the page origin.
pub fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

/// Maps network errors into user-facing `AppError` variants with timeout detection.
#[cfg(target_arch = "wasm32")]
fn map_request_error(err: gloo_net::Error) -> AppError {
    let message = err.to_string();
    let lowered = message.to_lowercase();

    if lowered.contains("timeout") || lowered.contains("abort") {
        AppError::Timeout("Request timed out. Please try again.".to_string())
    } else {
        AppError::Network(format!("Unable to reach the server: {message}"))
    }
}

/// Sends a request with an abort timeout to avoid hanging UI state.
#[cfg(target_arch = "wasm32")]
async fn send_with_timeout(
    build_request: impl FnOnce(&web_sys::AbortSignal) -> Result<gloo_net::http::Request, AppError>,
) -> Result<gloo_net::http::Response, AppError> {
    let controller = AbortController::new()
        .map_err(|_| AppError::Config("Failed to initialize request timeout.".to_string()))?;
    let signal = controller.signal();
    let timeout_controller = controller.clone();
    let _timeout = Timeout::new(DEFAULT_TIMEOUT_MS, move || timeout_controller.abort());

    let request = build_request(&signal)?;
    request.send().await.map_err(map_request_error)
}

/// Accepts any 2xx and converts everything else into `AppError::Http`.
#[cfg(target_arch = "wasm32")]
async fn handle_empty_response(response: gloo_net::http::Response) -> Result<(), AppError> {
    if response.ok() {
        return Ok(());
    }

    let status = response.status();
    let content_type = response.headers().get("content-type");
    let body = response.text().await.unwrap_or_default();
    Err(AppError::Http {
        status,
        message: error_message(status, content_type.as_deref(), &body),
    })
}

/// Picks the visitor-facing message for a failed response.
pub fn error_message(status: u16, content_type: Option<&str>, body: &str) -> String {
    if is_json(content_type) {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.error)
            .and_then(|message| sanitize_body(&message))
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
    } else {
        warn!(
            status,
            body = %sanitize_body(body).unwrap_or_default(),
            "server returned a non-JSON error body"
        );
        UNEXPECTED_FAILURE_MESSAGE.to_string()
    }
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|value| value.to_ascii_lowercase().contains("application/json"))
}

/// Trims and truncates a body; `None` when nothing printable is left.
fn sanitize_body(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(MAX_ERROR_CHARS).collect())
    }
}
