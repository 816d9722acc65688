//! Shared frontend utilities for API access, configuration, errors, timers,
//! logging, and build metadata.
//!
//! ## Subscription Flow
//!
//! 1. **Mount:** The form asks the shared script loader for the Turnstile SDK and
//!    renders one challenge widget into its mount point.
//! 2. **Submit:** The controller validates the email, samples the challenge token,
//!    and POSTs `{"email": ...}` to `/api/newsletter` with the token in the
//!    `cf-turnstile-response` header.
//! 3. **Settle:** The outcome is written into the form state; the widget is reset
//!    whenever a token was consumed.
//!
//! Centralizing these helpers keeps network behavior consistent across the form
//! variants. Configuration values are public and tokens are single-use, but
//! callers must still avoid logging them.

pub mod api;
#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}
pub mod config;
pub mod errors;
pub mod schedule;
pub mod telemetry;

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(target_arch = "wasm32")]
pub use api::post_json_with_headers;
pub use errors::AppError;
