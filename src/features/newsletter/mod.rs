//! Newsletter subscription feature: request types, email validation, the form
//! view model, the backend seam, and the submission state machine. Tokens are
//! single-use and must never be logged; email addresses stay out of logs too.
//!
//! Flow Overview: the form mounts and prepares the challenge widget, the visitor
//! submits, the controller validates, samples the token, POSTs to
//! `/api/newsletter`, and writes the outcome back into [`FormState`].

#[cfg(target_arch = "wasm32")]
pub mod browser;
pub mod client;
pub mod controller;
pub mod form;
pub mod types;
pub mod validation;

pub use client::NewsletterBackend;
pub use controller::{SubmissionController, SubmissionPhase, SubmissionSettings};
pub use form::FormState;
pub use types::{FailureKind, SubmissionResult, SubscriptionRequest};

/// Visual treatment of the signup popup. Both variants drive the same
/// controller; only the surrounding layout differs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PopupVariant {
    /// Side panel covering the page, with the mission copy above the form.
    Takeover,
    /// Centered dialog with a poster on the left and the form on the right.
    #[default]
    TwoColumn,
}

/// How long the two-column popup shows its confirmation before closing.
pub const POPUP_SUCCESS_WINDOW_MS: u32 = 3_000;

impl PopupVariant {
    /// Success window this layout overrides, `None` to keep the configured one.
    pub fn success_window_ms(self) -> Option<u32> {
        match self {
            Self::Takeover => None,
            Self::TwoColumn => Some(POPUP_SUCCESS_WINDOW_MS),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "takeover" | "full-screen" | "fullscreen" => Some(Self::Takeover),
            "two-column" | "two_column" | "popup" => Some(Self::TwoColumn),
            _ => None,
        }
    }
}
