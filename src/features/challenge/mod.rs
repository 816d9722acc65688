//! Bot-verification challenge: SDK script loading and widget lifecycle. The core
//! types are written against [`ScriptHost`] and [`ChallengeSdk`] so they run on any
//! target; the browser bindings for Cloudflare Turnstile are wasm-only.
//!
//! Flow Overview: the shared loader injects the SDK once, the widget manager
//! renders a single widget per form, and the submission controller samples the
//! widget's token at submit time.

pub mod loader;
#[cfg(target_arch = "wasm32")]
pub mod script;
pub mod sdk;
#[cfg(target_arch = "wasm32")]
pub mod turnstile;
pub mod widget;

pub use loader::{ScriptHost, ScriptLoadError, ScriptLoader};
pub use sdk::{ChallengeSdk, WidgetId};
pub use widget::{ChallengeWidget, WidgetHandle, WidgetManager, WidgetRenderError};

use thiserror::Error;

/// Anything that keeps the challenge from becoming usable.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ChallengeError {
    #[error(transparent)]
    ScriptLoad(#[from] ScriptLoadError),
    #[error(transparent)]
    Render(#[from] WidgetRenderError),
}

impl ChallengeError {
    /// Inline message for the visitor; details stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ChallengeError::ScriptLoad(_) => {
                "Security verification failed to load. Please refresh and try again.".to_string()
            }
            ChallengeError::Render(_) => {
                "Security verification could not be displayed. Please refresh and try again."
                    .to_string()
            }
        }
    }
}
