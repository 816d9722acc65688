//! Inline banners for success and error messages. Messages must be safe to
//! render and should never include tokens.

use leptos::prelude::*;

#[derive(Clone, Copy)]
/// Supported alert styles.
pub enum AlertKind {
    Error,
    Success,
}

/// Renders a styled alert banner.
#[component]
pub fn Alert(kind: AlertKind, message: String) -> impl IntoView {
    let (class, role) = match kind {
        AlertKind::Error => ("text-[#ED2020] text-sm text-center", "alert"),
        AlertKind::Success => (
            "bg-[#585C2B] px-6 py-3 rounded-full text-white text-center text-sm md:text-base",
            "status",
        ),
    };

    view! { <div class=class role=role aria-live="polite">{message}</div> }
}
