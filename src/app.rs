use crate::{
    app_lib::config::AppConfig,
    components::NewsletterPopup,
    features::newsletter::PopupVariant,
};
use leptos::prelude::*;
use std::time::Duration;

/// Delay before the signup popup is offered to a new visitor.
const POPUP_DELAY: Duration = Duration::from_millis(3_000);

#[component]
pub fn App() -> impl IntoView {
    let config = AppConfig::load();
    let popup_variant = config.popup_variant;

    let (takeover_open, set_takeover_open) = signal(false);
    let (popup_open, set_popup_open) = signal(false);

    match set_timeout_with_handle(move || set_popup_open.set(true), POPUP_DELAY) {
        Ok(handle) => on_cleanup(move || handle.clear()),
        Err(err) => tracing::warn!(?err, "failed to schedule newsletter popup"),
    }

    let close_takeover = Callback::new(move |()| set_takeover_open.set(false));
    let close_popup = Callback::new(move |()| set_popup_open.set(false));

    view! {
        <header class="flex items-center justify-between px-6 py-4 bg-[#121420]">
            <span class="text-white font-bold tracking-wide">"Newsletter"</span>
            <button
                type="button"
                class="px-4 py-2 rounded-full bg-[#585C2B] text-white text-sm hover:bg-[#ED2020] transition-colors"
                on:click=move |_| {
                    set_popup_open.set(false);
                    set_takeover_open.set(true);
                }
            >
                "Subscribe"
            </button>
        </header>
        <main class="min-h-screen bg-[#1E2235] px-6 py-16">
            <section class="max-w-xl mx-auto text-center">
                <h1 class="text-4xl font-bold text-white mb-4">"Get the newsletter"</h1>
                <p class="text-[#A5ABC4] mb-8">
                    "Monthly updates, delivered after you confirm your address."
                </p>
            </section>
        </main>
        <NewsletterPopup
            variant=PopupVariant::Takeover
            open=takeover_open
            on_close=close_takeover
        />
        <NewsletterPopup
            variant=popup_variant
            open=Signal::derive(move || popup_open.get() && !takeover_open.get())
            on_close=close_popup
        />
    }
}
