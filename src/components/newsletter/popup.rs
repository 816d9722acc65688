use super::form::NewsletterForm;
use crate::features::newsletter::PopupVariant;
use leptos::{ev, prelude::*};

/// Signup dialog in one of the two layouts. The form inside is only mounted
/// while `open` is true, so closing the dialog tears the form down.
#[component]
pub fn NewsletterPopup(
    variant: PopupVariant,
    #[prop(into)] open: Signal<bool>,
    on_close: Callback<()>,
) -> impl IntoView {
    let escape_listener: StoredValue<Option<WindowListenerHandle>, LocalStorage> =
        StoredValue::new_local(None);

    Effect::new(move |_| {
        let is_open = open.get();
        let mut stored = match escape_listener.try_write_value() {
            Some(stored) => stored,
            None => return,
        };
        if is_open && stored.is_none() {
            *stored = Some(window_event_listener(ev::keydown, move |event| {
                if event.key() == "Escape" {
                    on_close.run(());
                }
            }));
        } else if !is_open && let Some(handle) = stored.take() {
            handle.remove();
        }
    });

    on_cleanup(move || {
        if let Some(mut stored) = escape_listener.try_write_value()
            && let Some(handle) = stored.take()
        {
            handle.remove();
        }
    });

    view! {
        <Show when=move || open.get()>
            <div
                class="fixed inset-0 z-40 bg-black/70"
                aria-hidden="true"
                on:click=move |_| on_close.run(())
            ></div>
            {match variant {
                PopupVariant::Takeover => view! { <TakeoverPanel on_close=on_close /> }.into_any(),
                PopupVariant::TwoColumn => view! { <TwoColumnDialog on_close=on_close /> }.into_any(),
            }}
        </Show>
    }
}

#[component]
fn CloseButton(on_close: Callback<()>) -> impl IntoView {
    view! {
        <button
            type="button"
            class="absolute top-4 right-4 text-[#4A5069] hover:text-white text-2xl leading-none"
            aria-label="Close newsletter signup"
            on:click=move |_| on_close.run(())
        >
            "×"
        </button>
    }
}

#[component]
fn TakeoverPanel(on_close: Callback<()>) -> impl IntoView {
    view! {
        <aside
            class="fixed inset-y-0 right-0 z-50 w-full md:w-[32rem] bg-[#121420] px-8 py-16 overflow-y-auto"
            role="dialog"
            aria-modal="true"
            aria-labelledby="newsletter-takeover-title"
        >
            <CloseButton on_close=on_close />
            <h2 id="newsletter-takeover-title" class="text-3xl font-bold text-white mb-4">
                "Stay in the loop"
            </h2>
            <p class="text-[#A5ABC4] mb-8 text-sm md:text-base">
                "Field notes, releases and the occasional long read, straight from the people building it. No spam, unsubscribe any time."
            </p>
            <NewsletterForm success_window_ms=PopupVariant::Takeover.success_window_ms() />
        </aside>
    }
}

#[component]
fn TwoColumnDialog(on_close: Callback<()>) -> impl IntoView {
    view! {
        <div
            class="fixed inset-0 z-50 flex items-center justify-center p-4 pointer-events-none"
            role="dialog"
            aria-modal="true"
            aria-labelledby="newsletter-popup-title"
        >
            <div class="relative grid md:grid-cols-2 w-full max-w-3xl bg-[#121420] rounded-2xl overflow-hidden pointer-events-auto">
                <div class="hidden md:block bg-gradient-to-br from-[#585C2B] to-[#1E2235]" aria-hidden="true"></div>
                <div class="px-8 py-12">
                    <CloseButton on_close=on_close />
                    <h2 id="newsletter-popup-title" class="text-2xl font-bold text-white mb-2">
                        "Join the newsletter"
                    </h2>
                    <p class="text-[#A5ABC4] mb-6 text-sm">
                        "One email a month. Confirm your address and you are in."
                    </p>
                    <NewsletterForm
                        on_confirmed=Some(on_close)
                        success_window_ms=PopupVariant::TwoColumn.success_window_ms()
                    />
                </div>
            </div>
        </div>
    }
}
