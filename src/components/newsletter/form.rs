//! Newsletter form bound to one submission controller. The controller owns all
//! state; this component mirrors [`FormState`] into a signal, forwards input and
//! submit events, and hands the challenge mount point over once it exists.

use crate::{
    app_lib::config::AppConfig,
    components::{Alert, AlertKind, Button, Spinner},
    features::newsletter::{FormState, browser::browser_controller},
};
use leptos::{ev::SubmitEvent, html::Div, prelude::*, task::spawn_local};
use web_sys::HtmlElement;

/// Renders the subscribe form, or the confirmation while the success window is
/// open. `on_confirmed` fires when that window closes; `success_window_ms`
/// replaces the configured window length.
#[component]
pub fn NewsletterForm(
    #[prop(optional_no_strip)] on_confirmed: Option<Callback<()>>,
    #[prop(optional_no_strip)] success_window_ms: Option<u32>,
) -> impl IntoView {
    let mut config = AppConfig::load();
    if let Some(window_ms) = success_window_ms {
        config.success_window_ms = window_ms;
    }
    let bypass = config.bypass_verification;
    let controller = browser_controller(&config);

    let form = RwSignal::new(controller.state());
    controller.subscribe(move |state: &FormState| {
        let was_success = form.try_with_untracked(|current| current.is_success);
        if form.try_set(state.clone()).is_some() {
            return;
        }
        if was_success == Some(true)
            && !state.is_success
            && let Some(on_confirmed) = on_confirmed
        {
            on_confirmed.run(());
        }
    });

    let controller = StoredValue::new_local(controller);
    let mount_ref = NodeRef::<Div>::new();

    Effect::new(move |_| {
        let Some(element) = mount_ref.get() else {
            return;
        };
        let element: HtmlElement = element.into();
        if let Some(controller) = controller.try_get_value() {
            spawn_local(async move {
                // Failures are already surfaced through the form state.
                let _ = controller.prepare_verification(element).await;
            });
        }
    });

    on_cleanup(move || {
        controller.try_with_value(|controller| controller.teardown());
    });

    let on_submit = move |event: SubmitEvent| {
        event.prevent_default();
        let email = form.with_untracked(|state| state.email.clone());
        if let Some(controller) = controller.try_get_value() {
            spawn_local(async move {
                controller.submit(&email).await;
            });
        }
    };

    let on_input = move |event| {
        let value = event_target_value(&event);
        controller.try_with_value(|controller| controller.edit_email(value));
    };

    let is_submitting = Signal::derive(move || form.with(|state| state.is_submitting));

    let is_success = move || form.with(|state| state.is_success);

    // The form stays mounted during the success window so the widget keeps its
    // place; it is only hidden behind the confirmation.
    view! {
        <div class="w-full max-w-md mx-auto">
            <Show when=is_success>
                <Alert
                    kind=AlertKind::Success
                    message="Thanks for subscribing! Check your email to confirm.".to_string()
                />
            </Show>
            <form
                class="space-y-4"
                class:hidden=is_success
                aria-label="Newsletter subscription form"
                on:submit=on_submit
            >
                <label for="newsletter-email" class="sr-only">
                    "Email address"
                </label>
                <input
                    id="newsletter-email"
                    name="email"
                    type="email"
                    required
                    autocomplete="email"
                    inputmode="email"
                    placeholder="Enter your email address"
                    class="w-full px-4 py-3 bg-[#1E2235] rounded-full text-white placeholder-[#4A5069] focus:outline-none focus:ring-2 focus:ring-[#749EBF] text-sm md:text-base"
                    aria-describedby=move || {
                        form.with(|state| state.error.is_some()).then_some("newsletter-error")
                    }
                    prop:value=move || form.with(|state| state.email.clone())
                    disabled=move || is_submitting.get()
                    on:input=on_input
                />
                <Button
                    button_type="submit"
                    disabled=is_submitting
                    aria_label="Subscribe to newsletter"
                >
                    {move || {
                        if is_submitting.get() {
                            view! {
                                <Spinner />
                                "Subscribing..."
                            }
                                .into_any()
                        } else {
                            "Subscribe Now".into_any()
                        }
                    }}
                </Button>
                <div
                    node_ref=mount_ref
                    class="w-full flex justify-center"
                    class:hidden=bypass
                    data-theme="dark"
                    data-size="flexible"
                    aria-label="Security verification"
                ></div>
                {move || {
                    form.with(|state| state.error.clone())
                        .map(|message| {
                            view! {
                                <div id="newsletter-error">
                                    <Alert kind=AlertKind::Error message=message />
                                </div>
                            }
                        })
                }}
            </form>
        </div>
    }
}
