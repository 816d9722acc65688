#[cfg(target_arch = "wasm32")]
use leptos::prelude::mount_to_body;
#[cfg(target_arch = "wasm32")]
use newsletter_gate::{
    app::App,
    app_lib::{GIT_COMMIT_HASH, config::AppConfig, telemetry},
};

#[cfg(target_arch = "wasm32")]
pub fn main() {
    console_error_panic_hook::set_once();

    let config = AppConfig::load();
    if let Err(err) = telemetry::init(&config.log_filter) {
        web_sys::console::error_1(&format!("{err:#}").into());
    }
    tracing::info!(commit = GIT_COMMIT_HASH, "starting newsletter app");

    mount_to_body(App);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn main() {}
