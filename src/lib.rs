//! Newsletter signup gated by a Cloudflare Turnstile challenge.
//!
//! The submission core (script loader, widget manager, submission controller and
//! form state) is target-independent and tested natively. The Leptos
//! presentation and the browser bindings only build for `wasm32`.

#[cfg(target_arch = "wasm32")]
pub mod app;
#[path = "lib/mod.rs"]
pub mod app_lib;
#[cfg(target_arch = "wasm32")]
pub mod components;
pub mod features;
