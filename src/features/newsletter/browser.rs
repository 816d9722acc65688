use super::{
    client::HttpNewsletterBackend,
    controller::{SubmissionController, SubmissionSettings},
};
use crate::{
    app_lib::{config::AppConfig, schedule::TimeoutScheduler},
    features::challenge::{
        WidgetManager,
        script::{DomScriptHost, shared_loader},
        turnstile::TurnstileSdk,
    },
};
use std::rc::Rc;

pub type BrowserController =
    SubmissionController<TurnstileSdk, DomScriptHost, HttpNewsletterBackend>;

/// Wires a controller to Turnstile, the page-wide script loader, and the
/// `/api/newsletter` endpoint.
pub fn browser_controller(config: &AppConfig) -> BrowserController {
    let widget = WidgetManager::new(
        TurnstileSdk::default(),
        shared_loader(config),
        config.turnstile_site_key.clone(),
    );
    SubmissionController::new(
        widget,
        HttpNewsletterBackend,
        Rc::new(TimeoutScheduler),
        SubmissionSettings::from(config),
    )
}
