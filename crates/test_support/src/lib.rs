//! Fakes and a harness for driving the newsletter submission flow without a
//! browser.

pub mod backend;
pub mod challenge;
pub mod schedule;

pub use backend::RecordingBackend;
pub use challenge::{FakeChallengeSdk, FakeScriptHost};
pub use schedule::ManualScheduler;

use newsletter_gate::features::{
    challenge::{ChallengeError, ScriptLoader, WidgetHandle, WidgetManager},
    newsletter::{SubmissionController, SubmissionSettings},
};
use std::rc::Rc;

pub type TestController = SubmissionController<FakeChallengeSdk, FakeScriptHost, RecordingBackend>;

/// Mount point the harness renders the widget into.
pub const MOUNT: &str = "newsletter-challenge";
pub const SITE_KEY: &str = "1x00000000000000000000AA";
pub const SUCCESS_WINDOW_MS: u32 = 5_000;

/// One controller wired to fakes, plus handles to steer and inspect them.
pub struct Harness {
    pub controller: TestController,
    pub host: FakeScriptHost,
    pub sdk: FakeChallengeSdk,
    pub backend: RecordingBackend,
    pub scheduler: ManualScheduler,
    pub loader: Rc<ScriptLoader<FakeScriptHost>>,
}

impl Harness {
    /// Verification enabled, SDK not yet on the page.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    #[must_use]
    pub fn builder() -> HarnessBuilder {
        HarnessBuilder::default()
    }

    /// Prepares the widget on the default mount point.
    ///
    /// # Errors
    /// Returns the challenge failure reported by the controller.
    pub async fn mount(&self) -> Result<Option<WidgetHandle>, ChallengeError> {
        self.controller.prepare_verification(MOUNT.to_string()).await
    }

    /// A second form on the same page, sharing this harness' script loader.
    #[must_use]
    pub fn sibling(&self) -> TestController {
        let widget = WidgetManager::new(
            self.sdk.clone(),
            Rc::clone(&self.loader),
            SITE_KEY,
        );
        SubmissionController::new(
            widget,
            self.backend.clone(),
            Rc::new(self.scheduler.clone()),
            self.controller.settings(),
        )
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

pub struct HarnessBuilder {
    bypass_verification: bool,
    preloaded: bool,
    site_key: String,
    success_window_ms: u32,
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self {
            bypass_verification: false,
            preloaded: false,
            site_key: SITE_KEY.to_string(),
            success_window_ms: SUCCESS_WINDOW_MS,
        }
    }
}

impl HarnessBuilder {
    #[must_use]
    pub fn bypass_verification(mut self, bypass: bool) -> Self {
        self.bypass_verification = bypass;
        self
    }

    /// Starts with the SDK global already defined.
    #[must_use]
    pub fn preloaded(mut self) -> Self {
        self.preloaded = true;
        self
    }

    #[must_use]
    pub fn site_key(mut self, site_key: &str) -> Self {
        self.site_key = site_key.to_string();
        self
    }

    #[must_use]
    pub fn success_window_ms(mut self, window_ms: u32) -> Self {
        self.success_window_ms = window_ms;
        self
    }

    #[must_use]
    pub fn build(self) -> Harness {
        let host = if self.preloaded {
            FakeScriptHost::preloaded()
        } else {
            FakeScriptHost::default()
        };
        let sdk = FakeChallengeSdk::default();
        let backend = RecordingBackend::default();
        let scheduler = ManualScheduler::default();

        let loader = Rc::new(ScriptLoader::new(host.clone()));
        let widget = WidgetManager::new(sdk.clone(), Rc::clone(&loader), self.site_key);
        let controller = SubmissionController::new(
            widget,
            backend.clone(),
            Rc::new(scheduler.clone()),
            SubmissionSettings {
                bypass_verification: self.bypass_verification,
                success_window_ms: self.success_window_ms,
            },
        );

        Harness {
            controller,
            host,
            sdk,
            backend,
            scheduler,
            loader,
        }
    }
}
