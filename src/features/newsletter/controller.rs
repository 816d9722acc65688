//! Submission state machine for the newsletter form.
//!
//! ```text
//! Idle -> Validating -> (Bypassed | AwaitingToken) -> Submitting -> Success | Error -> Idle
//! ```
//!
//! Execution is single-threaded, so the re-entrancy guard is the phase itself: it
//! leaves `Idle` synchronously before the first suspension point and any submit
//! intent that finds it elsewhere is dropped. Results that arrive after
//! [`SubmissionController::teardown`] are discarded instead of being written into
//! the dead form.

use super::{
    client::NewsletterBackend,
    form::FormState,
    types::{FailureKind, SubmissionResult, SubscriptionRequest},
    validation::validate_email,
};
use crate::{
    app_lib::{config::AppConfig, schedule::Scheduler},
    features::challenge::{ChallengeError, ChallengeSdk, ScriptHost, WidgetHandle, WidgetManager},
};
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};
use tracing::{debug, info, warn};

/// Shown when no widget is rendered and nothing more specific is known.
pub const CHALLENGE_NOT_READY_MESSAGE: &str =
    "Security verification not loaded. Please refresh and try again.";
/// Shown when the widget is up but the visitor has not solved it.
pub const CHALLENGE_INCOMPLETE_MESSAGE: &str = "Please complete the security verification";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmissionSettings {
    /// Development-only: skip the challenge and send no token.
    pub bypass_verification: bool,
    /// How long the confirmation view stays up after a success.
    pub success_window_ms: u32,
}

impl From<&AppConfig> for SubmissionSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            bypass_verification: config.bypass_verification,
            success_window_ms: config.success_window_ms,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionPhase {
    Idle,
    Validating,
    Bypassed,
    AwaitingToken,
    Submitting,
    Success,
    Error(FailureKind),
}

type Observer = Rc<dyn Fn(&FormState)>;

struct ControllerInner<S: ChallengeSdk, H, B> {
    widget: WidgetManager<S, H>,
    backend: B,
    scheduler: Rc<dyn Scheduler>,
    settings: SubmissionSettings,
    phase: Cell<SubmissionPhase>,
    state: RefCell<FormState>,
    challenge_error: RefCell<Option<ChallengeError>>,
    observers: RefCell<Vec<Observer>>,
    disposed: Cell<bool>,
}

/// Drives one form. Cloning yields another handle to the same form.
pub struct SubmissionController<S: ChallengeSdk, H, B> {
    inner: Rc<ControllerInner<S, H, B>>,
}

impl<S: ChallengeSdk, H, B> Clone for SubmissionController<S, H, B> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S, H, B> SubmissionController<S, H, B>
where
    S: ChallengeSdk + 'static,
    H: ScriptHost + 'static,
    B: NewsletterBackend + 'static,
{
    pub fn new(
        widget: WidgetManager<S, H>,
        backend: B,
        scheduler: Rc<dyn Scheduler>,
        settings: SubmissionSettings,
    ) -> Self {
        Self {
            inner: Rc::new(ControllerInner {
                widget,
                backend,
                scheduler,
                settings,
                phase: Cell::new(SubmissionPhase::Idle),
                state: RefCell::new(FormState::default()),
                challenge_error: RefCell::new(None),
                observers: RefCell::new(Vec::new()),
                disposed: Cell::new(false),
            }),
        }
    }

    pub fn state(&self) -> FormState {
        self.inner.state.borrow().clone()
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.inner.phase.get()
    }

    pub fn settings(&self) -> SubmissionSettings {
        self.inner.settings
    }

    pub fn widget(&self) -> &WidgetManager<S, H> {
        &self.inner.widget
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Registers a callback that receives a snapshot after every state change.
    pub fn subscribe(&self, observer: impl Fn(&FormState) + 'static) {
        self.inner.observers.borrow_mut().push(Rc::new(observer));
    }

    /// Records an edit of the email field. A lingering submission error is
    /// cleared once the visitor starts correcting the input; an unavailable
    /// challenge stays reported.
    pub fn edit_email(&self, value: impl Into<String>) {
        if self.inner.disposed.get() {
            return;
        }
        let value = value.into();
        let idle = self.inner.phase.get() == SubmissionPhase::Idle;
        let challenge_notice = self
            .inner
            .challenge_error
            .borrow()
            .as_ref()
            .map(ChallengeError::user_message);
        self.update(|state| {
            state.email = value;
            if idle {
                state.error = challenge_notice;
            }
        });
    }

    /// Loads the challenge SDK and renders the widget into `mount`. Called when
    /// the form becomes visible; a no-op when verification is bypassed.
    ///
    /// # Errors
    ///
    /// Returns the load or render failure after surfacing it in the form state.
    pub async fn prepare_verification(
        &self,
        mount: S::Mount,
    ) -> Result<Option<WidgetHandle>, ChallengeError> {
        if self.inner.settings.bypass_verification {
            debug!("verification bypassed; skipping challenge widget");
            return Ok(None);
        }

        let loaded = self.inner.widget.loader().ensure_loaded().await;
        if self.inner.disposed.get() {
            debug!("form torn down while the verification script loaded");
            return Ok(None);
        }

        let rendered = loaded
            .map_err(ChallengeError::from)
            .and_then(|()| self.inner.widget.render(mount).map_err(ChallengeError::from));

        match rendered {
            Ok(handle) => {
                if self.inner.challenge_error.take().is_some() {
                    self.update(|state| state.error = None);
                }
                Ok(Some(handle))
            }
            Err(err) => {
                warn!(error = %err, "security verification unavailable");
                let message = err.user_message();
                self.inner.challenge_error.replace(Some(err.clone()));
                self.update(|state| state.error = Some(message));
                Err(err)
            }
        }
    }

    /// Runs one submission attempt for `raw_email`.
    ///
    /// Returns `None` when the intent was ignored because another attempt is in
    /// progress, or when the form was torn down before the result arrived.
    pub async fn submit(&self, raw_email: &str) -> Option<SubmissionResult> {
        if self.inner.disposed.get() {
            return None;
        }
        if self.inner.phase.get() != SubmissionPhase::Idle {
            debug!(phase = ?self.inner.phase.get(), "submit ignored; attempt already running");
            return None;
        }

        self.transition(SubmissionPhase::Validating);
        self.update(|state| {
            state.email = raw_email.to_string();
            state.error = None;
        });

        let email = match validate_email(raw_email) {
            Ok(email) => email,
            Err(reason) => {
                return Some(self.settle(SubmissionResult::ValidationFailed(reason.to_string())));
            }
        };

        let token = if self.inner.settings.bypass_verification {
            self.transition(SubmissionPhase::Bypassed);
            None
        } else {
            self.transition(SubmissionPhase::AwaitingToken);
            match self.sample_token() {
                Ok(token) => Some(token),
                Err(reason) => {
                    return Some(self.settle(SubmissionResult::VerificationFailed(reason)));
                }
            }
        };

        self.transition(SubmissionPhase::Submitting);
        self.update(|state| state.is_submitting = true);

        let request = SubscriptionRequest::new(email, token);
        let outcome = self.inner.backend.subscribe(&request).await;

        if self.inner.disposed.get() {
            debug!("form torn down while subscribing; discarding result");
            return None;
        }

        let result = match outcome {
            Ok(()) => SubmissionResult::Success,
            Err(err) => {
                warn!(error = %err, "newsletter subscription failed");
                SubmissionResult::NetworkOrServerFailed(err.user_message())
            }
        };
        Some(self.settle(result))
    }

    /// Tears the form down: removes the widget, lets a failed SDK load be retried
    /// by a later mount, and stops all further state updates.
    pub fn teardown(&self) {
        if self.inner.disposed.replace(true) {
            return;
        }
        debug!("tearing down newsletter form");
        self.inner.widget.teardown();
        self.inner.widget.loader().release();
        self.inner.observers.borrow_mut().clear();
    }

    fn sample_token(&self) -> Result<String, String> {
        let widget = &self.inner.widget;
        let Some(handle) = widget.current() else {
            let message = self
                .inner
                .challenge_error
                .borrow()
                .as_ref()
                .map_or_else(
                    || CHALLENGE_NOT_READY_MESSAGE.to_string(),
                    ChallengeError::user_message,
                );
            return Err(message);
        };

        widget
            .get_token(&handle)
            .ok_or_else(|| CHALLENGE_INCOMPLETE_MESSAGE.to_string())
    }

    fn settle(&self, result: SubmissionResult) -> SubmissionResult {
        if result.consumed_challenge()
            && let Some(handle) = self.inner.widget.current()
        {
            self.inner.widget.reset(&handle);
        }

        match result.failure_kind() {
            None => {
                info!("newsletter subscription accepted");
                self.transition(SubmissionPhase::Success);
                self.update(|state| {
                    state.email.clear();
                    state.is_submitting = false;
                    state.is_success = true;
                    state.error = None;
                });
                self.schedule_success_window();
            }
            Some(kind) => {
                debug!(?kind, "submission attempt failed");
                self.transition(SubmissionPhase::Error(kind));
                let message = result.message().map(str::to_string);
                self.update(|state| {
                    state.is_submitting = false;
                    state.error = message;
                });
                self.transition(SubmissionPhase::Idle);
            }
        }

        result
    }

    fn schedule_success_window(&self) {
        let weak = Rc::downgrade(&self.inner);
        self.inner.scheduler.schedule(
            self.inner.settings.success_window_ms,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    SubmissionController { inner }.close_success_window();
                }
            }),
        );
    }

    fn close_success_window(&self) {
        if self.inner.disposed.get() || self.inner.phase.get() != SubmissionPhase::Success {
            return;
        }
        self.transition(SubmissionPhase::Idle);
        self.update(|state| state.is_success = false);
    }

    fn transition(&self, next: SubmissionPhase) {
        let previous = self.inner.phase.replace(next);
        debug!(from = ?previous, to = ?next, "submission phase changed");
    }

    fn update(&self, mutate: impl FnOnce(&mut FormState)) {
        mutate(&mut self.inner.state.borrow_mut());
        if self.inner.disposed.get() {
            return;
        }
        let snapshot = self.state();
        let observers = self.inner.observers.borrow().clone();
        for observer in observers {
            observer(&snapshot);
        }
    }
}
