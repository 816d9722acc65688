//! Load-once injection of the challenge SDK script.
//!
//! The first caller injects the script and every caller, concurrent or later,
//! awaits the same shared outcome. A failed load stays failed until the owning
//! view calls [`ScriptLoader::release`]; nothing here retries on its own.

use futures::{
    FutureExt,
    future::{LocalBoxFuture, Shared},
};
use std::cell::RefCell;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why the SDK script could not be brought up.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ScriptLoadError {
    #[error("unable to inject the verification script: {0}")]
    Injection(String),
    #[error("the verification script failed to download")]
    Network,
    #[error("the verification script did not load within {timeout_ms} ms")]
    Timeout { timeout_ms: u32 },
    #[error("the verification script loaded but did not expose its global")]
    MissingGlobal,
}

/// Page-side operations the loader needs. The browser implementation lives in
/// [`super::script::DomScriptHost`].
pub trait ScriptHost {
    /// Whether the SDK global entry point is available right now.
    fn sdk_present(&self) -> bool;
    /// Appends the script element and resolves once it has loaded or failed.
    fn inject(&self) -> LocalBoxFuture<'static, Result<(), ScriptLoadError>>;
    /// Removes the script element appended by [`ScriptHost::inject`].
    fn remove(&self);
}

type PendingLoad = Shared<LocalBoxFuture<'static, Result<(), ScriptLoadError>>>;

/// Injects the SDK exactly once and shares the pending outcome.
pub struct ScriptLoader<H> {
    host: H,
    pending: RefCell<Option<PendingLoad>>,
}

impl<H: ScriptHost> ScriptLoader<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            pending: RefCell::new(None),
        }
    }

    /// Resolves once the SDK global is present, injecting the script if needed.
    ///
    /// # Errors
    ///
    /// Returns the shared [`ScriptLoadError`] when the script cannot be loaded.
    pub async fn ensure_loaded(&self) -> Result<(), ScriptLoadError> {
        if self.host.sdk_present() {
            return Ok(());
        }

        let pending = self
            .pending
            .borrow_mut()
            .get_or_insert_with(|| {
                info!("injecting verification script");
                self.host.inject().shared()
            })
            .clone();

        pending.await?;

        if self.host.sdk_present() {
            debug!("verification script ready");
            Ok(())
        } else {
            warn!("verification script loaded without exposing its global");
            Err(ScriptLoadError::MissingGlobal)
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.host.sdk_present()
    }

    /// The failure of the last completed load, if it failed. A script that
    /// loaded without defining the SDK global counts as failed.
    pub fn failure(&self) -> Option<ScriptLoadError> {
        let outcome = self
            .pending
            .borrow()
            .as_ref()
            .and_then(|pending| pending.peek().cloned())?;
        match outcome {
            Err(err) => Some(err),
            Ok(()) if !self.host.sdk_present() => Some(ScriptLoadError::MissingGlobal),
            Ok(()) => None,
        }
    }

    /// Called when the owning view is torn down. A failed load is forgotten and
    /// its script element removed so a later mount can start over; a successful
    /// or still pending load is left alone.
    pub fn release(&self) {
        if let Some(err) = self.failure() {
            debug!(error = %err, "discarding failed verification script");
            self.host.remove();
            self.pending.borrow_mut().take();
        }
    }
}
