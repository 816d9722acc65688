//! Owns the single challenge widget of one form.
//!
//! Rendering again replaces the previous widget instead of stacking a second one
//! into the page. Tokens are only handed out for the live widget; a handle that
//! outlived a re-render yields nothing.

use super::{
    loader::{ScriptHost, ScriptLoader},
    sdk::{ChallengeSdk, WidgetId},
};
use std::{cell::RefCell, rc::Rc};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WidgetRenderError {
    #[error("the verification script has not finished loading")]
    NotLoaded,
    #[error("the widget mount point is not attached to the page")]
    InvalidMount,
    #[error("the verification service rejected the widget: {0}")]
    Sdk(String),
}

/// A rendered widget and the element hosting it.
#[derive(Clone, Debug)]
pub struct ChallengeWidget<M> {
    pub id: WidgetId,
    pub mount_point: M,
    pub ready: bool,
}

/// Caller-side reference to a rendered widget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidgetHandle {
    id: WidgetId,
}

impl WidgetHandle {
    pub fn id(&self) -> &WidgetId {
        &self.id
    }
}

pub struct WidgetManager<S: ChallengeSdk, H> {
    sdk: S,
    loader: Rc<ScriptLoader<H>>,
    sitekey: String,
    widget: RefCell<Option<ChallengeWidget<S::Mount>>>,
}

impl<S: ChallengeSdk, H: ScriptHost> WidgetManager<S, H> {
    pub fn new(sdk: S, loader: Rc<ScriptLoader<H>>, sitekey: impl Into<String>) -> Self {
        Self {
            sdk,
            loader,
            sitekey: sitekey.into(),
            widget: RefCell::new(None),
        }
    }

    pub fn loader(&self) -> &ScriptLoader<H> {
        &self.loader
    }

    /// Renders a widget into `mount`, tearing down any widget rendered before.
    ///
    /// # Errors
    ///
    /// Fails when the SDK is not loaded, the mount point is unusable, or the SDK
    /// refuses to render.
    pub fn render(&self, mount: S::Mount) -> Result<WidgetHandle, WidgetRenderError> {
        if !self.loader.is_loaded() {
            return Err(WidgetRenderError::NotLoaded);
        }
        if !self.sdk.mount_is_valid(&mount) {
            return Err(WidgetRenderError::InvalidMount);
        }

        self.teardown();

        if self.sitekey.trim().is_empty() {
            warn!("verification site key is not configured; the widget will be rejected");
        }

        let id = self
            .sdk
            .render(&mount, &self.sitekey)
            .map_err(WidgetRenderError::Sdk)?;
        debug!(widget = %id, "verification widget rendered");

        let handle = WidgetHandle { id: id.clone() };
        self.widget.replace(Some(ChallengeWidget {
            id,
            mount_point: mount,
            ready: true,
        }));
        Ok(handle)
    }

    /// The live widget, if one is rendered.
    pub fn current(&self) -> Option<WidgetHandle> {
        self.widget
            .borrow()
            .as_ref()
            .map(|widget| WidgetHandle {
                id: widget.id.clone(),
            })
    }

    /// The completed challenge token for `handle`, if any.
    pub fn get_token(&self, handle: &WidgetHandle) -> Option<String> {
        if !self.is_live(handle) {
            return None;
        }
        self.sdk
            .get_response(&handle.id)
            .filter(|token| !token.trim().is_empty())
    }

    /// Clears the completed state so the next submission needs a fresh token.
    pub fn reset(&self, handle: &WidgetHandle) {
        if self.is_live(handle) {
            debug!(widget = %handle.id, "resetting verification widget");
            self.sdk.reset(&handle.id);
        }
    }

    /// Removes the widget from the page, if one is rendered.
    pub fn teardown(&self) {
        if let Some(widget) = self.widget.borrow_mut().take() {
            debug!(widget = %widget.id, "removing verification widget");
            self.sdk.remove(&widget.id);
        }
    }

    fn is_live(&self, handle: &WidgetHandle) -> bool {
        self.widget
            .borrow()
            .as_ref()
            .is_some_and(|widget| widget.id == handle.id)
    }
}

#[cfg(test)]
mod tests {
    use super::{WidgetManager, WidgetRenderError};
    use crate::features::challenge::{
        loader::{ScriptHost, ScriptLoadError, ScriptLoader},
        sdk::{ChallengeSdk, WidgetId},
    };
    use futures::{FutureExt, future::LocalBoxFuture};
    use std::{
        cell::{Cell, RefCell},
        collections::HashMap,
        rc::Rc,
    };

    struct ReadyHost(bool);

    impl ScriptHost for ReadyHost {
        fn sdk_present(&self) -> bool {
            self.0
        }

        fn inject(&self) -> LocalBoxFuture<'static, Result<(), ScriptLoadError>> {
            async { Err(ScriptLoadError::Network) }.boxed_local()
        }

        fn remove(&self) {}
    }

    #[derive(Default)]
    struct StubSdk {
        next_id: Cell<u32>,
        live: RefCell<HashMap<String, &'static str>>,
        tokens: RefCell<HashMap<String, String>>,
        resets: Cell<u32>,
    }

    impl ChallengeSdk for Rc<StubSdk> {
        type Mount = &'static str;

        fn mount_is_valid(&self, mount: &Self::Mount) -> bool {
            !mount.is_empty()
        }

        fn render(&self, mount: &Self::Mount, sitekey: &str) -> Result<WidgetId, String> {
            if sitekey == "rejected" {
                return Err("invalid sitekey".to_string());
            }
            let id = format!("cf-{}", self.next_id.get());
            self.next_id.set(self.next_id.get() + 1);
            self.live.borrow_mut().insert(id.clone(), *mount);
            Ok(WidgetId::new(id))
        }

        fn get_response(&self, id: &WidgetId) -> Option<String> {
            self.tokens.borrow().get(id.as_str()).cloned()
        }

        fn reset(&self, id: &WidgetId) {
            self.resets.set(self.resets.get() + 1);
            self.tokens.borrow_mut().remove(id.as_str());
        }

        fn remove(&self, id: &WidgetId) {
            self.live.borrow_mut().remove(id.as_str());
        }
    }

    fn manager(loaded: bool, sitekey: &str) -> (Rc<StubSdk>, WidgetManager<Rc<StubSdk>, ReadyHost>) {
        let sdk = Rc::new(StubSdk::default());
        let loader = Rc::new(ScriptLoader::new(ReadyHost(loaded)));
        (Rc::clone(&sdk), WidgetManager::new(sdk, loader, sitekey))
    }

    #[test]
    fn render_requires_loaded_script() {
        let (_, widgets) = manager(false, "site-key");
        assert_eq!(
            widgets.render("challenge"),
            Err(WidgetRenderError::NotLoaded)
        );
        assert!(widgets.current().is_none());
    }

    #[test]
    fn render_rejects_invalid_mount() {
        let (_, widgets) = manager(true, "site-key");
        assert_eq!(widgets.render(""), Err(WidgetRenderError::InvalidMount));
    }

    #[test]
    fn sdk_rejection_is_reported() {
        let (_, widgets) = manager(true, "rejected");
        assert_eq!(
            widgets.render("challenge"),
            Err(WidgetRenderError::Sdk("invalid sitekey".to_string()))
        );
    }

    #[test]
    fn rerender_replaces_previous_widget() {
        let (sdk, widgets) = manager(true, "site-key");
        let first = widgets.render("challenge").expect("first render");
        let second = widgets.render("challenge").expect("second render");

        assert_ne!(first, second);
        assert_eq!(sdk.live.borrow().len(), 1);
        assert_eq!(widgets.current(), Some(second));
    }

    #[test]
    fn stale_handle_yields_no_token() {
        let (sdk, widgets) = manager(true, "site-key");
        let stale = widgets.render("challenge").expect("first render");
        sdk.tokens
            .borrow_mut()
            .insert(stale.id().as_str().to_string(), "token-a".to_string());
        let live = widgets.render("challenge").expect("second render");
        sdk.tokens
            .borrow_mut()
            .insert(live.id().as_str().to_string(), "token-b".to_string());

        assert_eq!(widgets.get_token(&stale), None);
        assert_eq!(widgets.get_token(&live), Some("token-b".to_string()));
    }

    #[test]
    fn reset_clears_completed_token() {
        let (sdk, widgets) = manager(true, "site-key");
        let handle = widgets.render("challenge").expect("render");
        sdk.tokens
            .borrow_mut()
            .insert(handle.id().as_str().to_string(), "token".to_string());

        widgets.reset(&handle);

        assert_eq!(widgets.get_token(&handle), None);
        assert_eq!(sdk.resets.get(), 1);
    }

    #[test]
    fn blank_token_counts_as_absent() {
        let (sdk, widgets) = manager(true, "site-key");
        let handle = widgets.render("challenge").expect("render");
        sdk.tokens
            .borrow_mut()
            .insert(handle.id().as_str().to_string(), String::new());

        assert_eq!(widgets.get_token(&handle), None);
    }

    #[test]
    fn teardown_removes_widget() {
        let (sdk, widgets) = manager(true, "site-key");
        widgets.render("challenge").expect("render");

        widgets.teardown();

        assert!(sdk.live.borrow().is_empty());
        assert!(widgets.current().is_none());
    }
}
