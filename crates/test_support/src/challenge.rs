//! In-memory stand-ins for the SDK script and the challenge widget.

use futures::{
    FutureExt,
    channel::oneshot,
    future::LocalBoxFuture,
};
use newsletter_gate::features::challenge::{ChallengeSdk, ScriptHost, ScriptLoadError, WidgetId};
use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, HashSet},
    rc::Rc,
};

#[derive(Default)]
struct HostState {
    present: Cell<bool>,
    injections: Cell<usize>,
    removals: Cell<usize>,
    next_outcome: RefCell<Option<Result<(), ScriptLoadError>>>,
    expose_global: Cell<bool>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
}

/// Script host whose injections complete instantly unless held open.
#[derive(Clone)]
pub struct FakeScriptHost {
    state: Rc<HostState>,
}

impl Default for FakeScriptHost {
    fn default() -> Self {
        let state = HostState::default();
        state.expose_global.set(true);
        Self {
            state: Rc::new(state),
        }
    }
}

impl FakeScriptHost {
    /// A page where the SDK global already exists.
    #[must_use]
    pub fn preloaded() -> Self {
        let host = Self::default();
        host.state.present.set(true);
        host
    }

    /// Makes the next injection fail with `err`.
    pub fn fail_next(&self, err: ScriptLoadError) {
        self.state.next_outcome.replace(Some(Err(err)));
    }

    /// The next injection "loads" but never defines the SDK global.
    pub fn omit_global(&self) {
        self.state.expose_global.set(false);
    }

    /// Keeps the next injection pending until the returned sender fires or drops.
    #[must_use]
    pub fn hold_next(&self) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        self.state.gate.replace(Some(gate));
        release
    }

    #[must_use]
    pub fn injections(&self) -> usize {
        self.state.injections.get()
    }

    #[must_use]
    pub fn removals(&self) -> usize {
        self.state.removals.get()
    }
}

impl ScriptHost for FakeScriptHost {
    fn sdk_present(&self) -> bool {
        self.state.present.get()
    }

    fn inject(&self) -> LocalBoxFuture<'static, Result<(), ScriptLoadError>> {
        self.state.injections.set(self.state.injections.get() + 1);
        let state = Rc::clone(&self.state);
        let gate = state.gate.borrow_mut().take();
        async move {
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            let outcome = state.next_outcome.borrow_mut().take().unwrap_or(Ok(()));
            if outcome.is_ok() && state.expose_global.replace(true) {
                state.present.set(true);
            }
            outcome
        }
        .boxed_local()
    }

    fn remove(&self) {
        self.state.removals.set(self.state.removals.get() + 1);
        self.state.present.set(false);
    }
}

#[derive(Default)]
struct SdkState {
    next_id: Cell<usize>,
    // Widget id to the token the visitor produced, if any.
    widgets: RefCell<BTreeMap<String, Option<String>>>,
    detached: RefCell<HashSet<String>>,
    reject_next: RefCell<Option<String>>,
    sitekeys: RefCell<Vec<String>>,
    resets: Cell<usize>,
    removals: Cell<usize>,
}

/// Challenge SDK that renders into named mount points. Tokens appear only
/// when a test completes the challenge.
#[derive(Clone, Default)]
pub struct FakeChallengeSdk {
    state: Rc<SdkState>,
}

impl FakeChallengeSdk {
    /// Simulates the visitor solving the challenge of the newest widget.
    pub fn complete(&self, token: &str) {
        let mut widgets = self.state.widgets.borrow_mut();
        if let Some((_, slot)) = widgets.iter_mut().next_back() {
            *slot = Some(token.to_string());
        }
    }

    /// Simulates the visitor solving the challenge of one specific widget.
    pub fn complete_widget(&self, id: &WidgetId, token: &str) {
        if let Some(slot) = self.state.widgets.borrow_mut().get_mut(id.as_str()) {
            *slot = Some(token.to_string());
        }
    }

    /// Marks `mount` as detached from the page.
    pub fn detach(&self, mount: &str) {
        self.state.detached.borrow_mut().insert(mount.to_string());
    }

    /// Makes the next `render` call fail with `reason`.
    pub fn reject_next(&self, reason: &str) {
        self.state.reject_next.replace(Some(reason.to_string()));
    }

    /// Ids of widgets that are rendered and not removed.
    #[must_use]
    pub fn live_widgets(&self) -> Vec<WidgetId> {
        self.state
            .widgets
            .borrow()
            .keys()
            .map(WidgetId::new)
            .collect()
    }

    #[must_use]
    pub fn renders(&self) -> usize {
        self.state.next_id.get()
    }

    #[must_use]
    pub fn resets(&self) -> usize {
        self.state.resets.get()
    }

    #[must_use]
    pub fn removals(&self) -> usize {
        self.state.removals.get()
    }

    #[must_use]
    pub fn sitekeys(&self) -> Vec<String> {
        self.state.sitekeys.borrow().clone()
    }
}

impl ChallengeSdk for FakeChallengeSdk {
    type Mount = String;

    fn mount_is_valid(&self, mount: &String) -> bool {
        !mount.is_empty() && !self.state.detached.borrow().contains(mount)
    }

    fn render(&self, _mount: &String, sitekey: &str) -> Result<WidgetId, String> {
        if let Some(reason) = self.state.reject_next.borrow_mut().take() {
            return Err(reason);
        }
        self.state.sitekeys.borrow_mut().push(sitekey.to_string());
        let next = self.state.next_id.get() + 1;
        self.state.next_id.set(next);
        let id = format!("widget-{next:03}");
        self.state.widgets.borrow_mut().insert(id.clone(), None);
        Ok(WidgetId::new(id))
    }

    fn get_response(&self, id: &WidgetId) -> Option<String> {
        self.state
            .widgets
            .borrow()
            .get(id.as_str())
            .cloned()
            .flatten()
    }

    fn reset(&self, id: &WidgetId) {
        self.state.resets.set(self.state.resets.get() + 1);
        if let Some(slot) = self.state.widgets.borrow_mut().get_mut(id.as_str()) {
            *slot = None;
        }
    }

    fn remove(&self, id: &WidgetId) {
        self.state.removals.set(self.state.removals.get() + 1);
        self.state.widgets.borrow_mut().remove(id.as_str());
    }
}
