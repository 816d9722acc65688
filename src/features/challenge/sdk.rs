use std::fmt;

/// Opaque identifier handed out by the SDK for one rendered widget.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WidgetId(String);

impl WidgetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// The third-party challenge SDK as seen from Rust.
///
/// Mirrors `window.turnstile`: `render(element, { sitekey, callback })`,
/// `getResponse(id)`, `reset(id)` and `remove(id)`. Calls are synchronous; the
/// controller samples [`ChallengeSdk::get_response`] at submit time instead of
/// listening for the completion callback.
pub trait ChallengeSdk {
    /// Element the widget is rendered into.
    type Mount: Clone;

    /// Whether `mount` can host a widget (attached to the document, for example).
    fn mount_is_valid(&self, mount: &Self::Mount) -> bool;

    /// Renders a widget and returns its id, or the SDK's rejection reason.
    fn render(&self, mount: &Self::Mount, sitekey: &str) -> Result<WidgetId, String>;

    /// The completed token, if the visitor has solved the challenge.
    fn get_response(&self, id: &WidgetId) -> Option<String>;

    fn reset(&self, id: &WidgetId);

    fn remove(&self, id: &WidgetId);
}
