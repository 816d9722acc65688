//! Shared UI components exported for the app shell.

pub(crate) mod newsletter;
pub(crate) mod ui;

pub use newsletter::{NewsletterForm, NewsletterPopup};
pub(crate) use ui::{Alert, AlertKind, Button, Spinner};
