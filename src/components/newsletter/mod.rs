mod form;
mod popup;

pub use form::NewsletterForm;
pub use popup::NewsletterPopup;
