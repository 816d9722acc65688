//! Backend seam for the subscription call.

use super::types::SubscriptionRequest;
use crate::app_lib::AppError;

/// Sends one subscription request. A 2xx response is `Ok(())`; the body is
/// ignored.
#[allow(async_fn_in_trait)]
pub trait NewsletterBackend {
    async fn subscribe(&self, request: &SubscriptionRequest) -> Result<(), AppError>;
}

/// `POST /api/newsletter` through the shared API helpers.
#[cfg(target_arch = "wasm32")]
#[derive(Clone, Debug, Default)]
pub struct HttpNewsletterBackend;

#[cfg(target_arch = "wasm32")]
impl NewsletterBackend for HttpNewsletterBackend {
    async fn subscribe(&self, request: &SubscriptionRequest) -> Result<(), AppError> {
        crate::app_lib::post_json_with_headers(
            super::types::SUBSCRIBE_PATH,
            request,
            &request.headers(),
        )
        .await
    }
}
