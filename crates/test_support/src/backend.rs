use futures::channel::oneshot;
use newsletter_gate::{
    app_lib::AppError,
    features::newsletter::{NewsletterBackend, SubscriptionRequest},
};
use std::{
    cell::RefCell,
    collections::VecDeque,
    rc::Rc,
};

#[derive(Default)]
struct BackendState {
    requests: RefCell<Vec<SubscriptionRequest>>,
    responses: RefCell<VecDeque<Result<(), AppError>>>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
}

/// Backend that records every request and answers from a queue. An empty
/// queue answers with success.
#[derive(Clone, Default)]
pub struct RecordingBackend {
    state: Rc<BackendState>,
}

impl RecordingBackend {
    pub fn respond_with(&self, response: Result<(), AppError>) {
        self.state.responses.borrow_mut().push_back(response);
    }

    /// Answers the next call with an HTTP error carrying `message`.
    pub fn fail_next(&self, status: u16, message: &str) {
        self.respond_with(Err(AppError::Http {
            status,
            message: message.to_string(),
        }));
    }

    /// Keeps the next call in flight until the returned sender fires or drops.
    #[must_use]
    pub fn hold_next(&self) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        self.state.gate.replace(Some(gate));
        release
    }

    #[must_use]
    pub fn requests(&self) -> Vec<SubscriptionRequest> {
        self.state.requests.borrow().clone()
    }

    #[must_use]
    pub fn calls(&self) -> usize {
        self.state.requests.borrow().len()
    }
}

impl NewsletterBackend for RecordingBackend {
    async fn subscribe(&self, request: &SubscriptionRequest) -> Result<(), AppError> {
        self.state.requests.borrow_mut().push(request.clone());
        let gate = self.state.gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.state
            .responses
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok(()))
    }
}
