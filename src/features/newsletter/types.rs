use serde::Serialize;
use std::fmt;

/// Subscription endpoint, relative to the configured API base URL.
pub const SUBSCRIBE_PATH: &str = "/api/newsletter";
/// Header carrying the challenge token to the backend.
pub const TOKEN_HEADER: &str = "cf-turnstile-response";

/// Body and headers of one subscription attempt. Only `email` is serialized;
/// the token travels in [`TOKEN_HEADER`].
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionRequest {
    pub email: String,
    #[serde(skip)]
    pub verification_token: Option<String>,
}

impl SubscriptionRequest {
    pub fn new(email: impl Into<String>, verification_token: Option<String>) -> Self {
        Self {
            email: email.into(),
            verification_token,
        }
    }

    /// Extra request headers; empty when no token is attached.
    pub fn headers(&self) -> Vec<(String, String)> {
        self.verification_token
            .iter()
            .map(|token| (TOKEN_HEADER.to_string(), token.clone()))
            .collect()
    }
}

impl fmt::Debug for SubscriptionRequest {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SubscriptionRequest")
            .field("email", &self.email)
            .field(
                "verification_token",
                &self.verification_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Which failure class an attempt ended in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    Validation,
    Verification,
    NetworkOrServer,
}

/// Outcome of one submission attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionResult {
    Success,
    ValidationFailed(String),
    VerificationFailed(String),
    NetworkOrServerFailed(String),
}

impl SubmissionResult {
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            SubmissionResult::Success => None,
            SubmissionResult::ValidationFailed(_) => Some(FailureKind::Validation),
            SubmissionResult::VerificationFailed(_) => Some(FailureKind::Verification),
            SubmissionResult::NetworkOrServerFailed(_) => Some(FailureKind::NetworkOrServer),
        }
    }

    /// The inline error message, `None` on success.
    pub fn message(&self) -> Option<&str> {
        match self {
            SubmissionResult::Success => None,
            SubmissionResult::ValidationFailed(message)
            | SubmissionResult::VerificationFailed(message)
            | SubmissionResult::NetworkOrServerFailed(message) => Some(message),
        }
    }

    /// Whether the attempt consumed (or may have consumed) the challenge token.
    pub fn consumed_challenge(&self) -> bool {
        !matches!(self, SubmissionResult::ValidationFailed(_))
    }
}
