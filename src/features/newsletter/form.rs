/// View model rendered by the newsletter form. Only the submission controller
/// writes it; presentation receives snapshots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormState {
    pub email: String,
    pub is_submitting: bool,
    pub is_success: bool,
    pub error: Option<String>,
}
