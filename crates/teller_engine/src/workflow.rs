use crate::backend::BackendError;
use crate::csv_import::CsvImportError;

/// Failures surfaced by the workflow terminal actions.
///
/// Validation problems never end up here; they accumulate as strings in the
/// workflow state for the caller to present.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// A precondition was violated before any collaborator call.
    #[error("{0}")]
    State(String),
    /// The workflow state does not pass the current step's validation.
    #[error("workflow state is not valid for submission")]
    Invalid,
    #[error(transparent)]
    Import(#[from] CsvImportError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}
