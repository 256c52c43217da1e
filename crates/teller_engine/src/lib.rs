//! Teller engine: collaborator seams, bounded batching, and the bulk
//! import/posting workflows.
mod backend;
mod batch;
mod csv_import;
mod debounce;
mod import_workflow;
mod post_workflow;
mod resolve;
mod workflow;

pub use backend::{
    BackendError, GroupDirectory, IdentifierLookup, NewShareRequest, NewStudentRequest,
    PostingLedger, PostingOutcome, PostingRequest, RosterBackend, ShareTemplate,
};
pub use batch::{run_batched, DEFAULT_BATCH_CONCURRENCY};
pub use csv_import::{parse_roster, CsvImportError, CsvImportSettings, RosterImport};
pub use debounce::Debouncer;
pub use import_workflow::{ImportView, ImportWorkflow};
pub use post_workflow::{
    AmountValidation, PostView, PostWorkflow, STEP_AMOUNT, STEP_REVIEW, STEP_SHARE_TYPE,
};
pub use resolve::resolve_selection;
pub use workflow::WorkflowError;
