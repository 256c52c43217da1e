//! Teller core: pure selection, posting-policy, and step logic.
mod policy;
mod selection;
mod steps;
mod types;

pub use policy::{
    effective_balance, noncompliant_shares, parse_amount, validate_posting, PostingPolicy,
    COMMENT_MAX_LEN,
};
pub use selection::{SelectionEntry, SelectionSet, Subject};
pub use steps::StepTracker;
pub use types::{
    GroupId, GroupRef, InstanceId, InstanceRef, Share, ShareId, ShareTypeId, ShareTypeRef,
    StudentId, StudentRef,
};
