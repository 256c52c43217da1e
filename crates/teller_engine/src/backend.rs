use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use teller_core::{
    GroupId, GroupRef, InstanceId, PostingPolicy, Share, ShareId, ShareTypeId, StudentId,
    StudentRef,
};

/// Failure reported by a backend collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The backend refused the operation and said why.
    #[error("{message}")]
    Rejected { message: String },
    /// The backend reported failure without a reason.
    #[error("unknown error")]
    Unknown,
}

impl BackendError {
    /// Builds the most specific error available from a collaborator reply.
    pub fn from_reason(reason: Option<String>) -> Self {
        match reason {
            Some(message) if !message.trim().is_empty() => Self::Rejected { message },
            _ => Self::Unknown,
        }
    }
}

/// A creation request produced by the CSV import pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudentRequest {
    pub account_number: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Group name as it appeared in the import source.
    pub group_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewShareRequest {
    pub student_id: StudentId,
    pub share_type_id: ShareTypeId,
}

/// Per-instance template describing one share every imported student gets,
/// together with the deposit that opens it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareTemplate {
    pub share_type_id: ShareTypeId,
    pub name: String,
    pub initial_deposit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingRequest {
    pub share_id: ShareId,
    pub amount: Decimal,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingOutcome {
    pub share_id: ShareId,
    pub balance: Decimal,
}

/// Resolves a group to its member students.
#[async_trait::async_trait]
pub trait GroupDirectory: Send + Sync {
    async fn fetch_group_members(&self, group_id: GroupId)
        -> Result<Vec<StudentRef>, BackendError>;
}

/// Looks up account numbers that already exist in the given groups; the CSV
/// pipeline uses this to drop rows that would collide.
#[async_trait::async_trait]
pub trait IdentifierLookup: Send + Sync {
    async fn fetch_existing_identifiers(
        &self,
        group_ids: &[GroupId],
    ) -> Result<Vec<String>, BackendError>;
}

/// Posts a bulk transaction in one backend call. Partial success is decided
/// by the backend; this side never chunks the request.
#[async_trait::async_trait]
pub trait PostingLedger: Send + Sync {
    async fn post_bulk_transaction(
        &self,
        requests: &[PostingRequest],
        policy: PostingPolicy,
    ) -> Result<Vec<PostingOutcome>, BackendError>;
}

/// Full backend surface the import workflow drives.
#[async_trait::async_trait]
pub trait RosterBackend: GroupDirectory + IdentifierLookup + PostingLedger {
    async fn fetch_groups(&self, instance_id: InstanceId) -> Result<Vec<GroupRef>, BackendError>;

    async fn create_group(
        &self,
        name: &str,
        instance_id: InstanceId,
    ) -> Result<GroupRef, BackendError>;

    async fn create_student(
        &self,
        request: &NewStudentRequest,
        group_id: GroupId,
    ) -> Result<StudentRef, BackendError>;

    async fn create_share(&self, request: &NewShareRequest) -> Result<Share, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_reason_keeps_the_backend_message() {
        let error = BackendError::from_reason(Some("insufficient funds".to_string()));
        assert_eq!(
            error,
            BackendError::Rejected {
                message: "insufficient funds".to_string()
            }
        );
        assert_eq!(error.to_string(), "insufficient funds");
    }

    #[test]
    fn blank_reasons_collapse_to_unknown() {
        assert_eq!(BackendError::from_reason(None), BackendError::Unknown);
        assert_eq!(
            BackendError::from_reason(Some("   ".to_string())),
            BackendError::Unknown
        );
    }
}
