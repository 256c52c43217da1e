use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use engine_logging::engine_info;
use rust_decimal::Decimal;

use teller_core::{
    effective_balance, noncompliant_shares, parse_amount, validate_posting, PostingPolicy,
    SelectionSet, Share, ShareTypeRef, StepTracker, StudentRef,
};

use crate::backend::{GroupDirectory, PostingLedger, PostingOutcome, PostingRequest};
use crate::debounce::Debouncer;
use crate::resolve::resolve_selection;
use crate::workflow::WorkflowError;

pub const STEP_SHARE_TYPE: u8 = 1;
pub const STEP_AMOUNT: u8 = 2;
pub const STEP_REVIEW: u8 = 3;

/// Quantum for the debounced re-validation of the amount input.
const AMOUNT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Outcome of one (possibly debounced) amount validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountValidation {
    pub raw: String,
    pub amount: Option<Decimal>,
    pub errors: Vec<String>,
}

/// Staged bulk-posting workflow: pick a share type, specify the amount,
/// review, post. Reads a caller-owned [`SelectionSet`]; posting issues one
/// un-chunked bulk call.
#[derive(Debug)]
pub struct PostWorkflow {
    steps: StepTracker,
    share_type: Option<ShareTypeRef>,
    raw_amount: String,
    amount: Option<Decimal>,
    comment: String,
    policy: PostingPolicy,
    students: Vec<StudentRef>,
    errors_by_step: BTreeMap<u8, Vec<String>>,
    debounce: Debouncer,
}

/// Read-only projection for presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostView {
    pub step: u8,
    pub has_next_step: bool,
    pub student_count: usize,
    pub share_count: usize,
    pub noncompliant_count: usize,
    /// True when the policy makes the noncompliant shares submission-blocking.
    pub blocked: bool,
    pub current_errors: Vec<String>,
}

impl Default for PostWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl PostWorkflow {
    pub fn new() -> Self {
        Self::with_amount_debounce(AMOUNT_DEBOUNCE)
    }

    /// Same as [`PostWorkflow::new`] with an explicit debounce quantum.
    pub fn with_amount_debounce(quantum: Duration) -> Self {
        Self {
            steps: StepTracker::new(STEP_REVIEW),
            share_type: None,
            raw_amount: String::new(),
            amount: None,
            comment: String::new(),
            policy: PostingPolicy::default(),
            students: Vec::new(),
            errors_by_step: BTreeMap::new(),
            debounce: Debouncer::new(quantum),
        }
    }

    /// Resolves the caller's selection into the student list this posting
    /// targets. Refuses an empty resolution before any further work.
    pub async fn load_students(
        &mut self,
        selection: &SelectionSet,
        directory: &dyn GroupDirectory,
    ) -> Result<(), WorkflowError> {
        let students = resolve_selection(selection, directory).await?;
        if students.is_empty() {
            return Err(WorkflowError::State("no students selected".to_string()));
        }
        self.students = students;
        Ok(())
    }

    pub fn set_share_type(&mut self, share_type: Option<ShareTypeRef>) {
        self.share_type = share_type;
    }

    pub fn set_policy(&mut self, policy: PostingPolicy) {
        self.policy = policy;
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
        self.revalidate_amount();
    }

    /// Immediate amount validation; errors land on the amount step.
    pub fn set_amount(&mut self, raw: impl Into<String>) {
        self.raw_amount = raw.into();
        self.revalidate_amount();
    }

    /// Debounced amount validation for keystroke-style callers: only the
    /// last call within the quantum runs, and its outcome is delivered to
    /// `on_done`. Fold the outcome back in with
    /// [`PostWorkflow::apply_amount_validation`].
    pub fn queue_amount_validation<F>(&mut self, raw: String, on_done: F)
    where
        F: FnOnce(AmountValidation) + Send + 'static,
    {
        let comment = self.comment.clone();
        self.debounce.schedule(async move {
            on_done(validate_raw_amount(&raw, &comment));
        });
    }

    pub fn apply_amount_validation(&mut self, validation: AmountValidation) {
        self.raw_amount = validation.raw;
        self.amount = validation.amount;
        self.errors_by_step.insert(STEP_AMOUNT, validation.errors);
    }

    fn revalidate_amount(&mut self) {
        let validation = validate_raw_amount(&self.raw_amount, &self.comment);
        self.amount = validation.amount;
        self.errors_by_step.insert(STEP_AMOUNT, validation.errors);
    }

    pub fn students(&self) -> &[StudentRef] {
        &self.students
    }

    /// The students' shares of the selected share type; the shares this
    /// posting would touch.
    pub fn shares(&self) -> Vec<&Share> {
        let Some(share_type) = &self.share_type else {
            return Vec::new();
        };
        self.students
            .iter()
            .flat_map(|student| &student.shares)
            .filter(|share| share.share_type_id == share_type.id)
            .collect()
    }

    /// Shares the current amount would drive negative.
    pub fn noncompliant(&self) -> Vec<&Share> {
        let Some(amount) = self.amount else {
            return Vec::new();
        };
        let Some(share_type) = &self.share_type else {
            return Vec::new();
        };
        self.students
            .iter()
            .flat_map(|student| noncompliant_shares(&student.shares, amount))
            .filter(|share| share.share_type_id == share_type.id)
            .collect()
    }

    /// The balance a share ends up with under the current amount and policy.
    pub fn effective_balance(&self, share: &Share) -> Decimal {
        effective_balance(share, self.amount.unwrap_or(Decimal::ZERO), self.policy)
    }

    /// Step validity. Step 1 needs a share type and at least one student;
    /// step 2 and later also need a valid amount/comment pair, and under
    /// [`PostingPolicy::None`] no noncompliant shares.
    pub fn is_valid(&self, step: u8) -> bool {
        if step >= STEP_SHARE_TYPE && (self.share_type.is_none() || self.students.is_empty()) {
            return false;
        }
        if step >= STEP_AMOUNT {
            if self.amount.is_none() || !self.errors_for_step(STEP_AMOUNT).is_empty() {
                return false;
            }
            if self.policy == PostingPolicy::None && !self.noncompliant().is_empty() {
                return false;
            }
        }
        true
    }

    pub fn errors_for_step(&self, step: u8) -> &[String] {
        self.errors_by_step
            .get(&step)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Clamped navigation; never consults `is_valid`.
    pub fn increment_step(&mut self) {
        self.steps.increment();
    }

    pub fn decrement_step(&mut self) {
        self.steps.decrement();
    }

    pub fn current_step(&self) -> u8 {
        self.steps.current()
    }

    pub fn reset(&mut self) {
        *self = Self::with_amount_debounce(self.debounce.quantum());
    }

    /// Terminal action, only legal on the review step with valid state.
    ///
    /// Under [`PostingPolicy::Skip`] the noncompliant shares receive no
    /// request at all; otherwise every targeted share posts the full signed
    /// amount. One bulk call, no rollback.
    pub async fn post(
        &mut self,
        ledger: &dyn PostingLedger,
    ) -> Result<Vec<PostingOutcome>, WorkflowError> {
        if !self.steps.is_last() {
            return Err(WorkflowError::State(
                "posting is only available from the review step".to_string(),
            ));
        }
        if self.students.is_empty() {
            return Err(WorkflowError::State("no students selected".to_string()));
        }
        if !self.is_valid(self.steps.current()) {
            return Err(WorkflowError::Invalid);
        }
        let Some(amount) = self.amount else {
            return Err(WorkflowError::Invalid);
        };
        self.debounce.cancel();

        let skipped: HashSet<_> = if self.policy == PostingPolicy::Skip {
            self.noncompliant().into_iter().map(|share| share.id).collect()
        } else {
            HashSet::new()
        };
        let requests: Vec<PostingRequest> = self
            .shares()
            .into_iter()
            .filter(|share| !skipped.contains(&share.id))
            .map(|share| PostingRequest {
                share_id: share.id,
                amount,
                comment: self.comment.clone(),
            })
            .collect();

        engine_info!(
            "posting {amount} to {} shares ({} skipped)",
            requests.len(),
            skipped.len()
        );
        let outcomes = ledger.post_bulk_transaction(&requests, self.policy).await?;
        Ok(outcomes)
    }

    pub fn view(&self) -> PostView {
        PostView {
            step: self.steps.current(),
            has_next_step: self.steps.has_next(),
            student_count: self.students.len(),
            share_count: self.shares().len(),
            noncompliant_count: self.noncompliant().len(),
            blocked: self.policy == PostingPolicy::None && !self.noncompliant().is_empty(),
            current_errors: self.errors_for_step(self.steps.current()).to_vec(),
        }
    }
}

fn validate_raw_amount(raw: &str, comment: &str) -> AmountValidation {
    match parse_amount(raw) {
        Ok(amount) => AmountValidation {
            raw: raw.to_string(),
            amount: Some(amount),
            errors: validate_posting(amount, comment),
        },
        Err(message) => AmountValidation {
            raw: raw.to_string(),
            amount: None,
            errors: vec![message],
        },
    }
}
