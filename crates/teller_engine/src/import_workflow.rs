use std::collections::HashMap;
use std::sync::Mutex;

use engine_logging::{engine_info, engine_warn};
use rust_decimal::Decimal;

use teller_core::{
    GroupRef, InstanceRef, PostingPolicy, Share, ShareTypeId, StepTracker, StudentRef,
};

use crate::backend::{
    BackendError, NewShareRequest, NewStudentRequest, PostingOutcome, PostingRequest,
    RosterBackend, ShareTemplate,
};
use crate::batch::{run_batched, DEFAULT_BATCH_CONCURRENCY};
use crate::csv_import::{parse_roster, CsvImportSettings};
use crate::workflow::WorkflowError;

const IMPORT_LAST_STEP: u8 = 3;

/// Staged CSV-import workflow: upload, review, submit.
///
/// Submission creates pending groups, then students, then one share per
/// student and share template, each batched, and finally posts every initial
/// deposit in a single bulk call. There is no rollback; everything created
/// before a failure stays created and stays recorded here.
#[derive(Debug)]
pub struct ImportWorkflow {
    steps: StepTracker,
    loading: bool,
    errors: Vec<String>,
    instance: Option<InstanceRef>,
    share_templates: Vec<ShareTemplate>,
    existing_groups: Vec<GroupRef>,
    pending_groups: Vec<String>,
    pending_records: Vec<NewStudentRequest>,
    created_groups: Vec<GroupRef>,
    created_students: Vec<StudentRef>,
    created_shares: Vec<Share>,
    created_postings: Vec<PostingOutcome>,
}

/// Read-only projection for presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportView {
    pub step: u8,
    pub has_next_step: bool,
    pub loading: bool,
    pub record_count: usize,
    pub pending_group_count: usize,
    pub created_group_count: usize,
    pub created_student_count: usize,
    pub created_share_count: usize,
    pub posted_count: usize,
    pub errors: Vec<String>,
}

impl Default for ImportWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportWorkflow {
    pub fn new() -> Self {
        Self {
            steps: StepTracker::new(IMPORT_LAST_STEP),
            loading: false,
            errors: Vec::new(),
            instance: None,
            share_templates: Vec::new(),
            existing_groups: Vec::new(),
            pending_groups: Vec::new(),
            pending_records: Vec::new(),
            created_groups: Vec::new(),
            created_students: Vec::new(),
            created_shares: Vec::new(),
            created_postings: Vec::new(),
        }
    }

    pub fn set_instance(&mut self, instance: InstanceRef) {
        self.instance = Some(instance);
    }

    pub fn set_share_templates(&mut self, templates: Vec<ShareTemplate>) {
        self.share_templates = templates;
    }

    /// Parses roster CSV text against the selected instance's groups and
    /// stores the outcome for review.
    pub async fn load_roster(
        &mut self,
        text: &str,
        settings: &CsvImportSettings,
        backend: &dyn RosterBackend,
    ) -> Result<(), WorkflowError> {
        let instance = self.require_instance()?;
        self.loading = true;
        let result = self.run_parse(text, settings, instance, backend).await;
        self.loading = false;
        result
    }

    async fn run_parse(
        &mut self,
        text: &str,
        settings: &CsvImportSettings,
        instance: InstanceRef,
        backend: &dyn RosterBackend,
    ) -> Result<(), WorkflowError> {
        self.existing_groups = backend.fetch_groups(instance.id).await?;
        let import = parse_roster(text, settings, &self.existing_groups, backend).await?;
        self.pending_records = import.validated;
        self.pending_groups = import.pending_groups;
        self.errors = import.errors;
        Ok(())
    }

    /// Step validity. Step 1 needs an instance; step 2 and later also need
    /// at least one validated record.
    pub fn is_valid(&self, step: u8) -> bool {
        if step >= 1 && self.instance.is_none() {
            return false;
        }
        if step >= 2 && self.pending_records.is_empty() {
            return false;
        }
        true
    }

    /// Clamped navigation; never consults `is_valid`.
    pub fn increment_step(&mut self) {
        self.steps.increment();
    }

    pub fn decrement_step(&mut self) {
        self.steps.decrement();
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Terminal action, only legal on the final step with valid state.
    ///
    /// Runs the four submission stages in order. A failure in any stage
    /// surfaces that stage's first error; entities created by completed
    /// operations remain recorded in the `created_*` accessors.
    pub async fn import_and_post(
        &mut self,
        backend: &dyn RosterBackend,
    ) -> Result<(), WorkflowError> {
        if !self.steps.is_last() {
            return Err(WorkflowError::State(
                "submission is only available from the final step".to_string(),
            ));
        }
        if !self.is_valid(self.steps.current()) {
            return Err(WorkflowError::Invalid);
        }
        let instance = self.require_instance()?;
        self.loading = true;
        let result = self.run_submission(&instance, backend).await;
        self.loading = false;
        if let Err(error) = &result {
            engine_warn!("import submission failed: {error}");
        }
        result
    }

    async fn run_submission(
        &mut self,
        instance: &InstanceRef,
        backend: &dyn RosterBackend,
    ) -> Result<(), WorkflowError> {
        engine_info!(
            "importing {} students into instance {} ({} new groups)",
            self.pending_records.len(),
            instance.name,
            self.pending_groups.len()
        );

        // Stage 1: groups, so student creation can reference them.
        let recorded = Mutex::new(Vec::new());
        let outcome = run_batched(
            self.pending_groups.clone(),
            DEFAULT_BATCH_CONCURRENCY,
            |name| {
                let recorded = &recorded;
                async move {
                    let group = backend.create_group(&name, instance.id).await?;
                    recorded.lock().expect("group recorder").push(group.clone());
                    Ok::<_, BackendError>(group)
                }
            },
        )
        .await;
        self.created_groups = recorded.into_inner().expect("group recorder");
        outcome?;

        // Stage 2: students, with group references resolved against the now
        // complete group list.
        let groups_by_name: HashMap<String, GroupRef> = self
            .existing_groups
            .iter()
            .chain(self.created_groups.iter())
            .map(|group| (group.name.to_lowercase(), group.clone()))
            .collect();
        let recorded = Mutex::new(Vec::new());
        let outcome = run_batched(
            self.pending_records.clone(),
            DEFAULT_BATCH_CONCURRENCY,
            |request| {
                let recorded = &recorded;
                let groups_by_name = &groups_by_name;
                async move {
                    let group = groups_by_name
                        .get(&request.group_name.to_lowercase())
                        .ok_or_else(|| {
                            WorkflowError::State(format!(
                                "group '{}' is neither existing nor newly created",
                                request.group_name
                            ))
                        })?;
                    let student = backend
                        .create_student(&request, group.id)
                        .await
                        .map_err(WorkflowError::from)?;
                    recorded
                        .lock()
                        .expect("student recorder")
                        .push(student.clone());
                    Ok::<_, WorkflowError>(student)
                }
            },
        )
        .await;
        self.created_students = recorded.into_inner().expect("student recorder");
        outcome?;

        // Stage 3: one share per created student and template.
        let share_requests: Vec<NewShareRequest> = self
            .created_students
            .iter()
            .flat_map(|student| {
                self.share_templates.iter().map(move |template| NewShareRequest {
                    student_id: student.id,
                    share_type_id: template.share_type_id,
                })
            })
            .collect();
        let recorded = Mutex::new(Vec::new());
        let outcome = run_batched(share_requests, DEFAULT_BATCH_CONCURRENCY, |request| {
            let recorded = &recorded;
            async move {
                let share = backend.create_share(&request).await?;
                recorded.lock().expect("share recorder").push(share.clone());
                Ok::<_, BackendError>(share)
            }
        })
        .await;
        self.created_shares = recorded.into_inner().expect("share recorder");
        outcome?;

        // Stage 4: all initial deposits in one un-chunked bulk call; the
        // backend alone decides partial success of this request.
        let deposit_by_type: HashMap<ShareTypeId, Decimal> = self
            .share_templates
            .iter()
            .map(|template| (template.share_type_id, template.initial_deposit))
            .collect();
        let posting_requests: Vec<PostingRequest> = self
            .created_shares
            .iter()
            .filter_map(|share| {
                let amount = deposit_by_type.get(&share.share_type_id).copied()?;
                if amount.is_zero() {
                    return None;
                }
                Some(PostingRequest {
                    share_id: share.id,
                    amount,
                    comment: "Initial deposit".to_string(),
                })
            })
            .collect();
        if !posting_requests.is_empty() {
            self.created_postings = backend
                .post_bulk_transaction(&posting_requests, PostingPolicy::None)
                .await?;
        }

        engine_info!(
            "import complete: {} groups, {} students, {} shares, {} deposits",
            self.created_groups.len(),
            self.created_students.len(),
            self.created_shares.len(),
            self.created_postings.len()
        );
        Ok(())
    }

    fn require_instance(&self) -> Result<InstanceRef, WorkflowError> {
        self.instance
            .clone()
            .ok_or_else(|| WorkflowError::State("no instance selected".to_string()))
    }

    pub fn current_step(&self) -> u8 {
        self.steps.current()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn pending_groups(&self) -> &[String] {
        &self.pending_groups
    }

    pub fn pending_records(&self) -> &[NewStudentRequest] {
        &self.pending_records
    }

    pub fn created_groups(&self) -> &[GroupRef] {
        &self.created_groups
    }

    pub fn created_students(&self) -> &[StudentRef] {
        &self.created_students
    }

    pub fn created_shares(&self) -> &[Share] {
        &self.created_shares
    }

    pub fn created_postings(&self) -> &[PostingOutcome] {
        &self.created_postings
    }

    pub fn view(&self) -> ImportView {
        ImportView {
            step: self.steps.current(),
            has_next_step: self.steps.has_next(),
            loading: self.loading,
            record_count: self.pending_records.len(),
            pending_group_count: self.pending_groups.len(),
            created_group_count: self.created_groups.len(),
            created_student_count: self.created_students.len(),
            created_share_count: self.created_shares.len(),
            posted_count: self.created_postings.len(),
            errors: self.errors.clone(),
        }
    }
}
