use std::sync::Arc;

use common::{Document, DocumentId};
use documents::{
    DocumentOperation, SyncPlan, detect_document_changes, first_duplicate_id,
    plan_create_operations, plan_edit_operations,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::{client::ApiClient, error::ApiError, telemetry::SyncTelemetry};

/// Local document list of one position, as edited in a submission.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionDocuments {
    pub position_id: i64,
    pub documents: Vec<Document>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedKind {
    Delete,
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedOperation {
    pub kind: FailedKind,
    pub document_id: DocumentId,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PositionSyncReport {
    pub position_id: i64,
    pub deleted: Vec<DocumentId>,
    pub created: usize,
    pub updated: Vec<DocumentId>,
    pub unchanged: usize,
    pub skipped_without_file: usize,
    pub failed: Vec<FailedOperation>,
}

impl PositionSyncReport {
    fn new(position_id: i64) -> Self {
        Self {
            position_id,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SubmissionReport {
    pub positions: Vec<PositionSyncReport>,
}

impl SubmissionReport {
    pub fn failed_operations(&self) -> usize {
        self.positions.iter().map(|p| p.failed.len()).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.failed_operations() == 0
    }
}

/// Applies document submissions against the backend, one position at a
/// time and one request at a time.
#[derive(Debug, Clone)]
pub struct DocumentSyncer {
    client: ApiClient,
    telemetry: Arc<SyncTelemetry>,
}

impl DocumentSyncer {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            telemetry: Arc::new(SyncTelemetry::default()),
        }
    }

    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Arc<SyncTelemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn telemetry(&self) -> &SyncTelemetry {
        &self.telemetry
    }

    /// Edit flow: reconcile the local list against the server snapshot and
    /// apply deletes, the upload batch, then metadata updates. Repeated ids
    /// on either side fail before any request is sent for writing.
    pub async fn sync_position(
        &self,
        batch_year: i32,
        position_id: i64,
        local: &[Document],
    ) -> Result<PositionSyncReport, ApiError> {
        if let Some(id) = first_duplicate_id(local) {
            return Err(ApiError::DuplicateLocalDocumentId { position_id, id });
        }
        let existing = self.client.list_position_documents(position_id).await?;
        if let Some(id) = first_duplicate_id(&existing) {
            return Err(ApiError::DuplicateDocumentId { position_id, id });
        }
        let changes = detect_document_changes(&existing, local);
        let plan = plan_edit_operations(&changes);

        let mut report = PositionSyncReport::new(position_id);
        report.unchanged = changes.unchanged.len();
        self.apply(batch_year, position_id, &plan, &mut report)
            .await?;
        Ok(report)
    }

    /// Create flow: upload every local document with a file, no reconciliation.
    pub async fn upload_position(
        &self,
        batch_year: i32,
        position_id: i64,
        local: &[Document],
    ) -> Result<PositionSyncReport, ApiError> {
        let plan = plan_create_operations(local);
        let mut report = PositionSyncReport::new(position_id);
        self.apply(batch_year, position_id, &plan, &mut report)
            .await?;
        Ok(report)
    }

    /// Processes positions in order; the first propagated failure aborts
    /// the rest. Work already applied stays applied.
    pub async fn sync_positions(
        &self,
        batch_year: i32,
        positions: &[PositionDocuments],
    ) -> Result<SubmissionReport, ApiError> {
        let mut submission = SubmissionReport::default();
        for position in positions {
            let report = self
                .sync_position(batch_year, position.position_id, &position.documents)
                .await
                .map_err(|err| abort(position.position_id, err))?;
            submission.positions.push(report);
        }
        Ok(submission)
    }

    pub async fn upload_positions(
        &self,
        batch_year: i32,
        positions: &[PositionDocuments],
    ) -> Result<SubmissionReport, ApiError> {
        let mut submission = SubmissionReport::default();
        for position in positions {
            let report = self
                .upload_position(batch_year, position.position_id, &position.documents)
                .await
                .map_err(|err| abort(position.position_id, err))?;
            submission.positions.push(report);
        }
        Ok(submission)
    }

    async fn apply(
        &self,
        batch_year: i32,
        position_id: i64,
        plan: &SyncPlan,
        report: &mut PositionSyncReport,
    ) -> Result<(), ApiError> {
        report.skipped_without_file = plan.skipped_without_file.len();
        for doc in &plan.skipped_without_file {
            warn!(
                position_id,
                title = %doc.document_title,
                "pending document has no file; not uploaded"
            );
        }

        for op in &plan.operations {
            match op {
                DocumentOperation::Delete { document_id } => {
                    match self.client.delete_document(*document_id).await {
                        Ok(()) => {
                            self.telemetry.inc_documents_deleted();
                            report.deleted.push(*document_id);
                        }
                        Err(err) => self.record_failure(
                            report,
                            FailedKind::Delete,
                            *document_id,
                            &err,
                        ),
                    }
                }
                DocumentOperation::CreateBatch { documents } => {
                    let created = self
                        .client
                        .create_documents(batch_year, position_id, documents)
                        .await?;
                    self.telemetry
                        .inc_documents_created(u64::try_from(created).unwrap_or(u64::MAX));
                    report.created += created;
                }
                DocumentOperation::Update {
                    document_id,
                    metadata,
                } => match self.client.update_document(*document_id, metadata).await {
                    Ok(()) => {
                        self.telemetry.inc_documents_updated();
                        report.updated.push(*document_id);
                    }
                    Err(err) => {
                        self.record_failure(report, FailedKind::Update, *document_id, &err);
                    }
                },
            }
        }

        self.telemetry.inc_positions_synced();
        info!(
            position_id,
            deleted = report.deleted.len(),
            created = report.created,
            updated = report.updated.len(),
            unchanged = report.unchanged,
            failed = report.failed.len(),
            "position documents synced"
        );
        Ok(())
    }

    fn record_failure(
        &self,
        report: &mut PositionSyncReport,
        kind: FailedKind,
        document_id: DocumentId,
        err: &ApiError,
    ) {
        warn!(
            position_id = report.position_id,
            document_id = document_id.0,
            ?kind,
            error = %err,
            "document operation failed; continuing"
        );
        self.telemetry.inc_operations_failed();
        report.failed.push(FailedOperation {
            kind,
            document_id,
            error: err.to_string(),
        });
    }
}

fn abort(position_id: i64, err: ApiError) -> ApiError {
    match err {
        already @ ApiError::PositionSync { .. } => already,
        other => ApiError::PositionSync {
            position_id,
            source: Box::new(other),
        },
    }
}
