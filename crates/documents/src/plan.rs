use common::{Document, DocumentChangeSet, DocumentId, DocumentMetadata};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DocumentOperation {
    Delete {
        document_id: DocumentId,
    },
    CreateBatch {
        documents: Vec<Document>,
    },
    Update {
        document_id: DocumentId,
        metadata: DocumentMetadata,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncPlan {
    pub operations: Vec<DocumentOperation>,
    /// Pending creations with nothing to upload; the batch endpoint needs a file per entry.
    pub skipped_without_file: Vec<Document>,
}

impl SyncPlan {
    pub fn deletes(&self) -> impl Iterator<Item = DocumentId> + '_ {
        self.operations.iter().filter_map(|op| match op {
            DocumentOperation::Delete { document_id } => Some(*document_id),
            _ => None,
        })
    }

    pub fn uploads(&self) -> &[Document] {
        self.operations
            .iter()
            .find_map(|op| match op {
                DocumentOperation::CreateBatch { documents } => Some(documents.as_slice()),
                _ => None,
            })
            .unwrap_or_default()
    }

    pub fn updates(&self) -> impl Iterator<Item = (DocumentId, &DocumentMetadata)> + '_ {
        self.operations.iter().filter_map(|op| match op {
            DocumentOperation::Update {
                document_id,
                metadata,
            } => Some((*document_id, metadata)),
            _ => None,
        })
    }

    pub const fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Deletes first, then the single upload batch, then metadata updates.
pub fn plan_edit_operations(changes: &DocumentChangeSet) -> SyncPlan {
    let mut plan = SyncPlan::default();
    plan.operations.extend(
        changes
            .to_delete
            .iter()
            .map(|id| DocumentOperation::Delete { document_id: *id }),
    );
    push_create_batch(&mut plan, &changes.to_create);
    plan.operations
        .extend(changes.to_update.iter().filter_map(|doc| {
            doc.id.map(|document_id| DocumentOperation::Update {
                document_id,
                metadata: doc.metadata(),
            })
        }));
    plan
}

pub fn plan_create_operations(local_docs: &[Document]) -> SyncPlan {
    let mut plan = SyncPlan::default();
    push_create_batch(&mut plan, local_docs);
    plan
}

fn push_create_batch(plan: &mut SyncPlan, candidates: &[Document]) {
    let (with_file, without_file): (Vec<_>, Vec<_>) = candidates
        .iter()
        .cloned()
        .partition(Document::has_new_file);
    plan.skipped_without_file.extend(without_file);
    if !with_file.is_empty() {
        plan.operations.push(DocumentOperation::CreateBatch {
            documents: with_file,
        });
    }
}
