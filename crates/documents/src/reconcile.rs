use ahash::{AHashMap, AHashSet};
use common::{Document, DocumentChangeSet, DocumentId};

/// Diffs the locally edited documents of one position against the last
/// server snapshot.
///
/// Output lists follow input scan order. A local document that keeps its id
/// but carries a new file is deleted and recreated, even when its metadata
/// also changed. A local id that is unknown to the snapshot and carries no
/// file produces no operation at all.
///
/// `existing_docs` is expected to hold unique ids; with duplicates the last
/// entry is used for comparison (see [`first_duplicate_id`]).
pub fn detect_document_changes(
    existing_docs: &[Document],
    new_docs: &[Document],
) -> DocumentChangeSet {
    let existing_by_id: AHashMap<DocumentId, &Document> = existing_docs
        .iter()
        .filter_map(|doc| doc.id.map(|id| (id, doc)))
        .collect();
    let mut seen: AHashSet<DocumentId> = AHashSet::with_capacity(new_docs.len());
    let mut changes = DocumentChangeSet::default();

    for doc in new_docs {
        let Some(id) = doc.id else {
            changes.to_create.push(doc.clone());
            continue;
        };
        seen.insert(id);

        if doc.has_new_file() {
            changes.to_delete.push(id);
            changes.to_create.push(doc.clone());
            continue;
        }

        match existing_by_id.get(&id) {
            Some(prior) if prior.metadata_differs(doc) => changes.to_update.push(doc.clone()),
            Some(_) => changes.unchanged.push(doc.clone()),
            None => tracing::debug!(document_id = %id, "no prior document for id, skipping"),
        }
    }

    changes.to_delete.extend(
        existing_docs
            .iter()
            .filter_map(|doc| doc.id)
            .filter(|id| !seen.contains(id)),
    );
    changes
}

pub fn first_duplicate_id(docs: &[Document]) -> Option<DocumentId> {
    let mut seen = AHashSet::with_capacity(docs.len());
    docs.iter()
        .filter_map(|doc| doc.id)
        .find(|id| !seen.insert(*id))
}
