use std::collections::BTreeSet;

use common::{Document, DocumentFile, DocumentId, DocumentType};
use documents::{detect_document_changes, plan_edit_operations};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Edit {
    Drop,
    Keep,
    Retitle,
    Reorder,
    Retype,
    Replace,
}

fn pdf() -> DocumentFile {
    DocumentFile::new("upload.pdf", b"%PDF-1.7".to_vec())
}

fn next_type(kind: DocumentType) -> DocumentType {
    let idx = DocumentType::ALL
        .iter()
        .position(|k| *k == kind)
        .unwrap_or_default();
    DocumentType::ALL[(idx + 1) % DocumentType::ALL.len()]
}

fn doc_type() -> impl Strategy<Value = DocumentType> {
    prop::sample::select(DocumentType::ALL.to_vec())
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        Just(Edit::Drop),
        Just(Edit::Keep),
        Just(Edit::Retitle),
        Just(Edit::Reorder),
        Just(Edit::Retype),
        Just(Edit::Replace),
    ]
}

fn existing_docs() -> impl Strategy<Value = Vec<Document>> {
    prop::collection::btree_set(1i64..500, 0..12)
        .prop_flat_map(|ids| {
            let ids = ids.into_iter().collect::<Vec<_>>();
            let n = ids.len();
            (
                Just(ids),
                prop::collection::vec(("[A-Za-z ]{1,12}", doc_type(), 0i64..20), n),
            )
        })
        .prop_map(|(ids, meta)| {
            ids.into_iter()
                .zip(meta)
                .map(|(id, (title, kind, order))| Document::new(kind, title, order).with_id(id))
                .collect()
        })
}

fn apply(doc: &Document, edit: Edit) -> Option<Document> {
    let mut out = doc.clone();
    match edit {
        Edit::Drop => return None,
        Edit::Keep => {}
        Edit::Retitle => out.document_title.push_str(" v2"),
        Edit::Reorder => out.display_order += 1,
        Edit::Retype => out.document_type = next_type(out.document_type),
        Edit::Replace => out.new_file = Some(pdf()),
    }
    Some(out)
}

/// An edited snapshot: every local id comes from the server snapshot.
fn edit_scenario() -> impl Strategy<Value = (Vec<Document>, Vec<Document>)> {
    existing_docs()
        .prop_flat_map(|existing| {
            let n = existing.len();
            (
                Just(existing),
                prop::collection::vec(edit(), n),
                prop::collection::vec(("[a-z]{1,8}", doc_type(), any::<bool>()), 0..5),
            )
        })
        .prop_map(|(existing, edits, additions)| {
            let mut local = existing
                .iter()
                .zip(edits)
                .filter_map(|(doc, edit)| apply(doc, edit))
                .collect::<Vec<_>>();
            local.extend(additions.into_iter().zip(100i64..).map(
                |((title, kind, with_file), order)| {
                    let doc = Document::new(kind, title, order);
                    if with_file { doc.with_file(pdf()) } else { doc }
                },
            ));
            (existing, local)
        })
}

fn occurrences(haystack: &[Document], needle: &Document) -> usize {
    haystack.iter().filter(|doc| *doc == needle).count()
}

fn ids(docs: &[Document]) -> BTreeSet<DocumentId> {
    docs.iter().filter_map(|doc| doc.id).collect()
}

proptest! {
    #[test]
    fn local_documents_are_partitioned((existing, local) in edit_scenario()) {
        let changes = detect_document_changes(&existing, &local);
        prop_assert_eq!(
            changes.to_create.len() + changes.to_update.len() + changes.unchanged.len(),
            local.len()
        );
        for doc in &local {
            let placed = occurrences(&changes.to_create, doc)
                + occurrences(&changes.to_update, doc)
                + occurrences(&changes.unchanged, doc);
            prop_assert_eq!(placed, occurrences(&local, doc));
        }
    }

    #[test]
    fn deletions_cover_removed_and_replaced_ids((existing, local) in edit_scenario()) {
        let changes = detect_document_changes(&existing, &local);
        let deleted = changes.to_delete.iter().copied().collect::<BTreeSet<_>>();
        prop_assert_eq!(deleted.len(), changes.to_delete.len());

        let removed = ids(&existing).difference(&ids(&local)).copied().collect::<BTreeSet<_>>();
        let replaced = local
            .iter()
            .filter(|doc| doc.has_new_file())
            .filter_map(|doc| doc.id)
            .collect::<BTreeSet<_>>();
        let expected = removed.union(&replaced).copied().collect::<BTreeSet<_>>();
        prop_assert_eq!(deleted, expected);
    }

    #[test]
    fn replacement_files_force_delete_and_recreate((existing, local) in edit_scenario()) {
        let changes = detect_document_changes(&existing, &local);
        let known = ids(&existing);
        for doc in local.iter().filter(|d| d.has_new_file()) {
            let Some(id) = doc.id else { continue };
            prop_assert!(known.contains(&id));
            prop_assert!(changes.to_delete.contains(&id));
            prop_assert!(changes.to_create.contains(doc));
            prop_assert!(!changes.to_update.iter().any(|d| d.id == Some(id)));
            prop_assert!(!changes.unchanged.iter().any(|d| d.id == Some(id)));
        }
    }

    #[test]
    fn creations_keep_local_order((existing, local) in edit_scenario()) {
        let changes = detect_document_changes(&existing, &local);
        let expected = local
            .iter()
            .filter(|doc| doc.id.is_none() || doc.has_new_file())
            .cloned()
            .collect::<Vec<_>>();
        prop_assert_eq!(changes.to_create, expected);
    }

    #[test]
    fn unmodified_copy_is_a_noop(existing in existing_docs()) {
        let changes = detect_document_changes(&existing, &existing.clone());
        prop_assert!(changes.to_delete.is_empty());
        prop_assert!(changes.to_create.is_empty());
        prop_assert!(changes.to_update.is_empty());
        prop_assert_eq!(&changes.unchanged, &existing);
        prop_assert!(plan_edit_operations(&changes).is_empty());
    }

    #[test]
    fn single_metadata_change_moves_only_that_document(
        existing in existing_docs().prop_filter("need a document", |d| !d.is_empty()),
        pick in any::<prop::sample::Index>(),
        edit in prop_oneof![Just(Edit::Retitle), Just(Edit::Reorder), Just(Edit::Retype)],
    ) {
        let target = pick.index(existing.len());
        let mut local = existing.clone();
        local[target] = apply(&existing[target], edit).expect("edit keeps the document");

        let changes = detect_document_changes(&existing, &local);
        prop_assert_eq!(changes.to_update, vec![local[target].clone()]);
        let mut untouched = existing.clone();
        untouched.remove(target);
        prop_assert_eq!(changes.unchanged, untouched);
        prop_assert!(changes.to_delete.is_empty());
        prop_assert!(changes.to_create.is_empty());
    }
}

#[test]
fn jd_salary_bond_scenario() {
    let existing = vec![
        Document::new(DocumentType::JobDescription, "JD", 1).with_id(1),
        Document::new(DocumentType::SalaryBreakdown, "Salary", 2).with_id(2),
    ];
    let local = vec![
        Document::new(DocumentType::JobDescription, "JD v2", 1).with_id(1),
        Document::new(DocumentType::BondDetails, "Bond", 3).with_file(pdf()),
    ];

    let changes = detect_document_changes(&existing, &local);
    assert_eq!(changes.to_delete, vec![DocumentId(2)]);
    assert_eq!(changes.to_create, vec![local[1].clone()]);
    assert_eq!(changes.to_update, vec![local[0].clone()]);
    assert!(changes.unchanged.is_empty());
}
