use std::path::{Path, PathBuf};

use common::{Document, DocumentFile, DocumentId, DocumentType};
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed reading manifest {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed parsing manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("document #{index} has an empty title")]
    EmptyTitle { index: usize },
    #[error("failed reading attachment {path}: {source}")]
    Attachment {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Deserialize)]
struct ManifestFile {
    #[serde(default)]
    documents: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    id: Option<i64>,
    #[serde(rename = "type")]
    document_type: DocumentType,
    title: String,
    order: Option<i64>,
    file: Option<PathBuf>,
    original_filename: Option<String>,
}

/// Loads the local document list of one position. Attachment paths are
/// resolved against the manifest's directory; `order` defaults to the
/// 1-based entry position.
pub fn load_manifest(path: &Path) -> Result<Vec<Document>, ManifestError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    parse_manifest(&raw, base_dir).map_err(|err| match err {
        ManifestError::Parse { source, .. } => ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

pub fn parse_manifest(raw: &str, base_dir: &Path) -> Result<Vec<Document>, ManifestError> {
    let manifest: ManifestFile = toml::from_str(raw).map_err(|source| ManifestError::Parse {
        path: PathBuf::from("<inline>"),
        source,
    })?;

    let mut docs = Vec::with_capacity(manifest.documents.len());
    for (idx, entry) in manifest.documents.into_iter().enumerate() {
        let index = idx + 1;
        let title = entry.title.trim().to_string();
        if title.is_empty() {
            return Err(ManifestError::EmptyTitle { index });
        }
        let new_file = entry
            .file
            .map(|file| {
                let resolved = base_dir.join(file);
                DocumentFile::from_path(&resolved).map_err(|source| ManifestError::Attachment {
                    path: resolved,
                    source,
                })
            })
            .transpose()?;
        let original_filename = new_file
            .as_ref()
            .map(|f| f.file_name.clone())
            .or(entry.original_filename);

        docs.push(Document {
            id: entry.id.map(DocumentId),
            document_type: entry.document_type,
            document_title: title,
            display_order: entry.order.unwrap_or_else(|| i64::try_from(index).unwrap_or(i64::MAX)),
            original_filename,
            new_file,
        });
    }
    Ok(docs)
}

#[cfg(test)]
mod tests {
    use common::{DocumentId, DocumentType};

    use super::{ManifestError, load_manifest, parse_manifest};

    #[test]
    fn resolves_attachments_relative_to_manifest() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("bond.pdf"), b"%PDF-bond").expect("write pdf");
        let manifest = dir.path().join("docs.toml");
        std::fs::write(
            &manifest,
            r#"
[[documents]]
id = 1
type = "job_description"
title = "JD v2"
order = 1

[[documents]]
type = "bond_details"
title = "Bond"
file = "bond.pdf"
"#,
        )
        .expect("write manifest");

        let docs = load_manifest(&manifest).expect("manifest");
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, Some(DocumentId(1)));
        assert!(!docs[0].has_new_file());
        assert_eq!(docs[1].id, None);
        assert_eq!(docs[1].display_order, 2);
        assert_eq!(docs[1].document_type, DocumentType::BondDetails);
        assert_eq!(docs[1].original_filename.as_deref(), Some("bond.pdf"));
        assert_eq!(
            docs[1].new_file.as_ref().map(|f| f.bytes.clone()),
            Some(b"%PDF-bond".to_vec())
        );
    }

    #[test]
    fn empty_title_is_rejected() {
        let err = parse_manifest(
            "[[documents]]\ntype = 'other'\ntitle = '   '\n",
            std::path::Path::new("."),
        )
        .expect_err("must fail");
        assert!(matches!(err, ManifestError::EmptyTitle { index: 1 }));
    }

    #[test]
    fn missing_attachment_names_the_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = parse_manifest(
            "[[documents]]\ntype = 'other'\ntitle = 'Misc'\nfile = 'missing.pdf'\n",
            dir.path(),
        )
        .expect_err("must fail");
        assert!(err.to_string().contains("missing.pdf"));
    }

    #[test]
    fn unknown_document_type_fails_to_parse() {
        let err = parse_manifest(
            "[[documents]]\ntype = 'offer_letter'\ntitle = 'Offer'\n",
            std::path::Path::new("."),
        )
        .expect_err("must fail");
        assert!(matches!(err, ManifestError::Parse { .. }));
    }

    #[test]
    fn empty_manifest_is_an_empty_list() {
        let docs = parse_manifest("", std::path::Path::new(".")).expect("manifest");
        assert!(docs.is_empty());
    }
}
