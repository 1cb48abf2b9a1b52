use std::{fmt, path::Path, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct DocumentId(pub i64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    JobDescription,
    SalaryBreakdown,
    BondDetails,
    CompanyProfile,
    EligibilityCriteria,
    Other,
}

impl DocumentType {
    pub const ALL: [Self; 6] = [
        Self::JobDescription,
        Self::SalaryBreakdown,
        Self::BondDetails,
        Self::CompanyProfile,
        Self::EligibilityCriteria,
        Self::Other,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::JobDescription => "job_description",
            Self::SalaryBreakdown => "salary_breakdown",
            Self::BondDetails => "bond_details",
            Self::CompanyProfile => "company_profile",
            Self::EligibilityCriteria => "eligibility_criteria",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| format!("unknown document type: {s}"))
    }
}

/// Binary payload picked in the form but not yet uploaded.
#[derive(Clone, PartialEq, Eq)]
pub struct DocumentFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl DocumentFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map_or_else(|| "document".to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self::new(file_name, bytes))
    }
}

impl fmt::Debug for DocumentFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// A position document. `id` is set once the backend knows about it; a
/// document without one is a pending local addition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    pub document_type: DocumentType,
    pub document_title: String,
    pub display_order: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,
    #[serde(skip)]
    pub new_file: Option<DocumentFile>,
}

impl Document {
    pub fn new(document_type: DocumentType, title: impl Into<String>, display_order: i64) -> Self {
        Self {
            id: None,
            document_type,
            document_title: title.into(),
            display_order,
            original_filename: None,
            new_file: None,
        }
    }

    #[must_use]
    pub const fn with_id(mut self, id: i64) -> Self {
        self.id = Some(DocumentId(id));
        self
    }

    #[must_use]
    pub fn with_file(mut self, file: DocumentFile) -> Self {
        self.new_file = Some(file);
        self
    }

    pub const fn has_new_file(&self) -> bool {
        self.new_file.is_some()
    }

    pub fn metadata(&self) -> DocumentMetadata {
        DocumentMetadata {
            document_title: self.document_title.clone(),
            document_type: self.document_type,
            display_order: self.display_order,
        }
    }

    pub fn metadata_differs(&self, other: &Self) -> bool {
        self.document_title != other.document_title
            || self.document_type != other.document_type
            || self.display_order != other.display_order
    }
}

/// Body of a metadata-only update; the binary payload is never replaced in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DocumentMetadata {
    pub document_title: String,
    pub document_type: DocumentType,
    pub display_order: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DocumentChangeSet {
    pub to_delete: Vec<DocumentId>,
    pub to_create: Vec<Document>,
    pub to_update: Vec<Document>,
    pub unchanged: Vec<Document>,
}

impl DocumentChangeSet {
    pub const fn is_noop(&self) -> bool {
        self.to_delete.is_empty() && self.to_create.is_empty() && self.to_update.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Document, DocumentFile, DocumentId, DocumentType};

    #[test]
    fn document_type_parses_loose_spellings() {
        assert_eq!(
            "Job Description".parse::<DocumentType>(),
            Ok(DocumentType::JobDescription)
        );
        assert_eq!(
            "bond-details".parse::<DocumentType>(),
            Ok(DocumentType::BondDetails)
        );
        assert!("offer_letter".parse::<DocumentType>().is_err());
    }

    #[test]
    fn server_payload_ignores_unknown_fields_and_never_carries_a_file() {
        let raw = r#"{
            "id": 7,
            "document_type": "salary_breakdown",
            "document_title": "Salary",
            "display_order": 2,
            "original_filename": "ctc.pdf",
            "file_url": "/uploads/ctc.pdf"
        }"#;
        let doc: Document = serde_json::from_str(raw).expect("decode");
        assert_eq!(doc.id, Some(DocumentId(7)));
        assert_eq!(doc.original_filename.as_deref(), Some("ctc.pdf"));
        assert!(!doc.has_new_file());
    }

    #[test]
    fn new_file_is_not_serialized() {
        let doc = Document::new(DocumentType::Other, "Misc", 1)
            .with_file(DocumentFile::new("misc.pdf", b"%PDF".to_vec()));
        let value = serde_json::to_value(&doc).expect("encode");
        assert!(value.get("new_file").is_none());
        assert!(value.get("id").is_none());
    }

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(
            DocumentFile::new("JD.PDF", Vec::new()).content_type,
            "application/pdf"
        );
        assert_eq!(
            DocumentFile::new("notes.bin", Vec::new()).content_type,
            "application/octet-stream"
        );
    }

    #[test]
    fn metadata_difference_covers_title_type_and_order() {
        let base = Document::new(DocumentType::JobDescription, "JD", 1).with_id(1);
        let mut retitled = base.clone();
        retitled.document_title = "JD v2".to_string();
        let mut retyped = base.clone();
        retyped.document_type = DocumentType::Other;
        let mut reordered = base.clone();
        reordered.display_order = 3;
        let mut renamed_file = base.clone();
        renamed_file.original_filename = Some("other.pdf".to_string());

        assert!(base.metadata_differs(&retitled));
        assert!(base.metadata_differs(&retyped));
        assert!(base.metadata_differs(&reordered));
        assert!(!base.metadata_differs(&renamed_file));
    }
}
