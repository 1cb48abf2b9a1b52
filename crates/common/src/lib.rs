pub mod config;
pub mod document;
pub mod entities;
pub mod session;

pub use config::{AppConfig, LogFormat};
pub use document::{
    Document, DocumentChangeSet, DocumentFile, DocumentId, DocumentMetadata, DocumentType,
};
pub use entities::{
    Batch, Company, JobType, LoginRequest, LoginResponse, NewBatch, Offer, OfferStatus,
    PlacementStatus, Position, Student, StudentInput, User,
};

use schemars::Schema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaBundle {
    pub document: Schema,
    pub document_metadata: Schema,
    pub document_change_set: Schema,
}

pub fn schema_bundle() -> SchemaBundle {
    SchemaBundle {
        document: schemars::schema_for!(Document),
        document_metadata: schemars::schema_for!(DocumentMetadata),
        document_change_set: schemars::schema_for!(DocumentChangeSet),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_bundle_generates() {
        let schemas = schema_bundle();
        let document = serde_json::to_string(&schemas.document).expect("serialize schema");
        assert!(document.contains("document_title"));
        assert!(!document.contains("new_file"));
    }

    #[test]
    fn change_set_defaults_to_noop() {
        assert!(DocumentChangeSet::default().is_noop());
    }
}
