pub mod manifest;
pub mod plan;
pub mod reconcile;

pub use manifest::{ManifestError, load_manifest, parse_manifest};
pub use plan::{DocumentOperation, SyncPlan, plan_create_operations, plan_edit_operations};
pub use reconcile::{detect_document_changes, first_duplicate_id};
