pub mod client;
pub mod context;
pub mod error;
pub mod position_documents;
pub mod sync;
pub mod telemetry;

pub use client::ApiClient;
pub use context::{RosterContext, SessionContext};
pub use error::ApiError;
pub use sync::{
    DocumentSyncer, FailedKind, FailedOperation, PositionDocuments, PositionSyncReport,
    SubmissionReport,
};
pub use telemetry::{SyncTelemetry, SyncTelemetrySnapshot};
