use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct SyncTelemetry {
    positions_synced: AtomicU64,
    documents_deleted: AtomicU64,
    documents_created: AtomicU64,
    documents_updated: AtomicU64,
    operations_failed: AtomicU64,
}

impl SyncTelemetry {
    pub fn inc_positions_synced(&self) {
        self.positions_synced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_documents_deleted(&self) {
        self.documents_deleted.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("documents_deleted_total").increment(1);
    }

    pub fn inc_documents_created(&self, count: u64) {
        self.documents_created.fetch_add(count, Ordering::Relaxed);
        metrics::counter!("documents_created_total").increment(count);
    }

    pub fn inc_documents_updated(&self) {
        self.documents_updated.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("documents_updated_total").increment(1);
    }

    pub fn inc_operations_failed(&self) {
        self.operations_failed.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("document_ops_failed_total").increment(1);
    }

    pub fn snapshot(&self) -> SyncTelemetrySnapshot {
        SyncTelemetrySnapshot {
            positions_synced: self.positions_synced.load(Ordering::Relaxed),
            documents_deleted: self.documents_deleted.load(Ordering::Relaxed),
            documents_created: self.documents_created.load(Ordering::Relaxed),
            documents_updated: self.documents_updated.load(Ordering::Relaxed),
            operations_failed: self.operations_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncTelemetrySnapshot {
    pub positions_synced: u64,
    pub documents_deleted: u64,
    pub documents_created: u64,
    pub documents_updated: u64,
    pub operations_failed: u64,
}

#[cfg(test)]
mod tests {
    use super::SyncTelemetry;

    #[test]
    fn snapshot_reflects_updates() {
        let telemetry = SyncTelemetry::default();
        telemetry.inc_positions_synced();
        telemetry.inc_documents_deleted();
        telemetry.inc_documents_created(3);
        telemetry.inc_documents_updated();
        telemetry.inc_operations_failed();

        let s = telemetry.snapshot();
        assert_eq!(s.positions_synced, 1);
        assert_eq!(s.documents_deleted, 1);
        assert_eq!(s.documents_created, 3);
        assert_eq!(s.documents_updated, 1);
        assert_eq!(s.operations_failed, 1);
    }
}
