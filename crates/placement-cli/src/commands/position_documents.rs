use std::path::{Path, PathBuf};

use anyhow::Context;
use common::Document;
use documents::{detect_document_changes, load_manifest, plan_edit_operations};
use placement_client::{DocumentSyncer, PositionDocuments, SessionContext, SubmissionReport};
use tracing::debug;

use crate::resolve_batch_year;

pub fn plan(existing: &Path, local: &Path) -> anyhow::Result<()> {
    let existing = read_document_list(existing)?;
    let local = if local.extension().is_some_and(|ext| ext == "toml") {
        load_manifest(local)?
    } else {
        read_document_list(local)?
    };
    let changes = detect_document_changes(&existing, &local);
    let plan = plan_edit_operations(&changes);
    let output = serde_json::json!({
        "changes": changes,
        "operations": plan.operations,
        "skipped_without_file": plan.skipped_without_file,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub async fn sync(
    ctx: &SessionContext,
    positions: &[(i64, PathBuf)],
    batch: Option<i32>,
) -> anyhow::Result<()> {
    let positions = load_positions(positions)?;
    let client = ctx.client()?;
    let batch_year = resolve_batch_year(ctx, &client, batch).await?;
    debug!(batch_year, positions = positions.len(), "syncing position documents");
    let syncer = DocumentSyncer::new(client);
    let submission = syncer
        .sync_positions(batch_year, &positions)
        .await
        .context("document sync failed")?;
    print_report(&syncer, &submission)
}

pub async fn upload(
    ctx: &SessionContext,
    positions: &[(i64, PathBuf)],
    batch: Option<i32>,
) -> anyhow::Result<()> {
    let positions = load_positions(positions)?;
    let client = ctx.client()?;
    let batch_year = resolve_batch_year(ctx, &client, batch).await?;
    debug!(batch_year, positions = positions.len(), "uploading position documents");
    let syncer = DocumentSyncer::new(client);
    let submission = syncer
        .upload_positions(batch_year, &positions)
        .await
        .context("document upload failed")?;
    print_report(&syncer, &submission)
}

/// Every manifest is read before the first request goes out.
fn load_positions(positions: &[(i64, PathBuf)]) -> anyhow::Result<Vec<PositionDocuments>> {
    positions
        .iter()
        .map(|(position_id, manifest)| {
            let documents = load_manifest(manifest)
                .with_context(|| format!("invalid manifest for position {position_id}"))?;
            Ok(PositionDocuments {
                position_id: *position_id,
                documents,
            })
        })
        .collect()
}

fn print_report(syncer: &DocumentSyncer, submission: &SubmissionReport) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "positions": submission.positions,
        "telemetry": syncer.telemetry().snapshot(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    if !submission.is_clean() {
        eprintln!(
            "{} document operation(s) failed; rerun sync to retry",
            submission.failed_operations()
        );
    }
    Ok(())
}

fn read_document_list(path: &Path) -> anyhow::Result<Vec<Document>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed reading documents: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed parsing documents: {}", path.display()))
}
