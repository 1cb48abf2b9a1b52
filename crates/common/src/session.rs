use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::entities::User;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredSession {
    pub api_base_url: String,
    pub token: String,
    pub user: User,
    pub logged_in_at_unix: u64,
}

pub fn read_selected_batch_year(cwd: &Path) -> Option<i32> {
    std::fs::read_to_string(selected_batch_file(cwd))
        .ok()
        .and_then(|s| s.trim().parse::<i32>().ok())
}

pub fn write_selected_batch_year(cwd: &Path, batch_year: i32) -> anyhow::Result<()> {
    let target = selected_batch_file(cwd);
    assert_state_write_target(cwd, &target)?;
    std::fs::create_dir_all(state_dir(cwd))?;
    std::fs::write(&target, batch_year.to_string())
        .with_context(|| format!("failed writing batch selection: {}", target.display()))?;
    Ok(())
}

pub fn clear_selected_batch_year(cwd: &Path) -> anyhow::Result<()> {
    let target = selected_batch_file(cwd);
    assert_state_write_target(cwd, &target)?;
    match std::fs::remove_file(&target) {
        Err(err) if err.kind() != std::io::ErrorKind::NotFound => Err(err.into()),
        _ => Ok(()),
    }
}

pub fn save_session(cwd: &Path, session: &StoredSession) -> anyhow::Result<()> {
    let target = session_file(cwd, &session.api_base_url);
    assert_state_write_target(cwd, &target)?;
    std::fs::create_dir_all(sessions_dir(cwd))?;
    std::fs::write(&target, serde_json::to_string_pretty(session)?)
        .with_context(|| format!("failed writing session file: {}", target.display()))?;
    Ok(())
}

pub fn load_session(cwd: &Path, api_base_url: &str) -> Option<StoredSession> {
    std::fs::read_to_string(session_file(cwd, api_base_url))
        .ok()
        .and_then(|raw| serde_json::from_str::<StoredSession>(&raw).ok())
        .filter(|session| session.api_base_url == api_base_url)
}

pub fn remove_session(cwd: &Path, api_base_url: &str) -> anyhow::Result<bool> {
    let target = session_file(cwd, api_base_url);
    assert_state_write_target(cwd, &target)?;
    match std::fs::remove_file(&target) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err.into()),
    }
}

fn session_key(api_base_url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_base_url.as_bytes());
    let full = format!("{:x}", hasher.finalize());
    full[..24].to_string()
}

pub fn state_dir(cwd: &Path) -> PathBuf {
    cwd.join(".placement")
}

fn sessions_dir(cwd: &Path) -> PathBuf {
    state_dir(cwd).join("sessions")
}

fn session_file(cwd: &Path, api_base_url: &str) -> PathBuf {
    sessions_dir(cwd).join(format!("{}.json", session_key(api_base_url)))
}

fn selected_batch_file(cwd: &Path) -> PathBuf {
    state_dir(cwd).join("selected-batch-year.txt")
}

fn assert_state_write_target(cwd: &Path, target: &Path) -> anyhow::Result<()> {
    let state_root = state_dir(cwd);
    if !target.starts_with(&state_root) {
        anyhow::bail!(
            "unsafe write target outside state directory: {}",
            target.display()
        );
    }
    Ok(())
}
