use std::{
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::Context;
use common::{
    AppConfig, Batch, Student, StudentInput,
    session::{self, StoredSession},
};
use roster::{
    ExportColumn, ExportError, RosterStats, SortDirection, SortKey, StudentFilter, export_csv,
    roster_stats, sort_students,
};
use tracing::info;

use crate::{client::ApiClient, error::ApiError};

/// Signed-in user and batch selection for one working directory. Passed
/// explicitly to whatever needs it.
#[derive(Debug, Clone)]
pub struct SessionContext {
    config: AppConfig,
    cwd: PathBuf,
    session: Option<StoredSession>,
    selected_batch_year: Option<i32>,
}

impl SessionContext {
    pub fn load(config: AppConfig, cwd: impl Into<PathBuf>) -> Self {
        let cwd = cwd.into();
        let session = session::load_session(&cwd, &config.api_base_url);
        let selected_batch_year = session::read_selected_batch_year(&cwd);
        Self {
            config,
            cwd,
            session,
            selected_batch_year,
        }
    }

    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub const fn session(&self) -> Option<&StoredSession> {
        self.session.as_ref()
    }

    /// Stored session token, else the configured one.
    pub fn token(&self) -> Option<&str> {
        self.session
            .as_ref()
            .map(|s| s.token.as_str())
            .or(self.config.api_token.as_deref())
    }

    pub fn require_session(&self) -> Result<&StoredSession, ApiError> {
        self.session.as_ref().ok_or(ApiError::Unauthenticated)
    }

    pub fn client(&self) -> Result<ApiClient, ApiError> {
        let mut client = ApiClient::from_config(&self.config)?;
        client.set_token(self.token().map(str::to_string));
        Ok(client)
    }

    pub async fn login(&mut self, email: &str, password: &str) -> anyhow::Result<&StoredSession> {
        let client = ApiClient::from_config(&self.config)?;
        let response = client
            .login(email.trim(), password)
            .await
            .context("login failed")?;
        let stored = StoredSession {
            api_base_url: self.config.api_base_url.clone(),
            token: response.token,
            user: response.user,
            logged_in_at_unix: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default(),
        };
        session::save_session(&self.cwd, &stored).context("failed persisting session")?;
        info!(user = %stored.user.email, "signed in");
        Ok(self.session.insert(stored))
    }

    /// Returns whether a session was stored.
    pub fn logout(&mut self) -> anyhow::Result<bool> {
        self.session = None;
        session::remove_session(&self.cwd, &self.config.api_base_url)
            .context("failed removing session")
    }

    pub const fn selected_batch_year(&self) -> Option<i32> {
        self.selected_batch_year
    }

    pub fn select_batch(&mut self, batch_year: i32) -> anyhow::Result<()> {
        session::write_selected_batch_year(&self.cwd, batch_year)?;
        self.selected_batch_year = Some(batch_year);
        Ok(())
    }

    pub fn clear_batch(&mut self) -> anyhow::Result<()> {
        session::clear_selected_batch_year(&self.cwd)?;
        self.selected_batch_year = None;
        Ok(())
    }

    /// Persisted year if still offered, else the latest offered year.
    pub fn resolve_batch(&self, batches: &[Batch]) -> Option<i32> {
        if let Some(year) = self.selected_batch_year
            && batches.iter().any(|b| b.batch_year == year)
        {
            return Some(year);
        }
        batches.iter().map(|b| b.batch_year).max()
    }
}

/// Students of one batch year, kept in step with CRUD calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterContext {
    batch_year: i32,
    students: Vec<Student>,
}

impl RosterContext {
    pub const fn new(batch_year: i32, students: Vec<Student>) -> Self {
        Self {
            batch_year,
            students,
        }
    }

    pub async fn load(client: &ApiClient, batch_year: i32) -> Result<Self, ApiError> {
        let students = client.list_students(batch_year).await?;
        info!(batch_year, count = students.len(), "roster loaded");
        Ok(Self::new(batch_year, students))
    }

    pub const fn batch_year(&self) -> i32 {
        self.batch_year
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn upsert(&mut self, student: Student) {
        match self.students.iter_mut().find(|s| s.id == student.id) {
            Some(slot) => *slot = student,
            None => self.students.push(student),
        }
    }

    pub fn remove(&mut self, id: i64) -> Option<Student> {
        let idx = self.students.iter().position(|s| s.id == id)?;
        Some(self.students.remove(idx))
    }

    pub async fn create_student(
        &mut self,
        client: &ApiClient,
        input: &StudentInput,
    ) -> Result<Student, ApiError> {
        let created = client.create_student(input).await?;
        self.upsert(created.clone());
        Ok(created)
    }

    pub async fn update_student(
        &mut self,
        client: &ApiClient,
        id: i64,
        input: &StudentInput,
    ) -> Result<(), ApiError> {
        let updated = client.update_student(id, input).await?;
        self.upsert(updated);
        Ok(())
    }

    pub async fn delete_student(&mut self, client: &ApiClient, id: i64) -> Result<(), ApiError> {
        client.delete_student(id).await?;
        self.remove(id);
        Ok(())
    }

    pub fn view(&self, filter: &StudentFilter, key: SortKey, direction: SortDirection) -> Vec<&Student> {
        let mut rows = filter.apply(self.students.as_slice());
        sort_students(&mut rows, key, direction);
        rows
    }

    pub fn stats(&self, filter: &StudentFilter) -> RosterStats {
        roster_stats(&filter.apply(self.students.as_slice()))
    }

    pub fn export_csv(
        &self,
        filter: &StudentFilter,
        key: SortKey,
        direction: SortDirection,
        columns: &[ExportColumn],
    ) -> Result<String, ExportError> {
        export_csv(&self.view(filter, key, direction), columns)
    }
}

#[cfg(test)]
mod tests {
    use common::{AppConfig, Batch, PlacementStatus, Student, User, session};
    use roster::{ExportColumn, SortDirection, SortKey, StudentFilter};

    use super::{RosterContext, SessionContext};
    use crate::error::ApiError;

    fn batch(year: i32) -> Batch {
        Batch {
            id: i64::from(year),
            batch_year: year,
            name: None,
            is_active: true,
        }
    }

    fn student(id: i64, name: &str, cgpa: f64, status: PlacementStatus) -> Student {
        Student {
            id,
            name: name.to_string(),
            roll_number: format!("21CS{id:03}"),
            email: format!("s{id}@example.edu"),
            phone: None,
            department: "CSE".to_string(),
            cgpa,
            batch_year: 2025,
            placement_status: status,
            company_name: None,
            package_lpa: None,
        }
    }

    #[test]
    fn resolve_batch_prefers_persisted_then_latest() {
        let cwd = tempfile::tempdir().expect("tempdir");
        let mut ctx = SessionContext::load(AppConfig::default(), cwd.path());
        let offered = [batch(2024), batch(2026), batch(2025)];
        assert_eq!(ctx.resolve_batch(&offered), Some(2026));
        assert_eq!(ctx.resolve_batch(&[]), None);

        ctx.select_batch(2024).expect("select");
        assert_eq!(ctx.resolve_batch(&offered), Some(2024));
        assert_eq!(ctx.resolve_batch(&[batch(2027)]), Some(2027));

        let reloaded = SessionContext::load(AppConfig::default(), cwd.path());
        assert_eq!(reloaded.selected_batch_year(), Some(2024));
    }

    #[test]
    fn session_is_required_until_stored() {
        let cwd = tempfile::tempdir().expect("tempdir");
        let config = AppConfig::default();
        let ctx = SessionContext::load(config.clone(), cwd.path());
        assert!(matches!(ctx.require_session(), Err(ApiError::Unauthenticated)));
        assert_eq!(ctx.token(), None);

        session::save_session(
            cwd.path(),
            &session::StoredSession {
                api_base_url: config.api_base_url.clone(),
                token: "tok".to_string(),
                user: User {
                    id: 1,
                    name: "Admin".to_string(),
                    email: "admin@example.edu".to_string(),
                    role: None,
                },
                logged_in_at_unix: 0,
            },
        )
        .expect("save");

        let mut ctx = SessionContext::load(config, cwd.path());
        assert_eq!(ctx.require_session().expect("session").token, "tok");
        assert_eq!(ctx.client().expect("client").token(), Some("tok"));

        assert!(ctx.logout().expect("logout"));
        assert!(ctx.session().is_none());
        assert!(!ctx.logout().expect("second logout"));
    }

    #[test]
    fn roster_upsert_and_remove_track_crud() {
        let mut roster = RosterContext::new(
            2025,
            vec![
                student(1, "Asha", 8.0, PlacementStatus::Placed),
                student(2, "Vikram", 7.0, PlacementStatus::Unplaced),
            ],
        );
        roster.upsert(student(2, "Vikram", 7.5, PlacementStatus::Placed));
        roster.upsert(student(3, "Meera", 9.1, PlacementStatus::Unplaced));
        assert_eq!(roster.students().len(), 3);
        assert_eq!(roster.students()[1].placement_status, PlacementStatus::Placed);

        assert_eq!(roster.remove(1).map(|s| s.name), Some("Asha".to_string()));
        assert!(roster.remove(1).is_none());

        let stats = roster.stats(&StudentFilter::default());
        assert_eq!(stats.total, 2);
        assert_eq!(stats.placed, 1);

        let names = roster
            .view(&StudentFilter::default(), SortKey::Cgpa, SortDirection::Descending)
            .into_iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Meera", "Vikram"]);

        let csv = roster
            .export_csv(
                &StudentFilter::default(),
                SortKey::Name,
                SortDirection::Ascending,
                &[ExportColumn::Name, ExportColumn::Cgpa],
            )
            .expect("csv");
        assert_eq!(csv, "Name,CGPA\nMeera,9.10\nVikram,7.50\n");
    }
}
