use crate::domain::mapping;
use crate::domain::model::{DefectReport, Installer, Job, PhotoMetadata, StatusUpdate};
use crate::domain::ports::{JobBackend, SheetStore};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

pub const JOBS_SHEET: &str = "Jobs";
pub const STATUS_UPDATES_SHEET: &str = "JobStatusUpdates";
pub const INSTALLERS_SHEET: &str = "Installers";
pub const PHOTO_METADATA_SHEET: &str = "PhotoMetadata";
pub const DEFECT_REPORTS_SHEET: &str = "DefectReports";

/// 以試算表為資料來源，第一列為標題列
pub struct GoogleSheetsBackend {
    store: Arc<dyn SheetStore>,
}

impl GoogleSheetsBackend {
    pub fn new(store: Arc<dyn SheetStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl JobBackend for GoogleSheetsBackend {
    fn label(&self) -> &'static str {
        "Google Sheets"
    }

    async fn fetch_jobs(&self, installer_key: &str, crew_keys: &[String]) -> Result<Vec<Job>> {
        let rows = self.store.read_rows(JOBS_SHEET).await?;

        let jobs: Vec<Job> = rows
            .iter()
            .skip(1)
            .filter(|row| mapping::should_show_job_to_installer(row, installer_key, crew_keys))
            .map(|row| mapping::row_to_job(row))
            .collect();

        tracing::debug!(
            "📋 {} of {} job rows visible to {} (crew: {:?})",
            jobs.len(),
            rows.len().saturating_sub(1),
            installer_key,
            crew_keys
        );
        Ok(jobs)
    }

    async fn append_job_status(
        &self,
        job_id: &str,
        status: &str,
        installer_key: &str,
        notes: &str,
    ) -> Result<()> {
        let update = StatusUpdate::new(job_id, status, installer_key, notes);
        self.store
            .append_row(STATUS_UPDATES_SHEET, mapping::status_update_to_row(&update))
            .await
    }

    async fn fetch_installer(&self, installer_key: &str) -> Result<Option<Installer>> {
        let rows = self.store.read_rows(INSTALLERS_SHEET).await?;

        Ok(rows
            .iter()
            .skip(1)
            .find(|row| row.first().map(String::as_str) == Some(installer_key))
            .map(|row| mapping::row_to_installer(row)))
    }

    async fn append_photo_metadata(
        &self,
        job_id: &str,
        photo: &PhotoMetadata,
        installer_key: &str,
    ) -> Result<()> {
        let row = mapping::photo_to_row(&Utc::now(), job_id, installer_key, photo);
        self.store.append_row(PHOTO_METADATA_SHEET, row).await
    }

    async fn append_defect_report(
        &self,
        job_id: &str,
        defect: &DefectReport,
        installer_key: &str,
    ) -> Result<()> {
        let row = mapping::defect_to_row(&Utc::now(), job_id, installer_key, defect);
        self.store.append_row(DEFECT_REPORTS_SHEET, row).await
    }
}
