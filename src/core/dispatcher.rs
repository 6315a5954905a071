use crate::adapters::{CsvWorkbook, GoogleSheetsBackend, SheetsApiStore, SupabaseBackend};
use crate::config::{AppConfig, BackendKind};
use crate::domain::model::{DefectReport, Installer, Job, PhotoMetadata, SaveResult};
use crate::domain::ports::{JobBackend, SheetStore};
use std::sync::Arc;

/// 對外的五個操作，原樣轉交給啟動時選定的資料來源
pub struct JobDispatcher {
    backend: Box<dyn JobBackend>,
}

impl JobDispatcher {
    pub fn new(backend: Box<dyn JobBackend>) -> Self {
        Self { backend }
    }

    /// 依配置建立資料來源
    pub fn from_config(config: &AppConfig) -> Self {
        let backend: Box<dyn JobBackend> = match config.backend() {
            BackendKind::Supabase => Box::new(SupabaseBackend::new(
                &config.supabase.url,
                &config.supabase.key,
            )),
            BackendKind::Google => Box::new(GoogleSheetsBackend::new(sheet_store(config))),
        };
        tracing::info!("🔌 Using {} data source", backend.label());
        Self::new(backend)
    }

    pub fn backend(&self) -> &dyn JobBackend {
        self.backend.as_ref()
    }

    pub async fn get_jobs(&self, installer_key: &str, crew_keys: &[String]) -> Vec<Job> {
        self.backend.get_jobs(installer_key, crew_keys).await
    }

    pub async fn save_job_status(
        &self,
        job_id: &str,
        status: &str,
        installer_key: &str,
        notes: &str,
    ) -> SaveResult {
        self.backend
            .save_job_status(job_id, status, installer_key, notes)
            .await
    }

    pub async fn get_installer_info(&self, installer_key: &str) -> Option<Installer> {
        self.backend.get_installer_info(installer_key).await
    }

    pub async fn save_photo_metadata(
        &self,
        job_id: &str,
        photo: &PhotoMetadata,
        installer_key: &str,
    ) -> SaveResult {
        self.backend
            .save_photo_metadata(job_id, photo, installer_key)
            .await
    }

    pub async fn save_defect_report(
        &self,
        job_id: &str,
        defect: &DefectReport,
        installer_key: &str,
    ) -> SaveResult {
        self.backend
            .save_defect_report(job_id, defect, installer_key)
            .await
    }
}

/// 有設定 workbook_dir 時使用本機 CSV，否則走 Sheets API
fn sheet_store(config: &AppConfig) -> Arc<dyn SheetStore> {
    match &config.google.workbook_dir {
        Some(dir) => Arc::new(CsvWorkbook::new(dir.as_str())),
        None => Arc::new(SheetsApiStore::new(
            &config.google.api_base,
            &config.google.spreadsheet_id,
            config.google.access_token.as_deref().unwrap_or_default(),
        )),
    }
}
