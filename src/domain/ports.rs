use crate::domain::model::{DefectReport, Installer, Job, PhotoMetadata, SaveResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// 資料來源的共同介面。
///
/// `fetch_*` / `append_*` 是會失敗的底層呼叫：`Ok(None)` 表示查無資料，
/// `Err` 表示上游失敗。提供的預設方法（`get_jobs` 等）在介面邊界把錯誤
/// 記錄下來並轉成空結果，呼叫端永遠拿到值而不是錯誤。
#[async_trait]
pub trait JobBackend: Send + Sync {
    /// 顯示用名稱，會出現在成功訊息中
    fn label(&self) -> &'static str;

    async fn fetch_jobs(&self, installer_key: &str, crew_keys: &[String]) -> Result<Vec<Job>>;

    async fn append_job_status(
        &self,
        job_id: &str,
        status: &str,
        installer_key: &str,
        notes: &str,
    ) -> Result<()>;

    async fn fetch_installer(&self, installer_key: &str) -> Result<Option<Installer>>;

    async fn append_photo_metadata(
        &self,
        job_id: &str,
        photo: &PhotoMetadata,
        installer_key: &str,
    ) -> Result<()>;

    async fn append_defect_report(
        &self,
        job_id: &str,
        defect: &DefectReport,
        installer_key: &str,
    ) -> Result<()>;

    async fn get_jobs(&self, installer_key: &str, crew_keys: &[String]) -> Vec<Job> {
        match self.fetch_jobs(installer_key, crew_keys).await {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::error!("Error getting jobs from {}: {}", self.label(), e);
                Vec::new()
            }
        }
    }

    async fn save_job_status(
        &self,
        job_id: &str,
        status: &str,
        installer_key: &str,
        notes: &str,
    ) -> SaveResult {
        match self.append_job_status(job_id, status, installer_key, notes).await {
            Ok(()) => SaveResult::ok(format!("Status saved to {}", self.label())),
            Err(e) => {
                tracing::error!("Error saving status to {}: {}", self.label(), e);
                SaveResult::failed(e.to_string())
            }
        }
    }

    async fn get_installer_info(&self, installer_key: &str) -> Option<Installer> {
        match self.fetch_installer(installer_key).await {
            Ok(installer) => installer,
            Err(e) => {
                tracing::error!("Error getting installer info from {}: {}", self.label(), e);
                None
            }
        }
    }

    async fn save_photo_metadata(
        &self,
        job_id: &str,
        photo: &PhotoMetadata,
        installer_key: &str,
    ) -> SaveResult {
        match self.append_photo_metadata(job_id, photo, installer_key).await {
            Ok(()) => SaveResult::ok(format!("Photo metadata saved to {}", self.label())),
            Err(e) => {
                tracing::error!("Error saving photo metadata to {}: {}", self.label(), e);
                SaveResult::failed(e.to_string())
            }
        }
    }

    async fn save_defect_report(
        &self,
        job_id: &str,
        defect: &DefectReport,
        installer_key: &str,
    ) -> SaveResult {
        match self.append_defect_report(job_id, defect, installer_key).await {
            Ok(()) => SaveResult::ok(format!("Defect report saved to {}", self.label())),
            Err(e) => {
                tracing::error!("Error saving defect report to {}: {}", self.label(), e);
                SaveResult::failed(e.to_string())
            }
        }
    }
}

/// 以工作表名稱存取的表格儲存（Google Sheets 或本機 CSV 工作簿）
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// 回傳整張表，包含標題列
    async fn read_rows(&self, sheet: &str) -> Result<Vec<Vec<String>>>;

    async fn append_row(&self, sheet: &str, row: Vec<String>) -> Result<()>;
}

/// 具有到期時間的 key-value 快取
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn put(&self, key: &str, value: String, ttl: Duration);
}
