use crate::domain::model::{
    iso_timestamp, DefectReport, Installer, Job, PhotoMetadata, StatusUpdate,
};
use crate::domain::ports::JobBackend;
use crate::utils::error::{JobsError, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;

pub const JOBS_TABLE: &str = "jobs";
pub const STATUS_UPDATES_TABLE: &str = "job_status_updates";
pub const INSTALLERS_TABLE: &str = "installers";
pub const PHOTOS_TABLE: &str = "job_photos";
pub const DEFECT_REPORTS_TABLE: &str = "defect_reports";

/// Supabase (PostgREST) 資料來源
pub struct SupabaseBackend {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct StatusUpdatePayload<'a> {
    job_id: &'a str,
    status: &'a str,
    installer_key: &'a str,
    notes: &'a str,
    updated_at: String,
}

impl<'a> From<&'a StatusUpdate> for StatusUpdatePayload<'a> {
    fn from(update: &'a StatusUpdate) -> Self {
        Self {
            job_id: &update.job_id,
            status: &update.status,
            installer_key: &update.installer_key,
            notes: &update.notes,
            updated_at: iso_timestamp(&update.timestamp),
        }
    }
}

#[derive(Debug, Serialize)]
struct PhotoPayload<'a> {
    job_id: &'a str,
    installer_key: &'a str,
    file_name: &'a str,
    url: &'a str,
    caption: Option<&'a str>,
    taken_at: Option<&'a str>,
    created_at: String,
}

#[derive(Debug, Serialize)]
struct DefectPayload<'a> {
    job_id: &'a str,
    installer_key: &'a str,
    category: &'a str,
    severity: &'a str,
    description: &'a str,
    photo_urls: &'a [String],
    reported_at: String,
}

/// PostgREST 過濾語法 `<column>=eq.<value>`
fn eq_filter(value: &str) -> String {
    format!("eq.{}", value)
}

impl SupabaseBackend {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.api_key)
            .header("apikey", &self.api_key)
    }

    /// 非 2xx 一律視為失敗
    async fn ensure_success(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let endpoint = response.url().path().to_string();
        let body = response.text().await.unwrap_or_default();
        Err(JobsError::UpstreamStatusError {
            endpoint,
            status: status.as_u16(),
            body,
        })
    }

    async fn insert<T: Serialize + Sync>(&self, table: &str, payload: &T) -> Result<()> {
        let request = self.client.post(self.table_url(table)).json(payload);
        let response = self.authorized(request).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl JobBackend for SupabaseBackend {
    fn label(&self) -> &'static str {
        "Supabase"
    }

    async fn fetch_jobs(&self, installer_key: &str, crew_keys: &[String]) -> Result<Vec<Job>> {
        if !crew_keys.is_empty() {
            // 託管來源只依 installer_key 過濾，不處理 crew
            tracing::debug!("Ignoring {} crew keys for Supabase job query", crew_keys.len());
        }

        let request = self
            .client
            .get(self.table_url(JOBS_TABLE))
            .query(&[("select", "*".to_string()), ("installer_key", eq_filter(installer_key))]);
        let response = self.authorized(request).send().await?;
        let response = Self::ensure_success(response).await?;

        let jobs: Vec<Job> = response.json().await?;
        tracing::debug!("📋 Supabase returned {} jobs for {}", jobs.len(), installer_key);
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
        self.insert(STATUS_UPDATES_TABLE, &StatusUpdatePayload::from(&update)).await
    }

    async fn fetch_installer(&self, installer_key: &str) -> Result<Option<Installer>> {
        let request = self
            .client
            .get(self.table_url(INSTALLERS_TABLE))
            .query(&[("installer_key", eq_filter(installer_key)), ("limit", "1".to_string())]);
        let response = self.authorized(request).send().await?;
        let response = Self::ensure_success(response).await?;

        let installers: Vec<Installer> = response.json().await?;
        Ok(installers.into_iter().next())
    }

    async fn append_photo_metadata(
        &self,
        job_id: &str,
        photo: &PhotoMetadata,
        installer_key: &str,
    ) -> Result<()> {
        let payload = PhotoPayload {
            job_id,
            installer_key,
            file_name: &photo.file_name,
            url: &photo.url,
            caption: photo.caption.as_deref(),
            taken_at: photo.taken_at.as_deref(),
            created_at: iso_timestamp(&Utc::now()),
        };
        self.insert(PHOTOS_TABLE, &payload).await
    }

    async fn append_defect_report(
        &self,
        job_id: &str,
        defect: &DefectReport,
        installer_key: &str,
    ) -> Result<()> {
        let payload = DefectPayload {
            job_id,
            installer_key,
            category: &defect.category,
            severity: &defect.severity,
            description: &defect.description,
            photo_urls: &defect.photo_urls,
            reported_at: iso_timestamp(&Utc::now()),
        };
        self.insert(DEFECT_REPORTS_TABLE, &payload).await
    }
}
