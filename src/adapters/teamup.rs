use crate::domain::mapping::{self, CalendarEventsResponse};
use crate::domain::model::Job;
use crate::domain::ports::CacheStore;
use crate::utils::error::{JobsError, Result};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

pub const CALENDAR_CACHE_KEY: &str = "teamup_jobs";

/// TeamUp 行事曆事件，轉成工單格式並快取
pub struct TeamUpCalendar {
    client: Client,
    api_base: String,
    calendar_id: String,
    api_key: String,
    cache: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl TeamUpCalendar {
    pub fn new(
        api_base: &str,
        calendar_id: &str,
        api_key: &str,
        cache: Arc<dyn CacheStore>,
        ttl: Duration,
    ) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            calendar_id: calendar_id.to_string(),
            api_key: api_key.to_string(),
            cache,
            ttl,
        }
    }

    fn cached_jobs(&self) -> Option<Vec<Job>> {
        let raw = self.cache.get(CALENDAR_CACHE_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(jobs) => Some(jobs),
            Err(e) => {
                tracing::warn!("Discarding unreadable calendar cache entry: {}", e);
                None
            }
        }
    }

    async fn fetch_events(&self) -> Result<Vec<Job>> {
        let url = format!("{}/{}/events", self.api_base, self.calendar_id);
        tracing::debug!("📅 Fetching TeamUp events from {}", url);

        let response = self
            .client
            .get(&url)
            .header("Teamup-Token", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JobsError::UpstreamStatusError {
                endpoint: url,
                status: status.as_u16(),
                body,
            });
        }

        let payload: CalendarEventsResponse = response.json().await?;
        Ok(payload.events.iter().map(mapping::calendar_event_to_job).collect())
    }

    /// 快取未命中時才呼叫 TeamUp；上游失敗回傳錯誤且不寫入快取
    pub async fn try_get_jobs(&self) -> Result<Vec<Job>> {
        if let Some(jobs) = self.cached_jobs() {
            tracing::debug!("📅 Calendar cache hit ({} jobs)", jobs.len());
            return Ok(jobs);
        }

        let jobs = self.fetch_events().await?;
        let serialized = serde_json::to_string(&jobs)?;
        self.cache.put(CALENDAR_CACHE_KEY, serialized, self.ttl);

        tracing::info!(
            "📅 Cached {} calendar jobs for {}s",
            jobs.len(),
            self.ttl.as_secs()
        );
        Ok(jobs)
    }

    pub async fn get_jobs_from_calendar(&self) -> Vec<Job> {
        match self.try_get_jobs().await {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::error!("Error getting jobs from TeamUp: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::MemoryCache;
    use httpmock::prelude::*;

    fn calendar(server: &MockServer, cache: Arc<MemoryCache>, ttl: Duration) -> TeamUpCalendar {
        TeamUpCalendar::new(&server.base_url(), "ks-cal", "teamup-key", cache, ttl)
    }

    #[tokio::test]
    async fn test_cache_hit_skips_upstream() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/ks-cal/events")
                .header("Teamup-Token", "teamup-key");
            then.status(200).json_body(serde_json::json!({
                "events": [
                    {"id": "1", "title": "Installation - Jane Doe", "start_dt": "2024-05-01T09:00:00"},
                    {"id": "2", "title": "NoHyphenTitle", "who": [{"name": "Tech B"}]}
                ]
            }));
        });

        let cache = Arc::new(MemoryCache::new());
        let feed = calendar(&server, cache.clone(), Duration::from_secs(300));

        let first = feed.get_jobs_from_calendar().await;
        let second = feed.get_jobs_from_calendar().await;

        api_mock.assert_hits(1);
        assert_eq!(first, second);
        assert_eq!(first[0].customer_name, "Jane Doe");
        assert_eq!(first[1].customer_name, "NoHyphenTitle");
        assert!(cache.get(CALENDAR_CACHE_KEY).is_some());
    }

    #[tokio::test]
    async fn test_expired_entry_refetches() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/ks-cal/events");
            then.status(200).json_body(serde_json::json!({ "events": [] }));
        });

        let feed = calendar(&server, Arc::new(MemoryCache::new()), Duration::ZERO);
        feed.get_jobs_from_calendar().await;
        feed.get_jobs_from_calendar().await;

        api_mock.assert_hits(2);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_not_cached() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/ks-cal/events");
            then.status(503);
        });

        let cache = Arc::new(MemoryCache::new());
        let feed = calendar(&server, cache.clone(), Duration::from_secs(300));

        assert!(feed.get_jobs_from_calendar().await.is_empty());
        assert!(feed.try_get_jobs().await.is_err());
        api_mock.assert_hits(2);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_cache_entry_is_refetched() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/ks-cal/events");
            then.status(200).json_body(serde_json::json!({
                "events": [{"id": 7, "title": "Service - Bob"}]
            }));
        });

        let cache = Arc::new(MemoryCache::new());
        cache.put(CALENDAR_CACHE_KEY, "not json".to_string(), Duration::from_secs(300));
        let feed = calendar(&server, cache, Duration::from_secs(300));

        let jobs = feed.get_jobs_from_calendar().await;

        api_mock.assert_hits(1);
        assert_eq!(jobs[0].id, "7");
        assert_eq!(jobs[0].customer_name, "Bob");
    }
}
