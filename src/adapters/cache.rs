use crate::domain::ports::CacheStore;
use chrono::{DateTime, Utc};
use moka::sync::Cache;
use moka::Expiry;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const MEMORY_CACHE_CAPACITY: u64 = 1_000;

#[derive(Debug, Clone)]
struct TimedValue {
    value: String,
    ttl: Duration,
}

/// 每筆項目各自帶 TTL，覆寫時重新計時
struct PerEntryTtl;

impl Expiry<String, TimedValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &TimedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &TimedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// 行程內快取（moka），適合長時間執行的服務與測試
pub struct MemoryCache {
    entries: Cache<String, TimedValue>,
}

impl MemoryCache {
    pub fn new() -> Self {
        let entries = Cache::builder()
            .max_capacity(MEMORY_CACHE_CAPACITY)
            .expire_after(PerEntryTtl)
            .build();
        Self { entries }
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.iter().next().is_none()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value)
    }

    fn put(&self, key: &str, value: String, ttl: Duration) {
        self.entries.insert(key.to_string(), TimedValue { value, ttl });
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FileEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

/// 以檔案保存的快取，一個 key 一個 `<dir>/<key>.json`，
/// CLI 每次執行都是新行程，靠它跨次保留 TTL 內的結果
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let file_stem: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file_stem))
    }

    fn write_entry(&self, path: &Path, entry: &FileEntry) -> crate::utils::error::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(path, serde_json::to_vec(entry)?)?;
        Ok(())
    }
}

impl CacheStore for FileCache {
    fn get(&self, key: &str) -> Option<String> {
        let path = self.entry_path(key);
        let raw = std::fs::read_to_string(&path).ok()?;
        let entry: FileEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Ignoring unreadable cache file {}: {}", path.display(), e);
                return None;
            }
        };

        if Utc::now() < entry.expires_at {
            return Some(entry.value);
        }
        if let Err(e) = std::fs::remove_file(&path) {
            tracing::debug!("Could not remove expired cache file {}: {}", path.display(), e);
        }
        None
    }

    fn put(&self, key: &str, value: String, ttl: Duration) {
        let ttl = match chrono::Duration::from_std(ttl) {
            Ok(ttl) => ttl,
            Err(e) => {
                tracing::warn!("Cache TTL out of range for '{}': {}", key, e);
                return;
            }
        };
        let entry = FileEntry {
            value,
            expires_at: Utc::now() + ttl,
        };
        let path = self.entry_path(key);
        if let Err(e) = self.write_entry(&path, &entry) {
            tracing::warn!("⚠️ Failed to write cache file {}: {}", path.display(), e);
        }
    }
}
