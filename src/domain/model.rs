use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// 工單。表格來源以欄位位置映射，託管來源直接以 JSON 反序列化
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Job {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub customer_name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub job_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(deserialize_with = "null_as_default")]
    pub priority: String,
    pub due_date: Option<String>,
    pub technician: Option<String>,
    pub notes: Option<String>,
    #[serde(deserialize_with = "list_or_csv")]
    pub materials: Vec<String>,
    pub access_notes: Option<String>,
    /// 託管資料表中未對應到上面欄位的其他欄位（例如 installer_key）原樣保留
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Installer {
    #[serde(alias = "installer_key", deserialize_with = "null_as_default")]
    pub installer_key: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    pub email: Option<String>,
    #[serde(alias = "crew_keys", deserialize_with = "list_or_csv")]
    pub crew_keys: Vec<String>,
}

/// 狀態異動紀錄，只追加不修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub timestamp: DateTime<Utc>,
    pub job_id: String,
    pub status: String,
    pub installer_key: String,
    pub notes: String,
}

impl StatusUpdate {
    pub fn new(job_id: &str, status: &str, installer_key: &str, notes: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            job_id: job_id.to_string(),
            status: status.to_string(),
            installer_key: installer_key.to_string(),
            notes: notes.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhotoMetadata {
    pub file_name: String,
    pub url: String,
    pub caption: Option<String>,
    pub taken_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DefectReport {
    pub category: String,
    pub severity: String,
    pub description: String,
    pub photo_urls: Vec<String>,
}

/// 寫入類操作的回傳值，失敗時 message 為錯誤訊息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResult {
    pub success: bool,
    pub message: String,
}

impl SaveResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// ISO-8601 UTC with milliseconds, e.g. `2024-05-01T08:30:00.000Z`
pub fn iso_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// PostgREST 對可為空的欄位回傳 `null`，視同未填
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn list_or_csv<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        serde_json::Value::String(s) if !s.is_empty() => {
            s.split(',').map(str::to_string).collect()
        }
        _ => Vec::new(),
    })
}
