use crate::domain::model::{iso_timestamp, DefectReport, Installer, Job, PhotoMetadata, StatusUpdate};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// 工單表中用來判斷指派對象的欄位。
/// 與 due date 同為第 8 欄；實際試算表版面未確認前維持原樣。
pub const ASSIGNMENT_COLUMN: usize = 8;

pub const CALENDAR_JOB_TYPE: &str = "Installation";
pub const CALENDAR_PRIORITY: &str = "Medium";
pub const DEFAULT_CALENDAR_STATUS: &str = "Scheduled";
pub const UNASSIGNED_TECHNICIAN: &str = "Unassigned";

fn cell(row: &[String], index: usize) -> String {
    row.get(index).cloned().unwrap_or_default()
}

fn optional_cell(row: &[String], index: usize) -> Option<String> {
    row.get(index).cloned()
}

/// 空白儲存格視為空清單，否則以逗號切分（不做 trim）
fn split_list(value: Option<&String>) -> Vec<String> {
    match value {
        Some(v) if !v.is_empty() => v.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

/// Sheets API 會省略列尾空白儲存格；缺少指派欄的列不屬於任何人
pub fn should_show_job_to_installer(row: &[String], installer_key: &str, crew_keys: &[String]) -> bool {
    match row.get(ASSIGNMENT_COLUMN) {
        Some(job_installer) => {
            job_installer == installer_key || crew_keys.iter().any(|k| k == job_installer)
        }
        None => false,
    }
}

pub fn row_to_job(row: &[String]) -> Job {
    Job {
        id: cell(row, 0),
        customer_name: cell(row, 1),
        address: optional_cell(row, 2),
        phone: optional_cell(row, 3),
        email: optional_cell(row, 4),
        job_type: cell(row, 5),
        status: cell(row, 6),
        priority: cell(row, 7),
        due_date: optional_cell(row, 8),
        technician: optional_cell(row, 9),
        notes: optional_cell(row, 10),
        materials: split_list(row.get(11)),
        access_notes: optional_cell(row, 12),
        extra: Default::default(),
    }
}

pub fn row_to_installer(row: &[String]) -> Installer {
    Installer {
        installer_key: cell(row, 0),
        name: cell(row, 1),
        email: optional_cell(row, 2),
        crew_keys: split_list(row.get(3)),
    }
}

pub fn status_update_to_row(update: &StatusUpdate) -> Vec<String> {
    vec![
        iso_timestamp(&update.timestamp),
        update.job_id.clone(),
        update.status.clone(),
        update.installer_key.clone(),
        update.notes.clone(),
    ]
}

pub fn photo_to_row(
    at: &DateTime<Utc>,
    job_id: &str,
    installer_key: &str,
    photo: &PhotoMetadata,
) -> Vec<String> {
    vec![
        iso_timestamp(at),
        job_id.to_string(),
        installer_key.to_string(),
        photo.file_name.clone(),
        photo.url.clone(),
        photo.caption.clone().unwrap_or_default(),
        photo.taken_at.clone().unwrap_or_default(),
    ]
}

pub fn defect_to_row(
    at: &DateTime<Utc>,
    job_id: &str,
    installer_key: &str,
    defect: &DefectReport,
) -> Vec<String> {
    vec![
        iso_timestamp(at),
        job_id.to_string(),
        installer_key.to_string(),
        defect.category.clone(),
        defect.severity.clone(),
        defect.description.clone(),
        defect.photo_urls.join(","),
    ]
}

/// TeamUp 事件（只取用到的欄位）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CalendarEvent {
    pub id: serde_json::Value,
    pub title: String,
    pub location: Option<String>,
    pub start_dt: Option<String>,
    pub who: serde_json::Value,
    pub notes: Option<String>,
    pub subcalendar_id: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CalendarEventsResponse {
    pub events: Vec<CalendarEvent>,
}

/// "Installation - Customer Name" -> "Customer Name"
pub fn extract_customer_from_title(title: &str) -> String {
    let parts: Vec<&str> = title.split('-').collect();
    match parts.get(1) {
        Some(second) => second.trim().to_string(),
        None => title.to_string(),
    }
}

/// 目前所有子行事曆都對應到 Scheduled
pub fn map_calendar_status(_event: &CalendarEvent) -> String {
    DEFAULT_CALENDAR_STATUS.to_string()
}

fn technician_from_who(who: &serde_json::Value) -> String {
    match who {
        serde_json::Value::Array(entries) => entries
            .first()
            .and_then(|entry| entry.get("name"))
            .and_then(|name| name.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| UNASSIGNED_TECHNICIAN.to_string()),
        serde_json::Value::String(name) if !name.is_empty() => name.clone(),
        _ => UNASSIGNED_TECHNICIAN.to_string(),
    }
}

pub fn calendar_event_to_job(event: &CalendarEvent) -> Job {
    let id = match &event.id {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    };

    Job {
        id,
        customer_name: extract_customer_from_title(&event.title),
        address: event.location.clone(),
        phone: None,
        email: None,
        job_type: CALENDAR_JOB_TYPE.to_string(),
        status: map_calendar_status(event),
        priority: CALENDAR_PRIORITY.to_string(),
        due_date: event.start_dt.clone(),
        technician: Some(technician_from_who(&event.who)),
        notes: event.notes.clone(),
        materials: Vec::new(),
        access_notes: Some(String::new()),
        extra: Default::default(),
    }
}
