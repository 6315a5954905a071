use crate::utils::error::{JobsError, Result};
use std::path::Path;
use url::Url;

/// 快取時間上限（分鐘）
pub const MAX_CACHE_MINUTES: u64 = 360;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: &str, reason: impl Into<String>) -> JobsError {
    JobsError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn missing(field: &str) -> JobsError {
    JobsError::MissingConfigError {
        field: field.to_string(),
    }
}

/// 空白或只有空白字元都當作沒填
pub fn require_value(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(missing(field));
    }
    Ok(())
}

/// 憑證類欄位：未設定、空字串，或 `${VAR}` 沒被環境變數替換掉，都算缺少
pub fn require_secret<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(v) if v.starts_with("${") && v.ends_with('}') => Err(invalid(
            field,
            v,
            "Environment variable placeholder was not substituted",
        )),
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(missing(field)),
    }
}

/// 上游 API 端點：只接受帶主機名稱的 http/https URL
pub fn validate_endpoint(field: &str, raw: &str) -> Result<Url> {
    require_value(field, raw)?;
    let url = Url::parse(raw).map_err(|e| invalid(field, raw, format!("Invalid URL format: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field,
            raw,
            format!("Unsupported URL scheme: {}", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(invalid(field, raw, "URL has no host"));
    }
    Ok(url)
}

/// 工作簿目錄可以尚未建立，但若已存在就必須是目錄
pub fn validate_workbook_dir(field: &str, dir: &str) -> Result<()> {
    require_value(field, dir)?;
    if dir.contains('\0') {
        return Err(invalid(field, dir, "Path contains null bytes"));
    }
    let path = Path::new(dir);
    if path.exists() && !path.is_dir() {
        return Err(invalid(field, dir, "Path exists but is not a directory"));
    }
    Ok(())
}

pub fn validate_cache_minutes(field: &str, minutes: u64) -> Result<()> {
    if !(1..=MAX_CACHE_MINUTES).contains(&minutes) {
        return Err(invalid(
            field,
            &minutes.to_string(),
            format!("Cache duration must be between 1 and {} minutes", MAX_CACHE_MINUTES),
        ));
    }
    Ok(())
}
