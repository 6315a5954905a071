use crate::utils::error::{JobsError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com";
pub const DEFAULT_TEAMUP_API_BASE: &str = "https://api.teamup.com";

/// 目前啟用的資料來源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Google,
    Supabase,
}

impl BackendKind {
    /// 無法辨識的值一律回到 Google
    pub fn from_selector(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "supabase" => BackendKind::Supabase,
            "google" => BackendKind::Google,
            other => {
                tracing::debug!("Unknown data source '{}', using google", other);
                BackendKind::Google
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Google => "google",
            BackendKind::Supabase => "supabase",
        }
    }
}

impl<'de> Deserialize<'de> for BackendKind {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(BackendKind::from_selector(&raw))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_source: DataSourceConfig,
    pub google: GoogleConfig,
    pub supabase: SupabaseConfig,
    pub teamup: TeamUpConfig,
    pub cache: CacheConfig,
    pub features: FeatureFlags,
    pub auth: AuthPolicy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSourceConfig {
    pub backend: BackendKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    pub spreadsheet_id: String,
    pub api_base: String,
    pub access_token: Option<String>,
    /// 設定後改用本機 CSV 工作簿（每張表一個 `<sheet>.csv`）
    pub workbook_dir: Option<String>,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            api_base: DEFAULT_SHEETS_API_BASE.to_string(),
            access_token: None,
            workbook_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SupabaseConfig {
    pub url: String,
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamUpConfig {
    pub calendar_id: String,
    pub api_key: String,
    pub api_base: String,
}

impl Default for TeamUpConfig {
    fn default() -> Self {
        Self {
            calendar_id: String::new(),
            api_key: String::new(),
            api_base: DEFAULT_TEAMUP_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub duration_minutes: u64,
    /// CLI 檔案快取目錄，未設定時使用系統暫存目錄下的 `field-jobs`
    pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            duration_minutes: 5,
            dir: None,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.duration_minutes * 60)
    }

    pub fn dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("field-jobs"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub photo_upload: bool,
    pub defect_reporting: bool,
    pub signatures: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            photo_upload: true,
            defect_reporting: true,
            signatures: false,
        }
    }
}

impl FeatureFlags {
    pub fn require(&self, feature: Feature) -> Result<()> {
        let enabled = match feature {
            Feature::PhotoUpload => self.photo_upload,
            Feature::DefectReporting => self.defect_reporting,
            Feature::Signatures => self.signatures,
        };
        if enabled {
            Ok(())
        } else {
            Err(JobsError::FeatureDisabled {
                feature: feature.name().to_string(),
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    PhotoUpload,
    DefectReporting,
    Signatures,
}

impl Feature {
    pub fn name(&self) -> &'static str {
        match self {
            Feature::PhotoUpload => "photo_upload",
            Feature::DefectReporting => "defect_reporting",
            Feature::Signatures => "signatures",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Token,
    Google,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthPolicy {
    pub token_required: bool,
    pub google_auth_allowed: bool,
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self {
            token_required: false,
            google_auth_allowed: true,
        }
    }
}

impl AuthPolicy {
    /// token 一律可用；要求 token 時 Google 登入不足以通過
    pub fn permits(&self, method: AuthMethod) -> bool {
        match method {
            AuthMethod::Token => true,
            AuthMethod::Google => self.google_auth_allowed && !self.token_required,
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(JobsError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| JobsError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SUPABASE_KEY})，未設定的變數保留原字串
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| JobsError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn backend(&self) -> BackendKind {
        self.data_source.backend
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.data_source.backend = backend;
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache.ttl()
    }

    pub fn teamup_configured(&self) -> bool {
        !self.teamup.calendar_id.trim().is_empty()
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        match self.backend() {
            BackendKind::Google => match &self.google.workbook_dir {
                Some(dir) => validation::validate_workbook_dir("google.workbook_dir", dir)?,
                None => {
                    validation::require_value("google.spreadsheet_id", &self.google.spreadsheet_id)?;
                    validation::validate_endpoint("google.api_base", &self.google.api_base)?;
                    validation::require_secret(
                        "google.access_token",
                        self.google.access_token.as_deref(),
                    )?;
                }
            },
            BackendKind::Supabase => {
                validation::validate_endpoint("supabase.url", &self.supabase.url)?;
                validation::require_secret("supabase.key", Some(self.supabase.key.as_str()))?;
            }
        }

        if self.teamup_configured() {
            validation::validate_endpoint("teamup.api_base", &self.teamup.api_base)?;
            validation::require_secret("teamup.api_key", Some(self.teamup.api_key.as_str()))?;
        }

        validation::validate_cache_minutes("cache.duration_minutes", self.cache.duration_minutes)?;

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[data_source]
backend = "supabase"

[supabase]
url = "https://project.supabase.co"
key = "service-key"

[teamup]
calendar_id = "ks123"
api_key = "teamup-key"

[cache]
duration_minutes = 10
dir = "/var/cache/field-jobs"

[features]
photo_upload = false

[auth]
token_required = true
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.backend(), BackendKind::Supabase);
        assert_eq!(config.supabase.key, "service-key");
        assert_eq!(config.teamup.api_base, DEFAULT_TEAMUP_API_BASE);
        assert_eq!(config.cache_ttl(), Duration::from_secs(600));
        assert_eq!(config.cache.dir(), PathBuf::from("/var/cache/field-jobs"));
        assert!(!config.features.photo_upload);
        assert!(config.features.defect_reporting);
        assert!(config.auth.token_required);
        assert!(config.auth.google_auth_allowed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.backend(), BackendKind::Google);
        assert_eq!(config.cache.duration_minutes, 5);
        assert_eq!(config.cache.dir(), std::env::temp_dir().join("field-jobs"));
        assert_eq!(config.google.api_base, DEFAULT_SHEETS_API_BASE);
        assert!(!config.features.signatures);
    }

    #[test]
    fn test_unknown_backend_falls_back_to_google() {
        let config = AppConfig::from_toml_str("[data_source]\nbackend = \"airtable\"\n").unwrap();
        assert_eq!(config.backend(), BackendKind::Google);
        assert_eq!(BackendKind::from_selector(" Supabase "), BackendKind::Supabase);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("FIELD_JOBS_TEST_SUPABASE_KEY", "from-env");

        let toml_content = r#"
[supabase]
url = "https://project.supabase.co"
key = "${FIELD_JOBS_TEST_SUPABASE_KEY}"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.supabase.key, "from-env");

        std::env::remove_var("FIELD_JOBS_TEST_SUPABASE_KEY");

        // 未設定的變數保留原字串
        let config = AppConfig::from_toml_str(
            "[teamup]\napi_key = \"${FIELD_JOBS_TEST_UNSET_VAR}\"\n",
        )
        .unwrap();
        assert_eq!(config.teamup.api_key, "${FIELD_JOBS_TEST_UNSET_VAR}");
    }

    #[test]
    fn test_validation_failures() {
        let config = AppConfig::from_toml_str("[data_source]\nbackend = \"supabase\"\n").unwrap();
        assert!(config.validate().is_err());

        let config = AppConfig::from_toml_str("[google]\nspreadsheet_id = \"abc\"\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(JobsError::MissingConfigError { .. })
        ));

        let config = AppConfig::from_toml_str(
            "[google]\nworkbook_dir = \"./workbook\"\n[cache]\nduration_minutes = 0\n",
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_auth_policy() {
        let default_policy = AuthPolicy::default();
        assert!(default_policy.permits(AuthMethod::Google));
        assert!(default_policy.permits(AuthMethod::Token));

        let token_only = AuthPolicy {
            token_required: true,
            google_auth_allowed: true,
        };
        assert!(!token_only.permits(AuthMethod::Google));
        assert!(token_only.permits(AuthMethod::Token));
    }

    #[test]
    fn test_token_only_policy_is_still_valid_config() {
        let config = AppConfig::from_toml_str(
            "[google]\nworkbook_dir = \"./workbook\"\n[auth]\ntoken_required = true\ngoogle_auth_allowed = false\n",
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert!(config.auth.permits(AuthMethod::Token));
        assert!(!config.auth.permits(AuthMethod::Google));
    }

    #[test]
    fn test_feature_flags_require() {
        let flags = FeatureFlags::default();
        assert!(flags.require(Feature::PhotoUpload).is_ok());
        assert!(matches!(
            flags.require(Feature::Signatures),
            Err(JobsError::FeatureDisabled { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[google]\nworkbook_dir = \"./workbook\"\n")
            .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.google.workbook_dir.as_deref(), Some("./workbook"));
        assert!(config.validate().is_ok());
    }
}
