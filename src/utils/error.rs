use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobsError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Upstream returned {status} for {endpoint}: {body}")]
    UpstreamStatusError {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Sheet not found: {name}")]
    SheetNotFound { name: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Feature disabled: {feature}")]
    FeatureDisabled { feature: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Storage,
    Data,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl JobsError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            JobsError::ApiError(_) | JobsError::UpstreamStatusError { .. } => {
                ErrorCategory::Network
            }
            JobsError::CsvError(_) | JobsError::IoError(_) | JobsError::SheetNotFound { .. } => {
                ErrorCategory::Storage
            }
            JobsError::SerializationError(_) => ErrorCategory::Data,
            JobsError::UrlError(_)
            | JobsError::ConfigError { .. }
            | JobsError::MissingConfigError { .. }
            | JobsError::InvalidConfigValueError { .. }
            | JobsError::FeatureDisabled { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            JobsError::FeatureDisabled { .. } => ErrorSeverity::Low,
            JobsError::ApiError(_) | JobsError::UpstreamStatusError { .. } => {
                ErrorSeverity::Medium
            }
            JobsError::CsvError(_)
            | JobsError::SheetNotFound { .. }
            | JobsError::SerializationError(_) => ErrorSeverity::High,
            _ => ErrorSeverity::Critical,
        }
    }

    /// 依錯誤類別提供修復建議
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            JobsError::FeatureDisabled { .. } => "Enable the feature under [features] in the config file",
            JobsError::SheetNotFound { .. } => "Check that the spreadsheet contains the expected sheet names",
            JobsError::UpstreamStatusError { status, .. } if *status == 401 || *status == 403 => {
                "Check the API key / token in the config file"
            }
            _ => match self.category() {
                ErrorCategory::Network => "Check network connectivity and the API base URL, then retry",
                ErrorCategory::Storage => "Check that the workbook files exist and are readable",
                ErrorCategory::Data => "The upstream payload did not match the expected shape",
                ErrorCategory::Configuration => "Fix the configuration file and run again",
            },
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the data source: {}", self),
            ErrorCategory::Storage => format!("Could not access the spreadsheet store: {}", self),
            ErrorCategory::Data => format!("Received unexpected data: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, JobsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_and_severity() {
        let err = JobsError::UpstreamStatusError {
            endpoint: "/rest/v1/jobs".to_string(),
            status: 500,
            body: String::new(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);

        let err = JobsError::MissingConfigError {
            field: "supabase.url".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_recovery_suggestion_for_auth_failure() {
        let err = JobsError::UpstreamStatusError {
            endpoint: "/rest/v1/jobs".to_string(),
            status: 401,
            body: "unauthorized".to_string(),
        };
        assert!(err.recovery_suggestion().contains("API key"));
        assert!(err.user_friendly_message().contains("401"));
    }
}
