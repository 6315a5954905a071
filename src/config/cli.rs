use crate::config::{AuthMethod, BackendKind};
use crate::domain::model::{DefectReport, PhotoMetadata};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Parser)]
#[command(name = "field-jobs")]
#[command(about = "Job, installer and status access for field installation crews")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "field-jobs.toml")]
    pub config: String,

    /// Override the data source from the config file (google | supabase)
    #[arg(long)]
    pub backend: Option<String>,

    /// How the caller authenticated
    #[arg(long, value_enum, default_value = "google")]
    pub auth: AuthArg,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AuthArg {
    Token,
    Google,
}

impl From<AuthArg> for AuthMethod {
    fn from(value: AuthArg) -> Self {
        match value {
            AuthArg::Token => AuthMethod::Token,
            AuthArg::Google => AuthMethod::Google,
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List jobs assigned to an installer or their crew
    Jobs {
        #[arg(long)]
        installer: String,
        #[arg(long, value_delimiter = ',')]
        crew: Vec<String>,
    },
    /// Record a job status change
    Status {
        #[arg(long)]
        job: String,
        #[arg(long)]
        status: String,
        #[arg(long)]
        installer: String,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Look up an installer by key
    Installer {
        #[arg(long)]
        key: String,
    },
    /// Record metadata for an uploaded job photo
    Photo {
        #[arg(long)]
        job: String,
        #[arg(long)]
        installer: String,
        #[arg(long)]
        file_name: String,
        #[arg(long)]
        url: String,
        #[arg(long)]
        caption: Option<String>,
        #[arg(long)]
        taken_at: Option<String>,
    },
    /// File a defect report against a job
    Defect {
        #[arg(long)]
        job: String,
        #[arg(long)]
        installer: String,
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "Medium")]
        severity: String,
        #[arg(long)]
        description: String,
        #[arg(long, value_delimiter = ',')]
        photo_urls: Vec<String>,
    },
    /// List jobs from the TeamUp calendar feed
    Calendar,
}

impl CliConfig {
    pub fn backend_override(&self) -> Option<BackendKind> {
        self.backend.as_deref().map(BackendKind::from_selector)
    }
}

pub fn photo_from_args(
    file_name: &str,
    url: &str,
    caption: Option<&str>,
    taken_at: Option<&str>,
) -> PhotoMetadata {
    PhotoMetadata {
        file_name: file_name.to_string(),
        url: url.to_string(),
        caption: caption.map(str::to_string),
        taken_at: taken_at.map(str::to_string),
    }
}

pub fn defect_from_args(
    category: &str,
    severity: &str,
    description: &str,
    photo_urls: &[String],
) -> DefectReport {
    DefectReport {
        category: category.to_string(),
        severity: severity.to_string(),
        description: description.to_string(),
        photo_urls: photo_urls.to_vec(),
    }
}
