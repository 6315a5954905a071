use clap::Parser;
use field_jobs::config::cli::{defect_from_args, photo_from_args, Command};
use field_jobs::config::{AuthMethod, Feature};
use field_jobs::utils::error::ErrorSeverity;
use field_jobs::utils::{logger, validation::Validate};
use field_jobs::{AppConfig, CliConfig, FileCache, JobDispatcher, JobsError, TeamUpCalendar};
use serde::Serialize;
use std::sync::Arc;

fn print_json<T: Serialize>(value: &T) -> Result<(), JobsError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn fail(e: &JobsError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 依錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 4,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

async fn run(cli: CliConfig, config: AppConfig) -> Result<(), JobsError> {
    let dispatcher = || JobDispatcher::from_config(&config);

    match cli.command {
        Command::Jobs { installer, crew } => {
            let jobs = dispatcher().get_jobs(&installer, &crew).await;
            tracing::info!("📋 {} jobs for {}", jobs.len(), installer);
            print_json(&jobs)
        }
        Command::Status {
            job,
            status,
            installer,
            notes,
        } => print_json(
            &dispatcher()
                .save_job_status(&job, &status, &installer, &notes)
                .await,
        ),
        Command::Installer { key } => print_json(&dispatcher().get_installer_info(&key).await),
        Command::Photo {
            job,
            installer,
            file_name,
            url,
            caption,
            taken_at,
        } => {
            config.features.require(Feature::PhotoUpload)?;
            let photo = photo_from_args(&file_name, &url, caption.as_deref(), taken_at.as_deref());
            print_json(&dispatcher().save_photo_metadata(&job, &photo, &installer).await)
        }
        Command::Defect {
            job,
            installer,
            category,
            severity,
            description,
            photo_urls,
        } => {
            config.features.require(Feature::DefectReporting)?;
            let defect = defect_from_args(&category, &severity, &description, &photo_urls);
            print_json(&dispatcher().save_defect_report(&job, &defect, &installer).await)
        }
        Command::Calendar => {
            if !config.teamup_configured() {
                return Err(JobsError::MissingConfigError {
                    field: "teamup.calendar_id".to_string(),
                });
            }
            let feed = TeamUpCalendar::new(
                &config.teamup.api_base,
                &config.teamup.calendar_id,
                &config.teamup.api_key,
                Arc::new(FileCache::new(config.cache.dir())),
                config.cache_ttl(),
            );
            print_json(&feed.get_jobs_from_calendar().await)
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    logger::init_logger(logger::LogFormat::from_flag(cli.json_logs), cli.verbose);

    tracing::debug!("CLI config: {:?}", cli);
    tracing::info!("📁 Loading configuration from: {}", cli.config);

    let mut config = match AppConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };

    if let Some(backend) = cli.backend_override() {
        tracing::info!("🔧 Data source overridden to: {}", backend.as_str());
        config = config.with_backend(backend);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        fail(&e);
    }

    let method = AuthMethod::from(cli.auth);
    if !config.auth.permits(method) {
        fail(&JobsError::ConfigError {
            message: format!("Authentication method {:?} is not permitted", method),
        });
    }

    if let Err(e) = run(cli, config).await {
        fail(&e);
    }
}
