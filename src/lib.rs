pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{FileCache, MemoryCache, TeamUpCalendar};
pub use config::{AppConfig, BackendKind};
pub use core::dispatcher::JobDispatcher;
pub use domain::model::{DefectReport, Installer, Job, PhotoMetadata, SaveResult, StatusUpdate};
pub use utils::error::{JobsError, Result};
