pub mod dispatcher;

pub use crate::domain::model::{DefectReport, Installer, Job, PhotoMetadata, SaveResult};
pub use crate::domain::ports::{CacheStore, JobBackend, SheetStore};
pub use crate::utils::error::Result;
pub use dispatcher::JobDispatcher;
