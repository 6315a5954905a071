// Adapters layer: concrete implementations for external systems (sheets, supabase, teamup, cache).

pub mod cache;
pub mod csv_workbook;
pub mod google;
pub mod sheets_api;
pub mod supabase;
pub mod teamup;

pub use cache::{FileCache, MemoryCache};
pub use csv_workbook::CsvWorkbook;
pub use google::GoogleSheetsBackend;
pub use sheets_api::SheetsApiStore;
pub use supabase::SupabaseBackend;
pub use teamup::TeamUpCalendar;
