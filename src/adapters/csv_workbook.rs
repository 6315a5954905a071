use crate::domain::ports::SheetStore;
use crate::utils::error::{JobsError, Result};
use async_trait::async_trait;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// 本機 CSV 工作簿：每張工作表對應目錄下的一個 `<sheet>.csv`
#[derive(Debug, Clone)]
pub struct CsvWorkbook {
    base_path: PathBuf,
}

impl CsvWorkbook {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn sheet_path(&self, sheet: &str) -> PathBuf {
        Path::new(&self.base_path).join(format!("{}.csv", sheet))
    }
}

#[async_trait]
impl SheetStore for CsvWorkbook {
    async fn read_rows(&self, sheet: &str) -> Result<Vec<Vec<String>>> {
        let path = self.sheet_path(sheet);
        if !path.exists() {
            return Err(JobsError::SheetNotFound {
                name: sheet.to_string(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        tracing::debug!("Read {} rows from {}", rows.len(), path.display());
        Ok(rows)
    }

    /// 檔案不存在時會建立（不寫標題列）
    async fn append_row(&self, sheet: &str, row: Vec<String>) -> Result<()> {
        fs::create_dir_all(&self.base_path)?;
        let path = self.sheet_path(sheet);

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(file);
        writer.write_record(&row)?;
        writer.flush()?;

        tracing::debug!("Appended row to {}", path.display());
        Ok(())
    }
}
