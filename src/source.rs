use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

/// The named range every consumer reads.
pub const LEADERBOARD_RANGE: &str = "leaderboard";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("spreadsheet service answered {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("service account key rejected: {0}")]
    Key(String),

    #[error("failed to sign token request")]
    Signing,

    #[error("failed to encode token claims: {0}")]
    Claims(#[from] serde_json::Error),

    #[error("failed to read {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Produces the rows of a range, header first.
#[async_trait]
pub trait RowSource: Send + Sync {
    async fn fetch_rows(&self, range: &str) -> Result<Vec<Vec<String>>, FetchError>;
}

/// Rows from a local CSV export of the sheet. The range is ignored; the
/// whole file is the range.
#[derive(Debug, Clone)]
pub struct CsvRowSource {
    path: PathBuf,
}

impl CsvRowSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn read_rows(&self) -> Result<Vec<Vec<String>>, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(rows)
    }
}

#[async_trait]
impl RowSource for CsvRowSource {
    async fn fetch_rows(&self, _range: &str) -> Result<Vec<Vec<String>>, FetchError> {
        self.read_rows().map_err(|source| FetchError::Csv {
            path: self.path.clone(),
            source,
        })
    }
}
