/*!
 * Source dataset handling.
 *
 * The dataset is a JSON array of flat objects mapping field names to string
 * values, in the Stanford Alpaca layout (`instruction`, `input`, `output`).
 * It is loaded once at job start and never mutated.
 */

use indexmap::IndexMap;
use log::info;
use std::path::Path;
use std::time::Duration;

use crate::errors::{AppError, DownloadError};
use crate::file_utils::FileManager;

/// One dataset entry: field name to field value, in source order
pub type Record = IndexMap<String, String>;

/// The loaded source dataset
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Wrap already loaded records
    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Parse a dataset from JSON text
    ///
    /// `null` values are accepted and loaded as empty strings.
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let raw: Vec<IndexMap<String, Option<String>>> = serde_json::from_str(json)
            .map_err(|e| AppError::Dataset(format!("Invalid dataset JSON: {}", e)))?;

        let records = raw
            .into_iter()
            .map(|fields| {
                fields
                    .into_iter()
                    .map(|(key, value)| (key, value.unwrap_or_default()))
                    .collect::<Record>()
            })
            .collect();

        Ok(Self { records })
    }

    /// Load a dataset file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path)
            .map_err(|e| AppError::Dataset(format!("{:#}", e)))?;
        let dataset = Self::from_json(&content)?;
        info!("Loaded {} records from {:?}", dataset.len(), path);
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Records in `[start, end)`, clamped to the dataset bounds
    pub fn slice(&self, start: usize, end: usize) -> &[Record] {
        let end = end.min(self.records.len());
        let start = start.min(end);
        &self.records[start..end]
    }
}

/// Download the dataset at `url` into `path`
pub async fn download(url: &str, path: &Path) -> Result<(), DownloadError> {
    info!("Downloading dataset from {}", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(300))
        .build()
        .map_err(|e| DownloadError::Request { url: url.to_string(), message: e.to_string() })?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| DownloadError::Request { url: url.to_string(), message: e.to_string() })?;

    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::Status { url: url.to_string(), status_code: status.as_u16() });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| DownloadError::Request { url: url.to_string(), message: e.to_string() })?;

    FileManager::write_atomic(path, &body)
        .map_err(|source| DownloadError::Write { path: path.to_path_buf(), source })?;

    info!("File downloaded successfully: {:?} ({} bytes)", path, body.len());
    Ok(())
}

/// Make sure the dataset file exists locally, downloading it when a URL is known
pub async fn ensure_local(path: &Path, url: Option<&str>) -> Result<(), AppError> {
    if FileManager::file_exists(path) {
        return Ok(());
    }

    match url {
        Some(url) => {
            download(url, path).await?;
            Ok(())
        }
        None => Err(AppError::Dataset(format!(
            "Dataset file {:?} does not exist and no download URL is configured",
            path
        ))),
    }
}
