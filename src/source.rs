//! Where the word sheet comes from.

use std::path::PathBuf;
use std::time::Duration;

use include_dir::{include_dir, Dir};
use reqwest::blocking::Client;
use tracing::{debug, info, warn};

use crate::error::{LinguaError, Result};
use crate::model::Part;
use crate::parser::parse_words;

static ASSETS_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets");

pub trait WordSource {
    fn name(&self) -> String;
    /// Returns the raw sheet text, or `DataUnavailable` on any transport failure.
    fn fetch(&self) -> Result<String>;
}

/// Fetches the sheet and parses it. Either the full parse or the fetch error.
pub fn load_parts(source: &dyn WordSource) -> Result<Vec<Part>> {
    let text = source.fetch().inspect_err(|e| {
        warn!(source = %source.name(), error = %e, "failed to fetch word sheet");
    })?;
    let parts = parse_words(&text);
    info!(source = %source.name(), parts = parts.len(), "loaded word sheet");
    Ok(parts)
}

/// A published spreadsheet export reachable over HTTP.
pub struct HttpSource {
    url: String,
    client: Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LinguaError::DataUnavailable(e.to_string()))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

impl WordSource for HttpSource {
    fn name(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> Result<String> {
        debug!(url = %self.url, "fetching word sheet");
        let resp = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| LinguaError::DataUnavailable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LinguaError::DataUnavailable(format!("HTTP {}", status)));
        }

        let text = resp
            .text()
            .map_err(|e| LinguaError::DataUnavailable(e.to_string()))?;
        debug!(bytes = text.len(), "fetched word sheet");
        Ok(text)
    }
}

/// A sheet exported to disk.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WordSource for FileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<String> {
        std::fs::read_to_string(&self.path).map_err(|e| {
            LinguaError::DataUnavailable(format!("{}: {}", self.path.display(), e))
        })
    }
}

/// The sample sheet compiled into the binary.
#[derive(Debug, Clone)]
pub struct BundledSource;

impl WordSource for BundledSource {
    fn name(&self) -> String {
        "sample".to_string()
    }

    fn fetch(&self) -> Result<String> {
        ASSETS_DIR
            .get_file("sample.csv")
            .and_then(|file| file.contents_utf8())
            .map(str::to_string)
            .ok_or_else(|| LinguaError::DataUnavailable("sample.csv missing from assets".into()))
    }
}
