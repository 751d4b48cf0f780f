//! I/O boundary traits for testability
//!
//! Record payloads are fetched through [`RecordSource`], allowing services
//! to be tested with in-memory implementations.

use std::io;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, instrument};

use crate::infrastructure::error::{InfraError, InfraResult};

/// Source of raw JSON payloads.
pub trait RecordSource: Send + Sync {
    /// Fetch the raw payload stored at `location`.
    fn fetch(&self, location: &str) -> io::Result<String>;
}

/// True for `http://` and `https://` locations.
pub fn is_remote(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Real source: HTTP(S) via a blocking reqwest client, anything else as a local file path.
pub struct RealRecordSource {
    client: Client,
}

impl RealRecordSource {
    /// Create a source whose HTTP requests time out after `timeout`.
    pub fn new(timeout: Duration) -> InfraResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| InfraError::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }

    fn fetch_remote(&self, url: &str) -> io::Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(io::Error::other)?;
        response.text().map_err(io::Error::other)
    }

    /// Read the path verbatim; `~` and `$VAR` are expanded once, when settings load.
    fn fetch_file(&self, location: &str) -> io::Result<String> {
        std::fs::read_to_string(Path::new(location))
    }
}

impl RecordSource for RealRecordSource {
    #[instrument(level = "debug", skip(self))]
    fn fetch(&self, location: &str) -> io::Result<String> {
        let body = if is_remote(location) {
            self.fetch_remote(location)?
        } else {
            self.fetch_file(location)?
        };
        debug!("fetched {} bytes from {}", body.len(), location);
        Ok(body)
    }
}
