use crate::config::CONNECT_TIMEOUT_SECS;
use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use reqwest::blocking::{Client, ClientBuilder};
use std::fs;
use std::io::Read;
use std::time::Duration;
use tracing::{debug, info};

/// Retrieves a gzip-compressed dump and hands back its decompressed text.
///
/// `http://` and `https://` locators are downloaded; anything else is read
/// from the local file system, which is how offline runs and tests work.
pub struct SourceReader {
    client: Client,
}

impl SourceReader {
    pub fn new() -> Result<Self> {
        Self::with_builder(client_builder())
    }

    fn with_builder(builder: ClientBuilder) -> Result<Self> {
        let client = builder.build().context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    pub fn fetch_text(&self, locator: &str) -> Result<String> {
        let text = if is_remote(locator) {
            self.download_text(locator)?
        } else {
            let compressed = fs::read(locator)
                .with_context(|| format!("Failed to read source file: {}", locator))?;
            debug!(bytes = compressed.len(), locator, "Read compressed source");
            decompress_text(&compressed)
                .with_context(|| format!("Failed to extract source: {}", locator))?
        };

        info!(bytes = text.len(), locator, "Source extracted");
        Ok(text)
    }

    fn download_text(&self, url: &str) -> Result<String> {
        info!(url, "Downloading source");
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Failed to fetch source: {}", url))?;

        let status = response.status();
        if !status.is_success() {
            bail!(
                "Failed to fetch source: {} (status: {} {})",
                url,
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            );
        }

        let compressed = response
            .bytes()
            .with_context(|| format!("Failed to read response body: {}", url))?;
        debug!(bytes = compressed.len(), url, "Downloaded compressed source");

        decompress_text(&compressed).with_context(|| format!("Failed to extract source: {}", url))
    }
}

fn client_builder() -> ClientBuilder {
    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        // Downloads of the larger dumps take minutes.
        .timeout(None::<Duration>)
}

pub fn is_remote(locator: &str) -> bool {
    locator.starts_with("http://") || locator.starts_with("https://")
}

/// Inflates a whole gzip payload and validates it as UTF-8.
pub fn decompress_text(data: &[u8]) -> Result<String> {
    let mut decoder = GzDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .context("Failed to decompress gzip data")?;
    String::from_utf8(decompressed).context("Decompressed data is not valid UTF-8")
}
