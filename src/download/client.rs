use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use crate::config::CSV_BASE_URL;

/// Blocking HTTP client for the flat CSV export
pub struct CsvClient {
    client: Client,
    base_url: String,
}

impl CsvClient {
    pub fn new(base_url: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent("pokewiki-db")
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.unwrap_or_else(|| CSV_BASE_URL.to_string()),
        })
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/{}.csv", self.base_url.trim_end_matches('/'), table)
    }

    /// Download one table to `dest`, returning the number of bytes written
    pub fn download_table(&self, table: &str, dest: &Path) -> Result<u64> {
        let url = self.table_url(table);
        let mut response = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("Failed to fetch {}", url))?
            .error_for_status()
            .with_context(|| format!("Bad response for {}", url))?;

        let mut file = File::create(dest)
            .with_context(|| format!("Failed to create file: {:?}", dest))?;

        let mut downloaded: u64 = 0;
        let mut buffer = [0u8; 8192];

        loop {
            let bytes_read = response
                .read(&mut buffer)
                .with_context(|| format!("Failed to read response for {}", table))?;

            if bytes_read == 0 {
                break;
            }

            file.write_all(&buffer[..bytes_read])
                .context("Failed to write to file")?;
            downloaded += bytes_read as u64;
        }

        Ok(downloaded)
    }
}

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_000_000_000 {
        format!("{:.1} GB", bytes as f64 / 1_000_000_000.0)
    } else if bytes >= 1_000_000 {
        format!("{:.1} MB", bytes as f64 / 1_000_000.0)
    } else if bytes >= 1_000 {
        format!("{:.1} KB", bytes as f64 / 1_000.0)
    } else {
        format!("{} B", bytes)
    }
}
