use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk cache of downloaded CSV tables
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(custom_dir: Option<PathBuf>) -> Result<Self> {
        let cache_dir = match custom_dir {
            Some(dir) => dir,
            None => {
                let proj_dirs = ProjectDirs::from("", "", "pokewiki-db")
                    .context("Could not determine cache directory")?;
                proj_dirs.cache_dir().join("csv")
            }
        };

        fs::create_dir_all(&cache_dir).context("Failed to create cache directory")?;

        Ok(Self { cache_dir })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of the cached copy of a table
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.csv", table))
    }

    /// Check if a non-empty copy of the table is cached
    pub fn is_cached(&self, table: &str) -> bool {
        fs::metadata(self.table_path(table))
            .map(|meta| meta.is_file() && meta.len() > 0)
            .unwrap_or(false)
    }

    /// Path used while a download is in flight
    pub fn partial_path(&self, table: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.csv.part", table))
    }
}
