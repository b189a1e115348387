use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::FetchError;

/// Marker file name suffix for a day already checked and found empty.
const NO_JOBS: &str = "NO_JOBS";

/// On-disk cache of raw job documents, one file per document, named
/// deterministically by `(date, job-id)`. The cache directory is the only
/// place the fetcher writes to.
#[derive(Debug, Clone)]
pub struct DocumentCache {
    dir: PathBuf,
}

impl DocumentCache {
    /// Opens (and if needed creates) the cache directory.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::CacheIo`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, FetchError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| FetchError::CacheIo {
            path: dir.display().to_string(),
            source: e,
        })?;
        Ok(Self { dir })
    }

    fn document_path(&self, day: NaiveDate, job_id: &str) -> PathBuf {
        self.dir
            .join(format!("{}-job-{}.html", day.format("%Y-%m-%d"), job_id))
    }

    fn sentinel_path(&self, day: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}-{}", day.format("%Y-%m-%d"), NO_JOBS))
    }

    #[must_use]
    pub fn contains(&self, day: NaiveDate, job_id: &str) -> bool {
        self.document_path(day, job_id).is_file()
    }

    /// True if the day was already checked online and found to have no jobs.
    #[must_use]
    pub fn is_marked_empty(&self, day: NaiveDate) -> bool {
        self.sentinel_path(day).is_file()
    }

    /// Records that the day has no jobs, so future calls skip discovery.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::CacheIo`] if the sentinel cannot be written.
    pub fn mark_empty(&self, day: NaiveDate) -> Result<(), FetchError> {
        write_file(&self.sentinel_path(day), "")
    }

    /// # Errors
    ///
    /// Returns [`FetchError::CacheIo`] if the document cannot be written.
    pub fn store(&self, day: NaiveDate, job_id: &str, html: &str) -> Result<(), FetchError> {
        write_file(&self.document_path(day, job_id), html)
    }

    /// # Errors
    ///
    /// Returns [`FetchError::CacheIo`] if the document cannot be read.
    pub fn load(&self, day: NaiveDate, job_id: &str) -> Result<String, FetchError> {
        let path = self.document_path(day, job_id);
        fs::read_to_string(&path).map_err(|e| FetchError::CacheIo {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Job ids of all documents cached for the day, in sorted order.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::CacheIo`] if the cache directory cannot be read.
    pub fn job_ids(&self, day: NaiveDate) -> Result<BTreeSet<String>, FetchError> {
        let prefix = format!("{}-job-", day.format("%Y-%m-%d"));
        let entries = fs::read_dir(&self.dir).map_err(|e| FetchError::CacheIo {
            path: self.dir.display().to_string(),
            source: e,
        })?;

        let mut ids = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|e| FetchError::CacheIo {
                path: self.dir.display().to_string(),
                source: e,
            })?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(id) = name
                .strip_prefix(&prefix)
                .and_then(|rest| rest.strip_suffix(".html"))
            {
                ids.insert(id.to_string());
            }
        }
        Ok(ids)
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), FetchError> {
    fs::write(path, content).map_err(|e| FetchError::CacheIo {
        path: path.display().to_string(),
        source: e,
    })
}
