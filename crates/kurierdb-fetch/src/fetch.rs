use std::collections::BTreeSet;
use std::sync::LazyLock;
use std::time::Duration;

use chrono::NaiveDate;
use regex::Regex;

use kurierdb_core::{RawDocument, Stamp};

use crate::cache::DocumentCache;
use crate::error::FetchError;
use crate::session::Session;

/// Day summary page listing the jobs delivered on a date.
const SUMMARY_PATH: &str = "ll.php5";
/// Detail page for one job.
const JOB_PATH: &str = "ll_detail.php5";

/// Job ids are the 7-digit `uuid` request parameters on the summary page.
static JOB_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"uuid=(\d{7})").expect("job id pattern must compile"));

/// Retrieves the raw documents for one calendar day, serving from the on-disk
/// cache wherever possible. In offline mode no network call is ever made.
pub struct Fetcher<'a> {
    session: &'a Session,
    cache: &'a DocumentCache,
    courier: &'a str,
    offline: bool,
    /// Politeness pause between successive document requests.
    delay_ms: u64,
}

impl<'a> Fetcher<'a> {
    #[must_use]
    pub fn new(
        session: &'a Session,
        cache: &'a DocumentCache,
        courier: &'a str,
        offline: bool,
        delay_ms: u64,
    ) -> Self {
        Self {
            session,
            cache,
            courier,
            offline,
            delay_ms,
        }
    }

    /// Returns all documents for `day`, or an explicit empty vec when the day
    /// has no jobs.
    ///
    /// # Errors
    ///
    /// Network failure during discovery or retrieval is fatal for the day;
    /// no partial day is silently accepted. Offline mode fails with
    /// [`FetchError::OfflineCacheMiss`] when the cache holds nothing for the
    /// day (the empty-day sentinel counts as a cached answer, not a miss).
    pub async fn fetch_day(&self, day: NaiveDate) -> Result<Vec<RawDocument>, FetchError> {
        if self.cache.is_marked_empty(day) {
            tracing::debug!(%day, "day is cached as empty, skipping discovery");
            return Ok(Vec::new());
        }

        if self.offline {
            return self.fetch_day_from_cache(day);
        }

        let job_ids = self.discover_job_ids(day).await?;
        if job_ids.is_empty() {
            tracing::info!(%day, "no jobs found, writing empty-day sentinel");
            self.cache.mark_empty(day)?;
            return Ok(Vec::new());
        }

        let total = job_ids.len();
        let mut documents = Vec::with_capacity(total);
        for (nb, job_id) in job_ids.into_iter().enumerate() {
            let html = if self.cache.contains(day, &job_id) {
                tracing::debug!(%day, job_id = %job_id, "{}/{total} served from cache", nb + 1);
                self.cache.load(day, &job_id)?
            } else {
                if nb > 0 && self.delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
                }
                let html = self.fetch_job(day, &job_id).await?;
                self.cache.store(day, &job_id, &html)?;
                tracing::debug!(%day, job_id = %job_id, "{}/{total} downloaded", nb + 1);
                html
            };
            documents.push(self.document(day, job_id, html));
        }
        Ok(documents)
    }

    fn fetch_day_from_cache(&self, day: NaiveDate) -> Result<Vec<RawDocument>, FetchError> {
        let job_ids = self.cache.job_ids(day)?;
        if job_ids.is_empty() {
            return Err(FetchError::OfflineCacheMiss { day });
        }
        let mut documents = Vec::with_capacity(job_ids.len());
        for job_id in job_ids {
            let html = self.cache.load(day, &job_id)?;
            documents.push(self.document(day, job_id, html));
        }
        tracing::debug!(%day, count = documents.len(), "served day from cache");
        Ok(documents)
    }

    /// Scrapes the job ids for the day off the summary page. The source has
    /// been observed to list the same id twice, so ids are collapsed with set
    /// semantics; the sorted order also makes iteration deterministic.
    async fn discover_job_ids(&self, day: NaiveDate) -> Result<BTreeSet<String>, FetchError> {
        let datum = day.format("%d.%m.%Y").to_string();
        let body = self
            .session
            .get_text(SUMMARY_PATH, &[("status", "delivered"), ("datum", &datum)])
            .await?;

        Ok(JOB_ID_PATTERN
            .captures_iter(&body)
            .map(|caps| caps[1].to_string())
            .collect())
    }

    async fn fetch_job(&self, day: NaiveDate, job_id: &str) -> Result<String, FetchError> {
        let datum = day.format("%d.%m.%Y").to_string();
        self.session
            .get_text(
                JOB_PATH,
                &[("status", "delivered"), ("uuid", job_id), ("datum", &datum)],
            )
            .await
    }

    fn document(&self, day: NaiveDate, job_id: String, html: String) -> RawDocument {
        RawDocument {
            stamp: Stamp {
                courier: self.courier.to_string(),
                date: day,
                job_id,
            },
            html,
        }
    }
}
