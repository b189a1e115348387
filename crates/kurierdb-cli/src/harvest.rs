//! The harvest command: fetch, extract, normalize, and archive a day range.
//!
//! Per-day and per-record failures are logged and skipped rather than
//! propagated, so one broken document does not abort a bulk run. Only
//! infrastructure failures (database, config, report log) end the run.

use std::fs::{self, OpenOptions};
use std::io::Write;

use anyhow::Context;
use chrono::NaiveDate;

use kurierdb_core::AppConfig;
use kurierdb_db::{archive, ArchiveStats};
use kurierdb_extract::{Blueprints, Extractor, Report};
use kurierdb_fetch::{DocumentCache, Fetcher, Session};
use kurierdb_geo::NominatimClient;
use kurierdb_pipeline::Normalizer;

pub(crate) async fn run(
    config: &AppConfig,
    since: NaiveDate,
    until: NaiveDate,
    offline: bool,
) -> anyhow::Result<()> {
    let pool = kurierdb_db::connect(&config.database_url)
        .await
        .context("failed to open the database")?;

    let session = Session::new(&config.base_url, config.http_timeout_secs, &config.user_agent)?;
    let cache = DocumentCache::open(&config.cache_dir)?;
    let fetcher = Fetcher::new(
        &session,
        &cache,
        &config.courier,
        offline,
        config.inter_request_delay_ms,
    );

    let blueprints = if config.blueprints_path.is_file() {
        Blueprints::load(&config.blueprints_path)?
    } else {
        tracing::info!(path = %config.blueprints_path.display(), "no blueprint file, using built-in blueprints");
        Blueprints::builtin()
    };
    let extractor = Extractor::new(blueprints);

    let locator = NominatimClient::with_base_url(
        &config.geo_base_url,
        config.http_timeout_secs,
        &config.user_agent,
    )?;
    let normalizer = Normalizer::new(&locator, config);

    let mut report_log = open_report_log(config)?;

    let mut totals = ArchiveStats::default();
    let mut processed = 0u64;
    let mut failed_days = 0u64;

    let mut day = since;
    while day <= until {
        let documents = match fetcher.fetch_day(day).await {
            Ok(documents) => documents,
            Err(e) => {
                tracing::error!(%day, error = %e, "day failed, moving on");
                failed_days += 1;
                day = next_day(day)?;
                continue;
            }
        };

        let mut day_stats = ArchiveStats::default();
        for document in &documents {
            let (record, reports) = extractor.scrape(document);
            append_reports(&mut report_log, &reports)?;

            let bundle = match normalizer.process(&record).await {
                Ok(bundle) => bundle,
                Err(e) => {
                    tracing::warn!(stamp = %document.stamp, error = %e, "record skipped");
                    continue;
                }
            };

            let stats = archive(&pool, &bundle).await?;
            day_stats.inserted += stats.inserted;
            day_stats.skipped += stats.skipped;
            processed += 1;
        }

        tracing::info!(
            %day,
            documents = documents.len(),
            inserted = day_stats.inserted,
            skipped = day_stats.skipped,
            "day archived"
        );
        totals.inserted += day_stats.inserted;
        totals.skipped += day_stats.skipped;
        day = next_day(day)?;
    }

    println!(
        "harvested {processed} records ({} rows inserted, {} skipped, {failed_days} days failed)",
        totals.inserted, totals.skipped
    );
    Ok(())
}

fn next_day(day: NaiveDate) -> anyhow::Result<NaiveDate> {
    day.succ_opt()
        .with_context(|| format!("no day after {day}"))
}

fn open_report_log(config: &AppConfig) -> anyhow::Result<std::fs::File> {
    if let Some(parent) = config.report_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.report_path)
        .with_context(|| format!("cannot open {}", config.report_path.display()))
}

fn append_reports(log: &mut std::fs::File, reports: &[Report]) -> anyhow::Result<()> {
    for report in reports {
        writeln!(log, "{report}").context("cannot write to the report log")?;
    }
    Ok(())
}
