//! Merge of normalized bundles into the store.

use rust_decimal::Decimal;
use sqlx::SqlitePool;

use kurierdb_core::{Bundle, Checkin, Checkpoint, Client, Order, PriceCategory};

use crate::DbError;

/// Outcome of archiving one bundle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveStats {
    /// Rows newly written across all four tables.
    pub inserted: u64,
    /// Rows already present or rejected by a constraint.
    pub skipped: u64,
}

impl ArchiveStats {
    fn count(&mut self, outcome: Result<bool, DbError>) -> Result<(), DbError> {
        match outcome {
            Ok(true) => self.inserted += 1,
            Ok(false) => self.skipped += 1,
            // A constraint violation on one row must not lose the rest of
            // the bundle.
            Err(DbError::Sqlx(sqlx::Error::Database(e))) => {
                tracing::warn!(error = %e, "row rejected by the store, skipping");
                self.skipped += 1;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }
}

/// Merges one bundle, parents before children so the foreign keys hold.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on connection-level failures. Per-row
/// constraint violations are tolerated and counted as skipped.
pub async fn archive(pool: &SqlitePool, bundle: &Bundle) -> Result<ArchiveStats, DbError> {
    let mut stats = ArchiveStats::default();

    stats.count(merge_client(pool, &bundle.client).await)?;
    stats.count(merge_order(pool, &bundle.order).await)?;
    for checkpoint in &bundle.checkpoints {
        stats.count(merge_checkpoint(pool, checkpoint).await)?;
    }
    for checkin in &bundle.checkins {
        stats.count(merge_checkin(pool, checkin).await)?;
    }

    Ok(stats)
}

/// Returns `true` when the row was actually written.
async fn merge_client(pool: &SqlitePool, client: &Client) -> Result<bool, DbError> {
    let result = sqlx::query(
        "INSERT INTO clients (client_id, name) VALUES ($1, $2) \
         ON CONFLICT (client_id) DO NOTHING",
    )
    .bind(client.client_id)
    .bind(client.name.as_deref())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

async fn merge_order(pool: &SqlitePool, order: &Order) -> Result<bool, DbError> {
    let result = sqlx::query(
        "INSERT INTO orders \
             (order_id, client_id, uuid, date, courier, type, cash, distance, \
              city_tour, extra_stops, overnight, fax_confirm, waiting_time, service) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
         ON CONFLICT (order_id) DO NOTHING",
    )
    .bind(order.order_id)
    .bind(order.client_id)
    .bind(order.uuid)
    .bind(order.date.format("%Y-%m-%d").to_string())
    .bind(&order.courier)
    .bind(order.job_type.map(|t| t.as_str()))
    .bind(order.cash)
    .bind(order.distance.as_ref().map(Decimal::to_string))
    .bind(amount(order, PriceCategory::CityTour))
    .bind(amount(order, PriceCategory::ExtraStops))
    .bind(amount(order, PriceCategory::Overnight))
    .bind(amount(order, PriceCategory::FaxConfirm))
    .bind(amount(order, PriceCategory::WaitingTime))
    .bind(amount(order, PriceCategory::Service))
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

async fn merge_checkpoint(pool: &SqlitePool, checkpoint: &Checkpoint) -> Result<bool, DbError> {
    let result = sqlx::query(
        "INSERT INTO checkpoints \
             (checkpoint_id, lat, lon, place_id, company, street, city, \
              postal_code, country, street_name, street_number, as_scraped) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
         ON CONFLICT (checkpoint_id) DO NOTHING",
    )
    .bind(&checkpoint.checkpoint_id)
    .bind(checkpoint.lat)
    .bind(checkpoint.lon)
    .bind(checkpoint.place_id.as_deref())
    .bind(checkpoint.company.as_deref())
    .bind(checkpoint.street.as_deref())
    .bind(checkpoint.city.as_deref())
    .bind(checkpoint.postal_code.as_deref())
    .bind(checkpoint.country.as_deref())
    .bind(checkpoint.street_name.as_deref())
    .bind(checkpoint.street_number.as_deref())
    .bind(&checkpoint.as_scraped)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

async fn merge_checkin(pool: &SqlitePool, checkin: &Checkin) -> Result<bool, DbError> {
    let result = sqlx::query(
        "INSERT INTO checkins \
             (checkin_id, checkpoint_id, order_id, purpose, timestamp, after_time, until_time) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (checkin_id) DO NOTHING",
    )
    .bind(&checkin.checkin_id)
    .bind(&checkin.checkpoint_id)
    .bind(checkin.order_id)
    .bind(checkin.purpose.map(|p| p.as_str()))
    .bind(checkin.timestamp.map(|t| t.to_string()))
    .bind(checkin.after_time.map(|t| t.to_string()))
    .bind(checkin.until_time.map(|t| t.to_string()))
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

fn amount(order: &Order, category: PriceCategory) -> Option<String> {
    order.amounts.get(&category).map(Decimal::to_string)
}
