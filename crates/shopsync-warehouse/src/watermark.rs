//! Reads the sync watermark from a loaded table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::load::Destination;
use crate::WarehouseError;

/// Returns `MAX(updated_at)` from `dest`, or `None` when the table does not
/// exist yet or holds no rows.
///
/// `updated_at` is stored as text; it is cast to `timestamptz` so values with
/// different UTC offsets compare correctly.
///
/// # Errors
///
/// Returns [`WarehouseError::Sqlx`] if the table lacks an `updated_at` column
/// or a value does not parse as a timestamp.
pub async fn last_updated_at(
    pool: &PgPool,
    dest: &Destination,
) -> Result<Option<DateTime<Utc>>, WarehouseError> {
    let exists: Option<String> = sqlx::query_scalar("SELECT to_regclass($1)::text")
        .bind(dest.qualified())
        .fetch_one(pool)
        .await?;
    if exists.is_none() {
        tracing::info!(destination = %dest, "watermark table not found");
        return Ok(None);
    }

    let max: Option<DateTime<Utc>> = sqlx::query_scalar(&watermark_sql(dest))
        .fetch_one(pool)
        .await?;
    tracing::info!(destination = %dest, watermark = ?max, "watermark read");
    Ok(max)
}

fn watermark_sql(dest: &Destination) -> String {
    format!(
        "SELECT MAX(NULLIF(updated_at, '')::timestamptz) FROM {}",
        dest.qualified()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watermark_sql_casts_text_to_timestamptz() {
        let dest = Destination::parse("raw.orders_raw").unwrap();
        assert_eq!(
            watermark_sql(&dest),
            "SELECT MAX(NULLIF(updated_at, '')::timestamptz) FROM \"raw\".\"orders_raw\""
        );
    }
}
