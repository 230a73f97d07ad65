//! Settings database operations
//!
//! Key/value accessors for coefficient overrides and harvest thresholds.
//! A missing key means "use the default"; a present but unparseable or
//! out-of-range value is an error rather than a silent fallback.

use sqlx::{Pool, Sqlite};

use deepage_common::models::CoefficientOverrides;
use deepage_common::params::ThresholdOverrides;
use deepage_common::EngineParams;

use crate::error::{EngineError, Result};

pub const TCI_OVERRIDE: &str = "tci_override";
pub const FRI_OVERRIDE: &str = "fri_override";
pub const BRI_OVERRIDE: &str = "bri_override";
pub const OPTIMAL_QUALITY_THRESHOLD: &str = "optimal_quality_threshold";
pub const OFF_FLAVOR_THRESHOLD: &str = "off_flavor_threshold";
pub const AROMA_THRESHOLD: &str = "aroma_threshold";

/// Largest accepted coefficient override
const MAX_COEFFICIENT: f64 = 100.0;

/// Stored coefficient overrides
///
/// Each must be finite and in (0, 100].
pub async fn get_coefficient_overrides(db: &Pool<Sqlite>) -> Result<CoefficientOverrides> {
    Ok(CoefficientOverrides {
        tci: get_coefficient(db, TCI_OVERRIDE).await?,
        fri: get_coefficient(db, FRI_OVERRIDE).await?,
        bri: get_coefficient(db, BRI_OVERRIDE).await?,
    })
}

/// Stored harvest thresholds
///
/// Each must lie in [0, 100].
pub async fn get_threshold_overrides(db: &Pool<Sqlite>) -> Result<ThresholdOverrides> {
    Ok(ThresholdOverrides {
        optimal_quality_threshold: get_threshold(db, OPTIMAL_QUALITY_THRESHOLD).await?,
        aroma_threshold: get_threshold(db, AROMA_THRESHOLD).await?,
        off_flavor_threshold: get_threshold(db, OFF_FLAVOR_THRESHOLD).await?,
    })
}

/// Apply stored thresholds to `base` and read coefficient overrides
pub async fn load_engine_settings(
    db: &Pool<Sqlite>,
    base: &EngineParams,
) -> Result<(EngineParams, CoefficientOverrides)> {
    let thresholds = get_threshold_overrides(db).await?;
    let overrides = get_coefficient_overrides(db).await?;
    let params = base.with_thresholds(&thresholds);

    tracing::debug!(
        optimal_quality_threshold = params.optimal_quality_threshold,
        aroma_threshold = params.aroma_threshold,
        off_flavor_threshold = params.off_flavor_threshold,
        coefficient_overrides = !overrides.is_empty(),
        "Loaded stored engine settings"
    );

    Ok((params, overrides))
}

/// Store (or clear, with `None`) one coefficient override
pub async fn set_coefficient_override(
    db: &Pool<Sqlite>,
    key: &str,
    value: Option<f64>,
) -> Result<()> {
    match value {
        Some(v) => {
            check_coefficient(key, v)?;
            set_setting(db, key, v).await
        }
        None => delete_setting(db, key).await,
    }
}

/// Store one threshold
pub async fn set_threshold(db: &Pool<Sqlite>, key: &str, value: f64) -> Result<()> {
    check_threshold(key, value)?;
    set_setting(db, key, value).await
}

async fn get_coefficient(db: &Pool<Sqlite>, key: &str) -> Result<Option<f64>> {
    let value = get_setting::<f64>(db, key).await?;
    if let Some(v) = value {
        check_coefficient(key, v)?;
    }
    Ok(value)
}

async fn get_threshold(db: &Pool<Sqlite>, key: &str) -> Result<Option<f64>> {
    let value = get_setting::<f64>(db, key).await?;
    if let Some(v) = value {
        check_threshold(key, v)?;
    }
    Ok(value)
}

fn check_coefficient(key: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 && value <= MAX_COEFFICIENT {
        Ok(())
    } else {
        Err(EngineError::InvalidSetting {
            key: key.to_string(),
            message: format!("{} is outside (0, {}]", value, MAX_COEFFICIENT),
        })
    }
}

fn check_threshold(key: &str, value: f64) -> Result<()> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(EngineError::InvalidSetting {
            key: key.to_string(),
            message: format!("{} is outside [0, 100]", value),
        })
    }
}

/// Generic setting getter
async fn get_setting<T>(db: &Pool<Sqlite>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let row: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await?;

    match row {
        Some((value,)) => {
            let parsed = value
                .trim()
                .parse::<T>()
                .map_err(|e| EngineError::InvalidSetting {
                    key: key.to_string(),
                    message: format!("cannot parse {:?}: {}", value, e),
                })?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

/// Generic setting setter (upsert)
async fn set_setting<T>(db: &Pool<Sqlite>, key: &str, value: T) -> Result<()>
where
    T: std::fmt::Display,
{
    sqlx::query(
        "INSERT INTO settings (key, value) VALUES (?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(value.to_string())
    .execute(db)
    .await?;

    Ok(())
}

async fn delete_setting(db: &Pool<Sqlite>, key: &str) -> Result<()> {
    sqlx::query("DELETE FROM settings WHERE key = ?")
        .bind(key)
        .execute(db)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    /// In-memory database with the production settings table
    async fn setup_test_db() -> SqlitePool {
        // One connection: every new in-memory connection is a fresh database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::init_tables(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_empty_table_gives_defaults() {
        let pool = setup_test_db().await;

        let (params, overrides) = load_engine_settings(&pool, &EngineParams::default())
            .await
            .unwrap();

        assert_eq!(params, EngineParams::default());
        assert!(overrides.is_empty());
    }

    #[tokio::test]
    async fn test_stored_values_applied() {
        let pool = setup_test_db().await;
        set_threshold(&pool, OFF_FLAVOR_THRESHOLD, 55.0).await.unwrap();
        set_coefficient_override(&pool, FRI_OVERRIDE, Some(0.7))
            .await
            .unwrap();

        let (params, overrides) = load_engine_settings(&pool, &EngineParams::default())
            .await
            .unwrap();

        assert_eq!(params.off_flavor_threshold, 55.0);
        assert_eq!(params.optimal_quality_threshold, 70.0);
        assert_eq!(overrides.fri, Some(0.7));
        assert_eq!(overrides.tci, None);
    }

    #[tokio::test]
    async fn test_override_update_and_clear() {
        let pool = setup_test_db().await;

        set_coefficient_override(&pool, TCI_OVERRIDE, Some(0.4))
            .await
            .unwrap();
        set_coefficient_override(&pool, TCI_OVERRIDE, Some(0.5))
            .await
            .unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM settings WHERE key = 'tci_override'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1, "Should have exactly one entry after update");
        assert_eq!(get_coefficient_overrides(&pool).await.unwrap().tci, Some(0.5));

        set_coefficient_override(&pool, TCI_OVERRIDE, None)
            .await
            .unwrap();
        assert_eq!(get_coefficient_overrides(&pool).await.unwrap().tci, None);
    }

    #[tokio::test]
    async fn test_unparseable_value_is_error() {
        let pool = setup_test_db().await;
        sqlx::query("INSERT INTO settings (key, value) VALUES ('aroma_threshold', 'high')")
            .execute(&pool)
            .await
            .unwrap();

        let result = get_threshold_overrides(&pool).await;

        assert!(matches!(result, Err(EngineError::InvalidSetting { .. })));
    }

    #[tokio::test]
    async fn test_out_of_range_values_rejected() {
        let pool = setup_test_db().await;

        assert!(set_threshold(&pool, OPTIMAL_QUALITY_THRESHOLD, 120.0)
            .await
            .is_err());
        assert!(set_coefficient_override(&pool, BRI_OVERRIDE, Some(-1.0))
            .await
            .is_err());

        sqlx::query("INSERT INTO settings (key, value) VALUES ('bri_override', '0')")
            .execute(&pool)
            .await
            .unwrap();
        assert!(get_coefficient_overrides(&pool).await.is_err());
    }
}
