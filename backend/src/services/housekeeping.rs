//! Background housekeeping jobs
//!
//! Two daily jobs: deactivate customer accounts that have not logged in for
//! 30 days, and purge products that are older than 14 days and were never
//! sold. Both run on a shared 24h interval; failures are logged and retried
//! on the next tick.

use sqlx::PgPool;
use std::time::Duration;

const TICK: Duration = Duration::from_secs(24 * 60 * 60);

/// Spawn the daily housekeeping jobs
pub fn spawn_daily_jobs(db: PgPool) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK);
        // The first tick fires immediately; skip it so a restart loop does
        // not hammer the cleanup queries.
        interval.tick().await;

        loop {
            interval.tick().await;

            if let Err(e) = deactivate_idle_customers(&db).await {
                tracing::error!(error = %e, "idle-customer deactivation failed");
            }
            if let Err(e) = purge_stale_products(&db).await {
                tracing::error!(error = %e, "stale-product purge failed");
            }
        }
    });
}

/// Deactivate customer accounts idle for 30 days
async fn deactivate_idle_customers(db: &PgPool) -> Result<(), sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE users SET status = 'TIDAK_AKTIF'
        WHERE role = 'PELANGGAN'
          AND status = 'AKTIF'
          AND last_login_at IS NOT NULL
          AND last_login_at < NOW() - INTERVAL '30 days'
        "#,
    )
    .execute(db)
    .await?;

    if result.rows_affected() > 0 {
        tracing::info!(count = result.rows_affected(), "deactivated idle customers");
    }
    Ok(())
}

/// Delete products older than 14 days that were never ordered
async fn purge_stale_products(db: &PgPool) -> Result<(), sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM products p
        WHERE p.created_at < NOW() - INTERVAL '14 days'
          AND NOT EXISTS (SELECT 1 FROM order_items oi WHERE oi.product_id = p.id)
        "#,
    )
    .execute(db)
    .await?;

    if result.rows_affected() > 0 {
        tracing::info!(count = result.rows_affected(), "purged unsold stale products");
    }
    Ok(())
}
