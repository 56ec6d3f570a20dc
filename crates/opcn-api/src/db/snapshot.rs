//! Snapshot persistence: one JSONB row keyed by a versioned snapshot key.

use opcn_store::OnchainSnapshot;
use sqlx::PgPool;

/// Versioned key for the snapshot row. Bump on incompatible layout changes.
const SNAPSHOT_KEY: &str = "opcn:onchain:v1";

/// Load the persisted snapshot, if one exists.
pub async fn load(pool: &PgPool) -> Result<Option<OnchainSnapshot>, sqlx::Error> {
    let row: Option<(serde_json::Value,)> =
        sqlx::query_as("SELECT body FROM onchain_snapshot WHERE snapshot_key = $1")
            .bind(SNAPSHOT_KEY)
            .fetch_optional(pool)
            .await?;

    match row {
        Some((body,)) => {
            let snapshot = serde_json::from_value(body)
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
            Ok(Some(snapshot))
        }
        None => Ok(None),
    }
}

/// Upsert the snapshot row with the current store contents.
pub async fn save(pool: &PgPool, snapshot: &OnchainSnapshot) -> Result<(), sqlx::Error> {
    let body = serde_json::to_value(snapshot).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
    sqlx::query(
        "INSERT INTO onchain_snapshot (snapshot_key, body, updated_at)
         VALUES ($1, $2, now())
         ON CONFLICT (snapshot_key)
         DO UPDATE SET body = EXCLUDED.body, updated_at = now()",
    )
    .bind(SNAPSHOT_KEY)
    .bind(body)
    .execute(pool)
    .await?;
    Ok(())
}
