//! Dock shortcut configuration

use crate::models::{DockSlot, DOCK_SLOTS};
use crate::Result;
use sqlx::SqlitePool;
use tracing::info;

pub async fn list_slots(pool: &SqlitePool) -> Result<Vec<DockSlot>> {
    let rows = sqlx::query_as::<_, DockSlot>("SELECT * FROM dock_config ORDER BY slot")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Overwrite slot labels and urls
///
/// `entries[n]` is written to slot `n + 1`; slots beyond [`DOCK_SLOTS`] are
/// ignored.
pub async fn save_slots(pool: &SqlitePool, entries: &[(String, String)]) -> Result<()> {
    let mut tx = pool.begin().await?;
    for (slot, (label, url)) in (1..=DOCK_SLOTS).zip(entries) {
        sqlx::query("UPDATE dock_config SET label = ?, url = ? WHERE slot = ?")
            .bind(label)
            .bind(url)
            .bind(slot)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;
    info!("Saved dock configuration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_database;

    #[tokio::test]
    async fn test_save_slots_overwrites_in_order() {
        let pool = init_memory_database().await.unwrap();
        let entries: Vec<(String, String)> = (1..=6)
            .map(|n| (format!("Label {}", n), format!("/path/{}", n)))
            .collect();

        save_slots(&pool, &entries).await.unwrap();

        let slots = list_slots(&pool).await.unwrap();
        assert_eq!(slots.len(), 5);
        assert_eq!(slots[0].label, "Label 1");
        assert_eq!(slots[4].url, "/path/5");
    }
}
