//! Dashboard counters and the production funnel
//!
//! The funnel follows a combination from "could exist" to "published":
//! possible, planned, rendered, imported, fully annotated. Everything is
//! recomputed on each call; empty tables yield zeros.

use crate::Result;
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::BTreeMap;

/// Production funnel counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Funnel {
    /// Combinations the current catalogue allows
    pub total_possible: i64,
    /// Render jobs of any status
    pub total_planned: i64,
    /// Jobs that are rendered or complete
    pub total_rendered: i64,
    /// Distinct jobs with at least one media asset
    pub total_imported: i64,
    /// Job-linked media assets with every publishing field filled in
    pub total_meta_complete: i64,
}

/// Row counts shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardCounts {
    pub archetypes: i64,
    pub characters: i64,
    pub ingredients: i64,
    pub output_types: i64,
    pub media_total: i64,
    pub top_layer: i64,
}

/// Combinations one output type allows
///
/// `eligible_characters` times the product of each required category's
/// ingredient count, where an empty category counts as one. An output type
/// with no requirements allows none.
pub fn combinations_for(eligible_characters: i64, category_sizes: &[i64]) -> i64 {
    if category_sizes.is_empty() {
        return 0;
    }
    category_sizes
        .iter()
        .fold(eligible_characters, |acc, &size| acc.saturating_mul(size.max(1)))
}

async fn count(conn: &mut SqliteConnection, sql: &str) -> Result<i64> {
    let n: i64 = sqlx::query_scalar(sql).fetch_one(conn).await?;
    Ok(n)
}

/// Compute the funnel from current data
///
/// All counts are read inside one transaction so they share a snapshot.
pub async fn compute_funnel(pool: &SqlitePool) -> Result<Funnel> {
    let mut tx = pool.begin().await?;
    let funnel = funnel_snapshot(&mut *tx).await?;
    tx.commit().await?;
    Ok(funnel)
}

/// Compute the funnel on an open connection or transaction
pub async fn funnel_snapshot(conn: &mut SqliteConnection) -> Result<Funnel> {
    let eligible = count(
        &mut *conn,
        "SELECT COUNT(*) FROM characters WHERE status != 'retired'",
    )
    .await?;

    // One row per requirement with the size of its category
    let requirement_sizes: Vec<(i64, i64)> = sqlx::query_as(
        r#"
        SELECT otr.output_type_id,
               (SELECT COUNT(*) FROM ingredients i WHERE i.category_id = otr.category_id)
        FROM output_type_requirements otr
        JOIN output_types ot ON ot.id = otr.output_type_id
        ORDER BY otr.output_type_id, otr.id
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut sizes_by_type: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
    for (output_type_id, size) in requirement_sizes {
        sizes_by_type.entry(output_type_id).or_default().push(size);
    }

    let total_possible = sizes_by_type
        .values()
        .map(|sizes| combinations_for(eligible, sizes))
        .fold(0i64, |acc, n| acc.saturating_add(n));

    Ok(Funnel {
        total_possible,
        total_planned: count(&mut *conn, "SELECT COUNT(*) FROM render_jobs").await?,
        total_rendered: count(
            &mut *conn,
            "SELECT COUNT(*) FROM render_jobs WHERE status IN ('rendered', 'complete')",
        )
        .await?,
        total_imported: count(
            &mut *conn,
            "SELECT COUNT(DISTINCT job_id) FROM media_assets WHERE job_id IS NOT NULL",
        )
        .await?,
        total_meta_complete: count(
            &mut *conn,
            r#"
            SELECT COUNT(*) FROM media_assets
            WHERE job_id IS NOT NULL
              AND title != '' AND description != '' AND tags != ''
              AND seo_title != '' AND seo_description != ''
            "#,
        )
        .await?,
    })
}

/// Row counts for the dashboard tiles
pub async fn dashboard_counts(pool: &SqlitePool) -> Result<DashboardCounts> {
    let mut tx = pool.begin().await?;
    let counts = DashboardCounts {
        archetypes: count(&mut *tx, "SELECT COUNT(*) FROM archetypes").await?,
        characters: count(&mut *tx, "SELECT COUNT(*) FROM characters").await?,
        ingredients: count(&mut *tx, "SELECT COUNT(*) FROM ingredients").await?,
        output_types: count(&mut *tx, "SELECT COUNT(*) FROM output_types").await?,
        media_total: count(&mut *tx, "SELECT COUNT(*) FROM media_assets").await?,
        top_layer: count(&mut *tx, "SELECT COUNT(*) FROM top_layer_media").await?,
    };
    tx.commit().await?;
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_requirements_contributes_nothing() {
        assert_eq!(combinations_for(7, &[]), 0);
    }

    #[test]
    fn test_empty_category_counts_as_one() {
        assert_eq!(combinations_for(3, &[4, 0, 2]), 24);
    }

    #[test]
    fn test_no_eligible_characters() {
        assert_eq!(combinations_for(0, &[5, 5]), 0);
    }
}
