use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

/// employee id => display name, for eager reference resolution in list
/// responses without a directory round-trip per row.
pub static EMPLOYEE_NAME_CACHE: Lazy<Cache<u64, String>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(500_000) // tune based on memory
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

/// Remember a single employee's display name
pub async fn remember(employee_id: u64, display_name: String) {
    EMPLOYEE_NAME_CACHE.insert(employee_id, display_name).await;
}

/// Cached display name, if any
pub async fn display_name(employee_id: u64) -> Option<String> {
    EMPLOYEE_NAME_CACHE.get(&employee_id).await
}

/// Batch remember display names
async fn batch_remember(entries: &[(u64, String)]) {
    let futures: Vec<_> = entries
        .iter()
        .map(|(id, name)| EMPLOYEE_NAME_CACHE.insert(*id, name.clone()))
        .collect();

    // Await all insertions concurrently
    futures::future::join_all(futures).await;
}

/// Load employee display names into the in-memory cache (batched)
pub async fn warmup_employee_cache(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (u64, String, String)>(
        r#"
        SELECT id, first_name, last_name
        FROM employees
        ORDER BY id
        "#,
    )
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let (id, first_name, last_name) = row?;
        batch.push((id, format!("{} {}", first_name, last_name)));
        total_count += 1;

        if batch.len() >= batch_size {
            batch_remember(&batch).await;
            batch.clear();
        }
    }

    // Insert any remaining entries
    if !batch.is_empty() {
        batch_remember(&batch).await;
    }

    log::info!(
        "Employee name cache warmup complete: {} employees",
        total_count
    );

    Ok(())
}
