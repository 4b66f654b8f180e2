use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures::StreamExt;
use once_cell::sync::Lazy;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use sqlx::MySqlPool;

/// Expected capacity and false-positive rate.
/// Tune these based on real headcount.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static EMPLOYEE_FILTER: Lazy<RwLock<CuckooFilter<u64>>> = Lazy::new(|| {
    RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE))
});

/// Until the warmup has run, the filter knows nothing and must not be used
/// to fail lookups.
static WARMED: AtomicBool = AtomicBool::new(false);

pub fn mark_warmed() {
    WARMED.store(true, Ordering::Release);
}

/// Check if an employee id might exist (false positives possible).
/// Before warmup this always answers true, so the directory stays the
/// source of truth.
pub fn might_exist(employee_id: u64) -> bool {
    if !WARMED.load(Ordering::Acquire) {
        return true;
    }
    EMPLOYEE_FILTER
        .read()
        .expect("employee filter poisoned")
        .contains(&employee_id)
}

/// Insert a single employee id into the filter
pub fn insert(employee_id: u64) {
    EMPLOYEE_FILTER
        .write()
        .expect("employee filter poisoned")
        .add(&employee_id);
}

/// Remove an employee id from the filter
pub fn remove(employee_id: u64) {
    EMPLOYEE_FILTER
        .write()
        .expect("employee filter poisoned")
        .remove(&employee_id);
}

/// Warm up the employee filter using streaming + batching
pub async fn warmup_employee_filter(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (u64,)>("SELECT id FROM employees").fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (employee_id,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;

        batch.push(employee_id);
        total += 1;

        if batch.len() == batch_size {
            insert_batch(&batch);
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch);
    }

    mark_warmed();
    log::info!("Employee filter warmup complete: {} employees", total);
    Ok(())
}

/// Insert a batch of employee ids
fn insert_batch(employee_ids: &[u64]) {
    let mut filter = EMPLOYEE_FILTER.write().expect("employee filter poisoned");

    for employee_id in employee_ids {
        filter.add(employee_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test: the filter is a process-wide static, so membership and
    // warmup behavior are asserted in one sequence.
    #[test]
    fn filter_tracks_membership_once_warmed() {
        insert(424_242);
        mark_warmed();

        assert!(might_exist(424_242));
        assert!(!might_exist(987_654_321));

        remove(424_242);
        assert!(!might_exist(424_242));
    }
}
