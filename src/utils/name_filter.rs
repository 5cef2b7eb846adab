use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures::StreamExt;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;

/// Login is by first+last name, so the pair must be unique. The filter
/// gives registration a fast negative before the database is consulted.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static NAME_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

#[inline]
fn key(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name.to_lowercase(), last_name.to_lowercase())
}

/// Check if a name pair might be taken (false positives possible)
pub fn might_exist(first_name: &str, last_name: &str) -> bool {
    let key = key(first_name, last_name);
    NAME_FILTER
        .read()
        .expect("name filter poisoned")
        .contains(&key)
}

/// Insert a name pair after a successful registration
pub fn insert(first_name: &str, last_name: &str) {
    let key = key(first_name, last_name);
    NAME_FILTER
        .write()
        .expect("name filter poisoned")
        .add(&key);
}

/// Remove a name pair after a user is deleted
pub fn remove(first_name: &str, last_name: &str) {
    let key = key(first_name, last_name);
    NAME_FILTER
        .write()
        .expect("name filter poisoned")
        .remove(&key);
}

/// Warm up the name filter using streaming + batching
pub async fn warmup_name_filter(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream =
        sqlx::query_as::<_, (String, String)>("SELECT first_name, last_name FROM users")
            .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (first_name, last_name) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;

        batch.push(key(&first_name, &last_name));
        total += 1;

        if batch.len() == batch_size {
            insert_batch(&batch);
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch);
    }

    log::info!("Name filter warmup complete: {} users", total);
    Ok(())
}

fn insert_batch(keys: &[String]) {
    let mut filter = NAME_FILTER.write().expect("name filter poisoned");

    for key in keys {
        filter.add(key);
    }
}
