use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

use crate::model::role::Role;

/// admin_code -> admin user id. Registrations resolve the code here
/// before falling back to the database.
pub static ADMIN_CODE_CACHE: Lazy<Cache<String, u64>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(100_000)
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

/// Remember a code -> admin binding
pub async fn bind(code: &str, admin_id: u64) {
    ADMIN_CODE_CACHE.insert(code.to_string(), admin_id).await;
}

/// Cached admin id for a code, if known
pub async fn lookup(code: &str) -> Option<u64> {
    ADMIN_CODE_CACHE.get(code).await
}

/// Drop a code after rekeying or admin deletion
pub async fn forget(code: &str) {
    ADMIN_CODE_CACHE.invalidate(code).await;
}

/// Batch insert bindings
async fn batch_bind(rows: &[(String, u64)]) {
    let futures: Vec<_> = rows
        .iter()
        .map(|(code, admin_id)| ADMIN_CODE_CACHE.insert(code.clone(), *admin_id))
        .collect();

    futures::future::join_all(futures).await;
}

/// Load all admin codes into the in-memory cache (batched)
pub async fn warmup_admin_codes(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String, u64)>(
        r#"
        SELECT admin_code, id
        FROM users
        WHERE role_id = ? AND admin_code IS NOT NULL
        "#,
    )
    .bind(Role::Admin.id())
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let (code, admin_id) = row?;
        batch.push((code, admin_id));
        total_count += 1;

        if batch.len() >= batch_size {
            batch_bind(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        batch_bind(&batch).await;
    }

    log::info!("Admin code cache warmup complete: {} tenants", total_count);

    Ok(())
}
