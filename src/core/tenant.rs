//! Tenant directory: admin-code membership lookups and the scoping gate
//! every admin-facing operation on worker data goes through.

use crate::core::error::CoreError;
use crate::model::geofence::Geofence;
use crate::model::role::Role;
use crate::model::user::User;
use crate::store::Store;

/// The authenticated identity a request acts as, as far as the engine
/// is concerned. Built by the auth layer from verified claims.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: u64,
    pub role: Role,
    pub admin_code: Option<String>,
}

/// The admin whose admin code equals the worker's. `NoTenantAdmin` when
/// the worker carries no code or no admin matches it.
pub async fn admin_of<S: Store>(store: &S, worker: &User) -> Result<User, CoreError> {
    admin_for_code(store, worker.admin_code.as_deref()).await
}

pub async fn admin_for_code<S: Store>(store: &S, code: Option<&str>) -> Result<User, CoreError> {
    let code = code.ok_or(CoreError::NoTenantAdmin)?;
    store
        .find_admin_by_code(code)
        .await?
        .ok_or(CoreError::NoTenantAdmin)
}

/// All workers registered under the admin's code. An admin without a
/// code (should not happen) owns nobody.
pub async fn workers_of<S: Store>(store: &S, admin: &User) -> Result<Vec<User>, CoreError> {
    match admin.admin_code.as_deref() {
        Some(code) => Ok(store.workers_by_code(code).await?),
        None => Ok(Vec::new()),
    }
}

/// Geofences are keyed by the admin's identity, not the admin code.
pub async fn geofences_of<S: Store>(store: &S, admin_id: u64) -> Result<Vec<Geofence>, CoreError> {
    Ok(store.geofences_by_admin(admin_id).await?)
}

/// Resolve `worker_id` and verify the actor may touch that worker's
/// data: admin or master role, and the worker's admin code must equal
/// the actor's own. The master account carries no admin code, so it is
/// deliberately shut out of worker-level data; its reach covers admin
/// account management only.
pub async fn require_worker_in_tenant<S: Store>(
    store: &S,
    actor: &Actor,
    worker_id: u64,
) -> Result<User, CoreError> {
    if !matches!(actor.role, Role::Admin | Role::Master) {
        return Err(CoreError::Forbidden("admin or master role required"));
    }

    let worker = store
        .find_user(worker_id)
        .await?
        .ok_or(CoreError::NotFound("worker"))?;

    if worker.role() != Some(Role::Worker) {
        return Err(CoreError::NotFound("worker"));
    }

    match (actor.admin_code.as_deref(), worker.admin_code.as_deref()) {
        (Some(own), Some(theirs)) if own == theirs => Ok(worker),
        _ => Err(CoreError::Forbidden("worker belongs to another tenant")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::user::NewUser;
    use crate::store::mem::MemStore;

    fn new_user(first: &str, role: Role, code: Option<&str>) -> NewUser {
        NewUser {
            first_name: first.to_string(),
            last_name: "Svensson".to_string(),
            password_hash: "x".to_string(),
            role_id: role.id(),
            admin_code: code.map(str::to_string),
        }
    }

    fn actor(user: &User) -> Actor {
        Actor {
            user_id: user.id,
            role: user.role().unwrap(),
            admin_code: user.admin_code.clone(),
        }
    }

    #[actix_web::test]
    async fn worker_resolves_to_the_admin_sharing_its_code() {
        let store = MemStore::new();
        // Another admin first, so lookup cannot be positional.
        store.seed_user(new_user("Berit", Role::Admin, Some("AC9"))).await;
        let admin_id = store.seed_user(new_user("Anna", Role::Admin, Some("AC1"))).await;
        let worker_id = store.seed_user(new_user("Wille", Role::Worker, Some("AC1"))).await;

        let worker = store.find_user(worker_id).await.unwrap().unwrap();
        assert_eq!(worker.admin_code.as_deref(), Some("AC1"));

        let admin = admin_of(&store, &worker).await.unwrap();
        assert_eq!(admin.id, admin_id);
    }

    #[actix_web::test]
    async fn missing_admin_is_a_distinct_error() {
        let store = MemStore::new();
        let worker_id = store.seed_user(new_user("Wille", Role::Worker, Some("GONE"))).await;
        let worker = store.find_user(worker_id).await.unwrap().unwrap();

        assert!(matches!(
            admin_of(&store, &worker).await,
            Err(CoreError::NoTenantAdmin)
        ));

        let codeless = User {
            admin_code: None,
            ..worker
        };
        assert!(matches!(
            admin_of(&store, &codeless).await,
            Err(CoreError::NoTenantAdmin)
        ));
    }

    #[actix_web::test]
    async fn workers_of_returns_only_the_tenant() {
        let store = MemStore::new();
        let admin_id = store.seed_user(new_user("Anna", Role::Admin, Some("AC1"))).await;
        store.seed_user(new_user("Wille", Role::Worker, Some("AC1"))).await;
        store.seed_user(new_user("Walde", Role::Worker, Some("AC1"))).await;
        store.seed_user(new_user("Other", Role::Worker, Some("AC2"))).await;

        let admin = store.find_user(admin_id).await.unwrap().unwrap();
        let workers = workers_of(&store, &admin).await.unwrap();
        assert_eq!(workers.len(), 2);
        assert!(workers.iter().all(|w| w.admin_code.as_deref() == Some("AC1")));
    }

    #[actix_web::test]
    async fn scoping_gate_rejects_foreign_tenants_and_master() {
        let store = MemStore::new();
        let admin_a = store.seed_user(new_user("Anna", Role::Admin, Some("AC1"))).await;
        let admin_b = store.seed_user(new_user("Beata", Role::Admin, Some("AC2"))).await;
        let master = store.seed_user(new_user("Moa", Role::Master, None)).await;
        let worker = store.seed_user(new_user("Wille", Role::Worker, Some("AC1"))).await;

        let admin_a = store.find_user(admin_a).await.unwrap().unwrap();
        let admin_b = store.find_user(admin_b).await.unwrap().unwrap();
        let master = store.find_user(master).await.unwrap().unwrap();

        assert!(require_worker_in_tenant(&store, &actor(&admin_a), worker).await.is_ok());
        assert!(matches!(
            require_worker_in_tenant(&store, &actor(&admin_b), worker).await,
            Err(CoreError::Forbidden(_))
        ));
        // Master manages admin accounts, never worker data.
        assert!(matches!(
            require_worker_in_tenant(&store, &actor(&master), worker).await,
            Err(CoreError::Forbidden(_))
        ));
    }

    #[actix_web::test]
    async fn scoping_gate_refuses_non_worker_targets() {
        let store = MemStore::new();
        let admin = store.seed_user(new_user("Anna", Role::Admin, Some("AC1"))).await;
        let other_admin = store.seed_user(new_user("Alva", Role::Admin, Some("AC1"))).await;
        let admin = store.find_user(admin).await.unwrap().unwrap();

        assert!(matches!(
            require_worker_in_tenant(&store, &actor(&admin), other_admin).await,
            Err(CoreError::NotFound(_))
        ));
        assert!(matches!(
            require_worker_in_tenant(&store, &actor(&admin), 9999).await,
            Err(CoreError::NotFound(_))
        ));
    }
}
