//! Attendance session state machine. Per worker the state is derived:
//! clocked in iff an open timestamp row exists.

use chrono::{DateTime, Utc};

use crate::core::admission::{self, Admission};
use crate::core::error::CoreError;
use crate::core::geo::Coord;
use crate::core::tenant::{self, Actor};
use crate::model::timestamp::Timestamp;
use crate::store::Store;

/// Admin edit payload; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TimestampEdit {
    pub clock_in: Option<DateTime<Utc>>,
    pub clock_out: Option<DateTime<Utc>>,
    pub break_duration: Option<i32>,
    pub lunch_duration: Option<i32>,
}

impl TimestampEdit {
    pub fn is_empty(&self) -> bool {
        self.clock_in.is_none()
            && self.clock_out.is_none()
            && self.break_duration.is_none()
            && self.lunch_duration.is_none()
    }
}

/// Clock a worker in at `coord`.
///
/// Resolves the worker's tenant admin, evaluates that admin's geofences
/// and, on admission, inserts the open record. The insert is conditional
/// on no open record existing, so a concurrent double clock-in loses the
/// race at the store instead of creating a second open row. Nothing is
/// persisted on a denied admission.
pub async fn clock_in<S: Store>(
    store: &S,
    actor: &Actor,
    coord: Coord,
    now: DateTime<Utc>,
) -> Result<u64, CoreError> {
    let admin = tenant::admin_for_code(store, actor.admin_code.as_deref()).await?;
    let fences = store.geofences_by_admin(admin.id).await?;

    let (fence_id, distance) = match admission::evaluate(coord, &fences) {
        Admission::Denied => return Err(CoreError::OutOfRange),
        Admission::Admitted { fence_id, distance } => (fence_id, distance),
    };

    tracing::debug!(worker_id = actor.user_id, fence_id, distance, "admission granted");

    let inserted = store
        .insert_timestamp_if_no_open(actor.user_id, now, coord)
        .await?;
    if !inserted {
        return Err(CoreError::InvalidTransition("already clocked in"));
    }
    Ok(fence_id)
}

/// Close the worker's open session. Break and lunch default to zero;
/// the optional coordinate is recorded as-is, no geofence check applies
/// on the way out.
pub async fn clock_out<S: Store>(
    store: &S,
    worker_id: u64,
    break_minutes: Option<i32>,
    lunch_minutes: Option<i32>,
    coord: Option<Coord>,
    now: DateTime<Utc>,
) -> Result<(), CoreError> {
    if break_minutes.is_some_and(|m| m < 0) || lunch_minutes.is_some_and(|m| m < 0) {
        return Err(CoreError::Validation("durations must not be negative".into()));
    }

    let closed = store
        .close_open_timestamp(
            worker_id,
            now,
            break_minutes.unwrap_or(0),
            lunch_minutes.unwrap_or(0),
            coord,
        )
        .await?;
    if !closed {
        return Err(CoreError::InvalidTransition("not clocked in"));
    }
    Ok(())
}

/// Overwrite fields of a record on behalf of an admin or master.
/// Tenant-scoped through the record's worker. Each overwritten field
/// raises its own edited flag plus the aggregate one; worked time is
/// never recomputed here, it stays a derived-on-read quantity.
pub async fn edit_timestamp<S: Store>(
    store: &S,
    actor: &Actor,
    timestamp_id: u64,
    edit: TimestampEdit,
) -> Result<Timestamp, CoreError> {
    if edit.is_empty() {
        return Err(CoreError::Validation("no fields to edit".into()));
    }

    let record = store
        .find_timestamp(timestamp_id)
        .await?
        .ok_or(CoreError::NotFound("timestamp"))?;
    tenant::require_worker_in_tenant(store, actor, record.user_id).await?;

    store.apply_timestamp_edit(timestamp_id, &edit).await?;
    store
        .find_timestamp(timestamp_id)
        .await?
        .ok_or(CoreError::NotFound("timestamp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;
    use crate::model::user::NewUser;
    use crate::store::mem::MemStore;
    use chrono::{Duration, TimeZone};

    const CODE: &str = "AC1";

    fn new_user(first: &str, role: Role, code: Option<&str>) -> NewUser {
        NewUser {
            first_name: first.to_string(),
            last_name: "Svensson".to_string(),
            password_hash: "x".to_string(),
            role_id: role.id(),
            admin_code: code.map(str::to_string),
        }
    }

    async fn tenant_with_fence(store: &MemStore) -> Actor {
        let admin_id = store.seed_user(new_user("Anna", Role::Admin, Some(CODE))).await;
        store.seed_geofence(admin_id, 59.33, 18.06, 100.0).await;
        let worker_id = store.seed_user(new_user("Wille", Role::Worker, Some(CODE))).await;
        Actor {
            user_id: worker_id,
            role: Role::Worker,
            admin_code: Some(CODE.to_string()),
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap()
    }

    #[actix_web::test]
    async fn clock_in_inside_fence_opens_a_record() {
        let store = MemStore::new();
        let worker = tenant_with_fence(&store).await;

        clock_in(&store, &worker, Coord::new(59.33, 18.061), t0()).await.unwrap();

        let open = store.open_timestamp(worker.user_id).await.unwrap().unwrap();
        assert_eq!(open.clock_in, t0());
        assert!(open.clock_out.is_none());
        assert_eq!(open.clock_in_lat, Some(59.33));
        assert_eq!(open.clock_in_lon, Some(18.061));
    }

    #[actix_web::test]
    async fn clock_in_outside_fence_creates_nothing() {
        let store = MemStore::new();
        let worker = tenant_with_fence(&store).await;

        // ~500 m south-west of the only fence
        let res = clock_in(&store, &worker, Coord::new(59.325, 18.055), t0()).await;
        assert!(matches!(res, Err(CoreError::OutOfRange)));
        assert!(store.open_timestamp(worker.user_id).await.unwrap().is_none());
        assert!(store.timestamps_for_user(worker.user_id).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn double_clock_in_is_an_invalid_transition() {
        let store = MemStore::new();
        let worker = tenant_with_fence(&store).await;
        let inside = Coord::new(59.33, 18.061);

        clock_in(&store, &worker, inside, t0()).await.unwrap();
        let res = clock_in(&store, &worker, inside, t0() + Duration::minutes(5)).await;
        assert!(matches!(res, Err(CoreError::InvalidTransition(_))));

        // Still exactly one open record.
        let all = store.timestamps_for_user(worker.user_id).await.unwrap();
        assert_eq!(all.iter().filter(|t| t.is_open()).count(), 1);
    }

    #[actix_web::test]
    async fn clock_in_without_resolvable_admin_fails_distinctly() {
        let store = MemStore::new();
        let worker_id = store.seed_user(new_user("Wille", Role::Worker, Some("NOPE"))).await;
        let worker = Actor {
            user_id: worker_id,
            role: Role::Worker,
            admin_code: Some("NOPE".to_string()),
        };

        let res = clock_in(&store, &worker, Coord::new(59.33, 18.06), t0()).await;
        assert!(matches!(res, Err(CoreError::NoTenantAdmin)));
    }

    #[actix_web::test]
    async fn clock_in_with_no_fences_is_denied() {
        let store = MemStore::new();
        store.seed_user(new_user("Anna", Role::Admin, Some(CODE))).await;
        let worker_id = store.seed_user(new_user("Wille", Role::Worker, Some(CODE))).await;
        let worker = Actor {
            user_id: worker_id,
            role: Role::Worker,
            admin_code: Some(CODE.to_string()),
        };

        let res = clock_in(&store, &worker, Coord::new(59.33, 18.06), t0()).await;
        assert!(matches!(res, Err(CoreError::OutOfRange)));
    }

    #[actix_web::test]
    async fn clock_out_closes_the_open_record() {
        let store = MemStore::new();
        let worker = tenant_with_fence(&store).await;
        clock_in(&store, &worker, Coord::new(59.33, 18.061), t0()).await.unwrap();

        let end = t0() + Duration::hours(8);
        clock_out(&store, worker.user_id, Some(30), Some(60), None, end).await.unwrap();

        assert!(store.open_timestamp(worker.user_id).await.unwrap().is_none());
        let all = store.timestamps_for_user(worker.user_id).await.unwrap();
        let record = &all[0];
        assert_eq!(record.clock_out, Some(end));
        assert_eq!(record.break_duration, Some(30));
        assert_eq!(record.lunch_duration, Some(60));
        // 8h - 30m - 60m
        assert_eq!(record.worked_minutes(), Some(6 * 60 + 30));
    }

    #[actix_web::test]
    async fn clock_out_without_open_record_is_an_invalid_transition() {
        let store = MemStore::new();
        let worker = tenant_with_fence(&store).await;

        let res = clock_out(&store, worker.user_id, None, None, None, t0()).await;
        assert!(matches!(res, Err(CoreError::InvalidTransition(_))));
    }

    #[actix_web::test]
    async fn clock_out_defaults_durations_to_zero() {
        let store = MemStore::new();
        let worker = tenant_with_fence(&store).await;
        clock_in(&store, &worker, Coord::new(59.33, 18.061), t0()).await.unwrap();

        clock_out(&store, worker.user_id, None, None, None, t0() + Duration::hours(4))
            .await
            .unwrap();
        let all = store.timestamps_for_user(worker.user_id).await.unwrap();
        assert_eq!(all[0].break_duration, Some(0));
        assert_eq!(all[0].lunch_duration, Some(0));
    }

    #[actix_web::test]
    async fn edit_sets_field_flags_and_aggregate_flag() {
        let store = MemStore::new();
        let worker = tenant_with_fence(&store).await;
        clock_in(&store, &worker, Coord::new(59.33, 18.061), t0()).await.unwrap();
        clock_out(&store, worker.user_id, Some(10), None, None, t0() + Duration::hours(8))
            .await
            .unwrap();

        let record_id = store.timestamps_for_user(worker.user_id).await.unwrap()[0].id;
        let admin = Actor {
            user_id: 1,
            role: Role::Admin,
            admin_code: Some(CODE.to_string()),
        };

        let edited = edit_timestamp(
            &store,
            &admin,
            record_id,
            TimestampEdit {
                break_duration: Some(45),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(edited.break_duration, Some(45));
        assert!(edited.break_duration_edited);
        assert!(edited.edited);
        assert!(!edited.clock_in_edited);
        assert!(!edited.clock_out_edited);
        assert!(!edited.lunch_duration_edited);
    }

    #[actix_web::test]
    async fn edit_is_refused_across_tenants_and_for_workers() {
        let store = MemStore::new();
        let worker = tenant_with_fence(&store).await;
        clock_in(&store, &worker, Coord::new(59.33, 18.061), t0()).await.unwrap();
        let record_id = store.timestamps_for_user(worker.user_id).await.unwrap()[0].id;

        let edit = TimestampEdit {
            lunch_duration: Some(15),
            ..Default::default()
        };

        let foreign_admin = Actor {
            user_id: 99,
            role: Role::Admin,
            admin_code: Some("OTHER".to_string()),
        };
        assert!(matches!(
            edit_timestamp(&store, &foreign_admin, record_id, edit.clone()).await,
            Err(CoreError::Forbidden(_))
        ));

        assert!(matches!(
            edit_timestamp(&store, &worker, record_id, edit).await,
            Err(CoreError::Forbidden(_))
        ));
    }

    #[actix_web::test]
    async fn empty_edit_is_rejected() {
        let store = MemStore::new();
        let admin = Actor {
            user_id: 1,
            role: Role::Admin,
            admin_code: Some(CODE.to_string()),
        };
        let res = edit_timestamp(&store, &admin, 1, TimestampEdit::default()).await;
        assert!(matches!(res, Err(CoreError::Validation(_))));
    }
}
