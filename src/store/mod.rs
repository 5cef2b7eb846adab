//! Repository boundary of the engine: fetch/insert/update/delete by key
//! and by simple equality filters. One MySQL-backed implementation for
//! the service, one in-memory implementation for the core tests.

pub mod mysql;

#[cfg(test)]
pub mod mem;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::core::attendance::TimestampEdit;
use crate::core::geo::Coord;
use crate::model::geofence::Geofence;
use crate::model::timestamp::Timestamp;
use crate::model::user::{NewUser, User};
use crate::model::vacation::{Vacation, VacationStatus};

pub use mysql::MySqlStore;

#[async_trait]
pub trait Store: Send + Sync {
    // users
    async fn find_user(&self, id: u64) -> Result<Option<User>, sqlx::Error>;
    async fn find_user_by_name(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<User>, sqlx::Error>;
    async fn find_admin_by_code(&self, code: &str) -> Result<Option<User>, sqlx::Error>;
    async fn admin_code_in_use(&self, code: &str) -> Result<bool, sqlx::Error>;
    async fn name_in_use(&self, first_name: &str, last_name: &str) -> Result<bool, sqlx::Error>;
    async fn insert_user(&self, user: NewUser) -> Result<u64, sqlx::Error>;
    async fn update_admin_code(&self, admin_id: u64, code: &str) -> Result<(), sqlx::Error>;
    async fn list_admins(&self) -> Result<Vec<User>, sqlx::Error>;
    async fn workers_by_code(&self, code: &str) -> Result<Vec<User>, sqlx::Error>;
    async fn delete_admin(&self, admin_id: u64) -> Result<bool, sqlx::Error>;
    /// Removes the worker and cascades their timestamps and vacations
    /// in one transaction.
    async fn delete_worker_cascade(&self, worker_id: u64) -> Result<bool, sqlx::Error>;

    // timestamps
    async fn find_timestamp(&self, id: u64) -> Result<Option<Timestamp>, sqlx::Error>;
    async fn open_timestamp(&self, user_id: u64) -> Result<Option<Timestamp>, sqlx::Error>;
    /// Atomic conditional insert: creates the open record only if the
    /// worker has none, returns whether a row was created.
    async fn insert_timestamp_if_no_open(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
        coord: Coord,
    ) -> Result<bool, sqlx::Error>;
    /// Conditional close of the open record; false when no row was open.
    async fn close_open_timestamp(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
        break_minutes: i32,
        lunch_minutes: i32,
        coord: Option<Coord>,
    ) -> Result<bool, sqlx::Error>;
    async fn apply_timestamp_edit(
        &self,
        id: u64,
        edit: &TimestampEdit,
    ) -> Result<bool, sqlx::Error>;
    /// Newest clock-in first.
    async fn timestamps_for_user(&self, user_id: u64) -> Result<Vec<Timestamp>, sqlx::Error>;

    // vacations
    async fn insert_vacation(
        &self,
        user_id: u64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<u64, sqlx::Error>;
    async fn find_vacation(&self, id: u64) -> Result<Option<Vacation>, sqlx::Error>;
    /// Conditional flip keyed on `pending`; false when already terminal.
    async fn decide_vacation_if_pending(
        &self,
        id: u64,
        status: VacationStatus,
    ) -> Result<bool, sqlx::Error>;
    async fn vacations_for_user(&self, user_id: u64) -> Result<Vec<Vacation>, sqlx::Error>;
    async fn vacations_for_users(&self, user_ids: &[u64]) -> Result<Vec<Vacation>, sqlx::Error>;

    // geofences
    async fn insert_geofence(
        &self,
        admin_id: u64,
        latitude: f64,
        longitude: f64,
        radius: f64,
    ) -> Result<u64, sqlx::Error>;
    async fn find_geofence(&self, id: u64) -> Result<Option<Geofence>, sqlx::Error>;
    async fn geofences_by_admin(&self, admin_id: u64) -> Result<Vec<Geofence>, sqlx::Error>;
    async fn delete_geofence(&self, id: u64) -> Result<bool, sqlx::Error>;

    // refresh tokens
    async fn insert_refresh_token(
        &self,
        user_id: u64,
        jti: &str,
        expires_at: i64,
    ) -> Result<(), sqlx::Error>;
    /// The owning user id, if the token exists and is not revoked.
    async fn refresh_token_active(&self, jti: &str) -> Result<Option<u64>, sqlx::Error>;
    async fn revoke_refresh_token(&self, jti: &str) -> Result<(), sqlx::Error>;
}
