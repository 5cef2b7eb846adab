//! In-memory store used by the core tests. Mirrors the conditional
//! insert/update semantics of the MySQL implementation.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::core::attendance::TimestampEdit;
use crate::core::geo::Coord;
use crate::model::geofence::Geofence;
use crate::model::role::Role;
use crate::model::timestamp::Timestamp;
use crate::model::user::{NewUser, User};
use crate::model::vacation::{Vacation, VacationStatus};
use crate::store::Store;

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    timestamps: Vec<Timestamp>,
    vacations: Vec<Vacation>,
    geofences: Vec<Geofence>,
    refresh_tokens: Vec<(u64, String, bool)>, // (user_id, jti, revoked)
    next_id: u64,
}

impl Inner {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

pub struct MemStore {
    inner: Mutex<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
        }
    }

    pub async fn seed_user(&self, user: NewUser) -> u64 {
        self.insert_user(user).await.unwrap()
    }

    pub async fn seed_geofence(&self, admin_id: u64, latitude: f64, longitude: f64, radius: f64) -> u64 {
        self.insert_geofence(admin_id, latitude, longitude, radius)
            .await
            .unwrap()
    }
}

#[async_trait]
impl Store for MemStore {
    async fn find_user(&self, id: u64) -> Result<Option<User>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_name(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .iter()
            .find(|u| u.first_name == first_name && u.last_name == last_name)
            .cloned())
    }

    async fn find_admin_by_code(&self, code: &str) -> Result<Option<User>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .iter()
            .find(|u| u.role_id == Role::Admin.id() && u.admin_code.as_deref() == Some(code))
            .cloned())
    }

    async fn admin_code_in_use(&self, code: &str) -> Result<bool, sqlx::Error> {
        Ok(self.find_admin_by_code(code).await?.is_some())
    }

    async fn name_in_use(&self, first_name: &str, last_name: &str) -> Result<bool, sqlx::Error> {
        Ok(self.find_user_by_name(first_name, last_name).await?.is_some())
    }

    async fn insert_user(&self, user: NewUser) -> Result<u64, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.users.push(User {
            id,
            first_name: user.first_name,
            last_name: user.last_name,
            password: user.password_hash,
            role_id: user.role_id,
            admin_code: user.admin_code,
        });
        Ok(id)
    }

    async fn update_admin_code(&self, admin_id: u64, code: &str) -> Result<(), sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner
            .users
            .iter_mut()
            .find(|u| u.id == admin_id && u.role_id == Role::Admin.id())
        {
            user.admin_code = Some(code.to_string());
        }
        Ok(())
    }

    async fn list_admins(&self) -> Result<Vec<User>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .iter()
            .filter(|u| u.role_id == Role::Admin.id())
            .cloned()
            .collect())
    }

    async fn workers_by_code(&self, code: &str) -> Result<Vec<User>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .iter()
            .filter(|u| u.role_id == Role::Worker.id() && u.admin_code.as_deref() == Some(code))
            .cloned()
            .collect())
    }

    async fn delete_admin(&self, admin_id: u64) -> Result<bool, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        inner.geofences.retain(|g| g.admin_id != admin_id);
        let before = inner.users.len();
        inner
            .users
            .retain(|u| !(u.id == admin_id && u.role_id == Role::Admin.id()));
        Ok(inner.users.len() < before)
    }

    async fn delete_worker_cascade(&self, worker_id: u64) -> Result<bool, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.users.len();
        inner
            .users
            .retain(|u| !(u.id == worker_id && u.role_id == Role::Worker.id()));
        if inner.users.len() == before {
            return Ok(false);
        }
        inner.timestamps.retain(|t| t.user_id != worker_id);
        inner.vacations.retain(|v| v.user_id != worker_id);
        Ok(true)
    }

    async fn find_timestamp(&self, id: u64) -> Result<Option<Timestamp>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.timestamps.iter().find(|t| t.id == id).cloned())
    }

    async fn open_timestamp(&self, user_id: u64) -> Result<Option<Timestamp>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .timestamps
            .iter()
            .find(|t| t.user_id == user_id && t.clock_out.is_none())
            .cloned())
    }

    async fn insert_timestamp_if_no_open(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
        coord: Coord,
    ) -> Result<bool, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .timestamps
            .iter()
            .any(|t| t.user_id == user_id && t.clock_out.is_none())
        {
            return Ok(false);
        }
        let id = inner.next_id();
        inner.timestamps.push(Timestamp {
            id,
            user_id,
            clock_in: now,
            clock_out: None,
            break_duration: None,
            lunch_duration: None,
            clock_in_lat: Some(coord.latitude),
            clock_in_lon: Some(coord.longitude),
            clock_out_lat: None,
            clock_out_lon: None,
            edited: false,
            clock_in_edited: false,
            clock_out_edited: false,
            break_duration_edited: false,
            lunch_duration_edited: false,
        });
        Ok(true)
    }

    async fn close_open_timestamp(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
        break_minutes: i32,
        lunch_minutes: i32,
        coord: Option<Coord>,
    ) -> Result<bool, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        match inner
            .timestamps
            .iter_mut()
            .find(|t| t.user_id == user_id && t.clock_out.is_none())
        {
            Some(record) => {
                record.clock_out = Some(now);
                record.break_duration = Some(break_minutes);
                record.lunch_duration = Some(lunch_minutes);
                record.clock_out_lat = coord.map(|c| c.latitude);
                record.clock_out_lon = coord.map(|c| c.longitude);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn apply_timestamp_edit(
        &self,
        id: u64,
        edit: &TimestampEdit,
    ) -> Result<bool, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        match inner.timestamps.iter_mut().find(|t| t.id == id) {
            Some(record) => {
                if let Some(clock_in) = edit.clock_in {
                    record.clock_in = clock_in;
                    record.clock_in_edited = true;
                }
                if let Some(clock_out) = edit.clock_out {
                    record.clock_out = Some(clock_out);
                    record.clock_out_edited = true;
                }
                if let Some(break_duration) = edit.break_duration {
                    record.break_duration = Some(break_duration);
                    record.break_duration_edited = true;
                }
                if let Some(lunch_duration) = edit.lunch_duration {
                    record.lunch_duration = Some(lunch_duration);
                    record.lunch_duration_edited = true;
                }
                record.edited = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn timestamps_for_user(&self, user_id: u64) -> Result<Vec<Timestamp>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        let mut rows: Vec<Timestamp> = inner
            .timestamps
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.clock_in.cmp(&a.clock_in));
        Ok(rows)
    }

    async fn insert_vacation(
        &self,
        user_id: u64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<u64, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.vacations.push(Vacation {
            id,
            user_id,
            start_date,
            end_date,
            status: VacationStatus::Pending,
        });
        Ok(id)
    }

    async fn find_vacation(&self, id: u64) -> Result<Option<Vacation>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.vacations.iter().find(|v| v.id == id).cloned())
    }

    async fn decide_vacation_if_pending(
        &self,
        id: u64,
        status: VacationStatus,
    ) -> Result<bool, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        match inner
            .vacations
            .iter_mut()
            .find(|v| v.id == id && v.status == VacationStatus::Pending)
        {
            Some(vacation) => {
                vacation.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn vacations_for_user(&self, user_id: u64) -> Result<Vec<Vacation>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .vacations
            .iter()
            .filter(|v| v.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn vacations_for_users(&self, user_ids: &[u64]) -> Result<Vec<Vacation>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .vacations
            .iter()
            .filter(|v| user_ids.contains(&v.user_id))
            .cloned()
            .collect())
    }

    async fn insert_geofence(
        &self,
        admin_id: u64,
        latitude: f64,
        longitude: f64,
        radius: f64,
    ) -> Result<u64, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.geofences.push(Geofence {
            id,
            latitude,
            longitude,
            radius,
            admin_id,
        });
        Ok(id)
    }

    async fn find_geofence(&self, id: u64) -> Result<Option<Geofence>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.geofences.iter().find(|g| g.id == id).cloned())
    }

    async fn geofences_by_admin(&self, admin_id: u64) -> Result<Vec<Geofence>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .geofences
            .iter()
            .filter(|g| g.admin_id == admin_id)
            .cloned()
            .collect())
    }

    async fn delete_geofence(&self, id: u64) -> Result<bool, sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.geofences.len();
        inner.geofences.retain(|g| g.id != id);
        Ok(inner.geofences.len() < before)
    }

    async fn insert_refresh_token(
        &self,
        user_id: u64,
        jti: &str,
        _expires_at: i64,
    ) -> Result<(), sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        inner.refresh_tokens.push((user_id, jti.to_string(), false));
        Ok(())
    }

    async fn refresh_token_active(&self, jti: &str) -> Result<Option<u64>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .refresh_tokens
            .iter()
            .find(|(_, stored, revoked)| stored == jti && !*revoked)
            .map(|(user_id, _, _)| *user_id))
    }

    async fn revoke_refresh_token(&self, jti: &str) -> Result<(), sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        for token in inner.refresh_tokens.iter_mut() {
            if token.1 == jti {
                token.2 = true;
            }
        }
        Ok(())
    }
}
