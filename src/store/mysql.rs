use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::MySqlPool;

use crate::core::attendance::TimestampEdit;
use crate::core::geo::Coord;
use crate::model::geofence::Geofence;
use crate::model::role::Role;
use crate::model::timestamp::Timestamp;
use crate::model::user::{NewUser, User};
use crate::model::vacation::{Vacation, VacationStatus};
use crate::store::Store;

const USER_COLUMNS: &str = "id, first_name, last_name, password, role_id, admin_code";
const TIMESTAMP_COLUMNS: &str = "id, user_id, clock_in, clock_out, break_duration, lunch_duration, \
     clock_in_lat, clock_in_lon, clock_out_lat, clock_out_lon, \
     edited, clock_in_edited, clock_out_edited, break_duration_edited, lunch_duration_edited";

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for MySqlStore {
    async fn find_user(&self, id: u64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_user_by_name(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE first_name = ? AND last_name = ?"
        ))
        .bind(first_name)
        .bind(last_name)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_admin_by_code(&self, code: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE admin_code = ? AND role_id = ?"
        ))
        .bind(code)
        .bind(Role::Admin.id())
        .fetch_optional(&self.pool)
        .await
    }

    async fn admin_code_in_use(&self, code: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE admin_code = ? AND role_id = ? LIMIT 1)",
        )
        .bind(code)
        .bind(Role::Admin.id())
        .fetch_one(&self.pool)
        .await
    }

    async fn name_in_use(&self, first_name: &str, last_name: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE first_name = ? AND last_name = ? LIMIT 1)",
        )
        .bind(first_name)
        .bind(last_name)
        .fetch_one(&self.pool)
        .await
    }

    async fn insert_user(&self, user: NewUser) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (first_name, last_name, password, role_id, admin_code)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.role_id)
        .bind(&user.admin_code)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_id())
    }

    async fn update_admin_code(&self, admin_id: u64, code: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET admin_code = ? WHERE id = ? AND role_id = ?")
            .bind(code)
            .bind(admin_id)
            .bind(Role::Admin.id())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_admins(&self) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role_id = ? ORDER BY last_name, first_name"
        ))
        .bind(Role::Admin.id())
        .fetch_all(&self.pool)
        .await
    }

    async fn workers_by_code(&self, code: &str) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE admin_code = ? AND role_id = ? \
             ORDER BY last_name, first_name"
        ))
        .bind(code)
        .bind(Role::Worker.id())
        .fetch_all(&self.pool)
        .await
    }

    async fn delete_admin(&self, admin_id: u64) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM geofences WHERE admin_id = ?")
            .bind(admin_id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM users WHERE id = ? AND role_id = ?")
            .bind(admin_id)
            .bind(Role::Admin.id())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_worker_cascade(&self, worker_id: u64) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM timestamps WHERE user_id = ?")
            .bind(worker_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM vacations WHERE user_id = ?")
            .bind(worker_id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM users WHERE id = ? AND role_id = ?")
            .bind(worker_id)
            .bind(Role::Worker.id())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_timestamp(&self, id: u64) -> Result<Option<Timestamp>, sqlx::Error> {
        sqlx::query_as::<_, Timestamp>(&format!(
            "SELECT {TIMESTAMP_COLUMNS} FROM timestamps WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn open_timestamp(&self, user_id: u64) -> Result<Option<Timestamp>, sqlx::Error> {
        sqlx::query_as::<_, Timestamp>(&format!(
            "SELECT {TIMESTAMP_COLUMNS} FROM timestamps WHERE user_id = ? AND clock_out IS NULL"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn insert_timestamp_if_no_open(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
        coord: Coord,
    ) -> Result<bool, sqlx::Error> {
        // INSERT .. SELECT .. WHERE NOT EXISTS keeps "one open record per
        // worker" atomic at the store instead of check-then-act in the caller.
        let result = sqlx::query(
            r#"
            INSERT INTO timestamps (user_id, clock_in, clock_in_lat, clock_in_lon)
            SELECT ?, ?, ?, ?
            FROM DUAL
            WHERE NOT EXISTS (
                SELECT 1 FROM timestamps WHERE user_id = ? AND clock_out IS NULL
            )
            "#,
        )
        .bind(user_id)
        .bind(now)
        .bind(coord.latitude)
        .bind(coord.longitude)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn close_open_timestamp(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
        break_minutes: i32,
        lunch_minutes: i32,
        coord: Option<Coord>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE timestamps
            SET clock_out = ?,
                break_duration = ?,
                lunch_duration = ?,
                clock_out_lat = ?,
                clock_out_lon = ?
            WHERE user_id = ? AND clock_out IS NULL
            "#,
        )
        .bind(now)
        .bind(break_minutes)
        .bind(lunch_minutes)
        .bind(coord.map(|c| c.latitude))
        .bind(coord.map(|c| c.longitude))
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn apply_timestamp_edit(
        &self,
        id: u64,
        edit: &TimestampEdit,
    ) -> Result<bool, sqlx::Error> {
        // COALESCE keeps untouched fields; each `? IS NOT NULL` raises the
        // matching edited flag only when that field was actually sent.
        let result = sqlx::query(
            r#"
            UPDATE timestamps
            SET clock_in = COALESCE(?, clock_in),
                clock_in_edited = clock_in_edited OR (? IS NOT NULL),
                clock_out = COALESCE(?, clock_out),
                clock_out_edited = clock_out_edited OR (? IS NOT NULL),
                break_duration = COALESCE(?, break_duration),
                break_duration_edited = break_duration_edited OR (? IS NOT NULL),
                lunch_duration = COALESCE(?, lunch_duration),
                lunch_duration_edited = lunch_duration_edited OR (? IS NOT NULL),
                edited = TRUE
            WHERE id = ?
            "#,
        )
        .bind(edit.clock_in)
        .bind(edit.clock_in)
        .bind(edit.clock_out)
        .bind(edit.clock_out)
        .bind(edit.break_duration)
        .bind(edit.break_duration)
        .bind(edit.lunch_duration)
        .bind(edit.lunch_duration)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn timestamps_for_user(&self, user_id: u64) -> Result<Vec<Timestamp>, sqlx::Error> {
        sqlx::query_as::<_, Timestamp>(&format!(
            "SELECT {TIMESTAMP_COLUMNS} FROM timestamps WHERE user_id = ? ORDER BY clock_in DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn insert_vacation(
        &self,
        user_id: u64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO vacations (user_id, start_date, end_date, status)
            VALUES (?, ?, ?, 'pending')
            "#,
        )
        .bind(user_id)
        .bind(start_date)
        .bind(end_date)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_id())
    }

    async fn find_vacation(&self, id: u64) -> Result<Option<Vacation>, sqlx::Error> {
        sqlx::query_as::<_, Vacation>(
            "SELECT id, user_id, start_date, end_date, status FROM vacations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn decide_vacation_if_pending(
        &self,
        id: u64,
        status: VacationStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE vacations SET status = ? WHERE id = ? AND status = 'pending'")
            .bind(status.to_string())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn vacations_for_user(&self, user_id: u64) -> Result<Vec<Vacation>, sqlx::Error> {
        sqlx::query_as::<_, Vacation>(
            "SELECT id, user_id, start_date, end_date, status FROM vacations \
             WHERE user_id = ? ORDER BY start_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn vacations_for_users(&self, user_ids: &[u64]) -> Result<Vec<Vacation>, sqlx::Error> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; user_ids.len()].join(", ");
        let sql = format!(
            "SELECT id, user_id, start_date, end_date, status FROM vacations \
             WHERE user_id IN ({placeholders}) ORDER BY start_date DESC"
        );

        let mut query = sqlx::query_as::<_, Vacation>(&sql);
        for id in user_ids {
            query = query.bind(*id);
        }
        query.fetch_all(&self.pool).await
    }

    async fn insert_geofence(
        &self,
        admin_id: u64,
        latitude: f64,
        longitude: f64,
        radius: f64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO geofences (admin_id, latitude, longitude, radius) VALUES (?, ?, ?, ?)",
        )
        .bind(admin_id)
        .bind(latitude)
        .bind(longitude)
        .bind(radius)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_id())
    }

    async fn find_geofence(&self, id: u64) -> Result<Option<Geofence>, sqlx::Error> {
        sqlx::query_as::<_, Geofence>(
            "SELECT id, latitude, longitude, radius, admin_id FROM geofences WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn geofences_by_admin(&self, admin_id: u64) -> Result<Vec<Geofence>, sqlx::Error> {
        sqlx::query_as::<_, Geofence>(
            "SELECT id, latitude, longitude, radius, admin_id FROM geofences WHERE admin_id = ?",
        )
        .bind(admin_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn delete_geofence(&self, id: u64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM geofences WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_refresh_token(
        &self,
        user_id: u64,
        jti: &str,
        expires_at: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO refresh_tokens (user_id, jti, expires_at) VALUES (?, ?, FROM_UNIXTIME(?))",
        )
        .bind(user_id)
        .bind(jti)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn refresh_token_active(&self, jti: &str) -> Result<Option<u64>, sqlx::Error> {
        sqlx::query_scalar::<_, u64>(
            "SELECT user_id FROM refresh_tokens WHERE jti = ? AND revoked = FALSE",
        )
        .bind(jti)
        .fetch_optional(&self.pool)
        .await
    }

    async fn revoke_refresh_token(&self, jti: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE jti = ?")
            .bind(jti)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
