use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One clock-in/clock-out session for a worker. A NULL `clock_out`
/// means the session is still open; the store guarantees at most one
/// open row per worker.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Timestamp {
    pub id: u64,
    pub user_id: u64,
    pub clock_in: DateTime<Utc>,
    pub clock_out: Option<DateTime<Utc>>,
    /// Minutes, stored as given at clock-out or by an admin edit.
    pub break_duration: Option<i32>,
    pub lunch_duration: Option<i32>,
    pub clock_in_lat: Option<f64>,
    pub clock_in_lon: Option<f64>,
    pub clock_out_lat: Option<f64>,
    pub clock_out_lon: Option<f64>,
    /// Aggregate flag, raised whenever any field below is overwritten.
    pub edited: bool,
    pub clock_in_edited: bool,
    pub clock_out_edited: bool,
    pub break_duration_edited: bool,
    pub lunch_duration_edited: bool,
}

impl Timestamp {
    /// Worked duration derived on read: `(clock_out - clock_in) - break - lunch`.
    /// Undefined while the session is open. Never recomputed or stored.
    pub fn worked_minutes(&self) -> Option<i64> {
        let clock_out = self.clock_out?;
        let gross = (clock_out - self.clock_in).num_minutes();
        Some(
            gross
                - i64::from(self.break_duration.unwrap_or(0))
                - i64::from(self.lunch_duration.unwrap_or(0)),
        )
    }

    pub fn is_open(&self) -> bool {
        self.clock_out.is_none()
    }
}
