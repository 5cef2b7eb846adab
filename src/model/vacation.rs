use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum VacationStatus {
    Pending,
    Approved,
    Declined,
}

impl VacationStatus {
    /// Approved and declined are terminal; only pending requests may move.
    pub fn is_terminal(self) -> bool {
        matches!(self, VacationStatus::Approved | VacationStatus::Declined)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Vacation {
    pub id: u64,
    pub user_id: u64,
    #[schema(example = "2024-01-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-01-15", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "pending")]
    pub status: VacationStatus,
}
