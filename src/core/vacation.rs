//! Paid-leave request workflow: pending -> approved | declined, with no
//! way back out of a terminal state.

use chrono::NaiveDate;

use crate::core::error::CoreError;
use crate::core::tenant::{self, Actor};
use crate::model::vacation::VacationStatus;
use crate::store::Store;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Decision {
    Approved,
    Declined,
}

impl Decision {
    pub fn status(self) -> VacationStatus {
        match self {
            Decision::Approved => VacationStatus::Approved,
            Decision::Declined => VacationStatus::Declined,
        }
    }
}

/// File a pending request for the given worker. Date ordering is
/// enforced here rather than left to the input layer.
pub async fn request<S: Store>(
    store: &S,
    worker_id: u64,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<u64, CoreError> {
    if start_date > end_date {
        return Err(CoreError::Validation(
            "start_date cannot be after end_date".into(),
        ));
    }
    Ok(store.insert_vacation(worker_id, start_date, end_date).await?)
}

/// Settle a pending request. The actor must be an admin (or master) of
/// the same tenant as the request's worker. The status flip is a
/// conditional update keyed on `pending`, so a second decision loses
/// and surfaces as `AlreadyDecided`.
pub async fn decide<S: Store>(
    store: &S,
    actor: &Actor,
    vacation_id: u64,
    decision: Decision,
) -> Result<(), CoreError> {
    let vacation = store
        .find_vacation(vacation_id)
        .await?
        .ok_or(CoreError::NotFound("vacation request"))?;

    tenant::require_worker_in_tenant(store, actor, vacation.user_id).await?;

    let flipped = store
        .decide_vacation_if_pending(vacation_id, decision.status())
        .await?;
    if !flipped {
        return Err(CoreError::AlreadyDecided);
    }
    Ok(())
}
