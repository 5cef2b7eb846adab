use crate::auth::auth::AuthUser;
use crate::core::attendance::{self, TimestampEdit};
use crate::core::error::CoreError;
use crate::core::geo::Coord;
use crate::core::tenant;
use crate::model::timestamp::Timestamp;
use crate::store::{MySqlStore, Store};
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct ClockInReq {
    #[schema(example = 59.33)]
    pub latitude: f64,
    #[schema(example = 18.06)]
    pub longitude: f64,
}

#[derive(Deserialize, ToSchema)]
pub struct ClockOutReq {
    /// Minutes, defaults to 0
    #[schema(example = 30)]
    pub break_duration: Option<i32>,
    /// Minutes, defaults to 0
    #[schema(example = 60)]
    pub lunch_duration: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Deserialize, ToSchema)]
pub struct EditTimestampReq {
    #[schema(example = "2024-03-04T08:00:00Z", format = "date-time", value_type = String)]
    pub clock_in: Option<DateTime<Utc>>,
    #[schema(example = "2024-03-04T16:00:00Z", format = "date-time", value_type = String)]
    pub clock_out: Option<DateTime<Utc>>,
    pub break_duration: Option<i32>,
    pub lunch_duration: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct TimestampResponse {
    pub id: u64,
    pub user_id: u64,
    #[schema(format = "date-time", value_type = String)]
    pub clock_in: DateTime<Utc>,
    #[schema(format = "date-time", value_type = String, nullable = true)]
    pub clock_out: Option<DateTime<Utc>>,
    pub break_duration: Option<i32>,
    pub lunch_duration: Option<i32>,
    /// Derived on read: (clock_out - clock_in) - break - lunch
    pub worked_minutes: Option<i64>,
    pub edited: bool,
    pub clock_in_edited: bool,
    pub clock_out_edited: bool,
    pub break_duration_edited: bool,
    pub lunch_duration_edited: bool,
}

impl From<Timestamp> for TimestampResponse {
    fn from(ts: Timestamp) -> Self {
        let worked_minutes = ts.worked_minutes();
        Self {
            id: ts.id,
            user_id: ts.user_id,
            clock_in: ts.clock_in,
            clock_out: ts.clock_out,
            break_duration: ts.break_duration,
            lunch_duration: ts.lunch_duration,
            worked_minutes,
            edited: ts.edited,
            clock_in_edited: ts.clock_in_edited,
            clock_out_edited: ts.clock_out_edited,
            break_duration_edited: ts.break_duration_edited,
            lunch_duration_edited: ts.lunch_duration_edited,
        }
    }
}

fn coord_from(latitude: f64, longitude: f64) -> Result<Coord, CoreError> {
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(CoreError::Validation("coordinate out of bounds".into()));
    }
    Ok(Coord::new(latitude, longitude))
}

/// Geofenced clock-in
#[utoipa::path(
    post,
    path = "/api/attendance/clock-in",
    request_body = ClockInReq,
    responses(
        (status = 200, description = "Clocked in", body = Object, example = json!({
            "message": "Clocked in"
        })),
        (status = 400, description = "Already clocked in, or malformed coordinate"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Outside every allowed zone, or no admin for this code"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn clock_in(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    payload: web::Json<ClockInReq>,
) -> actix_web::Result<impl Responder> {
    auth.require_worker()?;

    let coord = coord_from(payload.latitude, payload.longitude)?;
    attendance::clock_in(store.get_ref(), &auth.actor(), coord, Utc::now()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Clocked in"
    })))
}

/// Clock-out with break/lunch bookkeeping; no geofence check
#[utoipa::path(
    put,
    path = "/api/attendance/clock-out",
    request_body = ClockOutReq,
    responses(
        (status = 200, description = "Clocked out", body = Object, example = json!({
            "message": "Clocked out"
        })),
        (status = 400, description = "No open session"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn clock_out(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    payload: web::Json<ClockOutReq>,
) -> actix_web::Result<impl Responder> {
    auth.require_worker()?;

    let coord = match (payload.latitude, payload.longitude) {
        (Some(lat), Some(lon)) => Some(coord_from(lat, lon)?),
        (None, None) => None,
        _ => {
            return Err(
                CoreError::Validation("latitude and longitude must be sent together".into()).into(),
            );
        }
    };

    attendance::clock_out(
        store.get_ref(),
        auth.user_id,
        payload.break_duration,
        payload.lunch_duration,
        coord,
        Utc::now(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Clocked out"
    })))
}

/// Worker's own sessions, newest first
#[utoipa::path(
    get,
    path = "/api/attendance",
    responses(
        (status = 200, description = "Own timestamps", body = [TimestampResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn my_times(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
) -> actix_web::Result<impl Responder> {
    auth.require_worker()?;

    let times = store
        .timestamps_for_user(auth.user_id)
        .await
        .map_err(CoreError::from)?;
    let body: Vec<TimestampResponse> = times.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// One worker's sessions, for their tenant admin
#[utoipa::path(
    get,
    path = "/api/worker/{worker_id}/times",
    params(("worker_id" = u64, Path, description = "Worker whose times to view")),
    responses(
        (status = 200, description = "Worker timestamps", body = [TimestampResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Worker outside your tenant"),
        (status = 404, description = "No such worker")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn view_times(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin_or_master()?;

    let worker_id = path.into_inner();
    let worker = tenant::require_worker_in_tenant(store.get_ref(), &auth.actor(), worker_id).await?;

    let times = store
        .timestamps_for_user(worker.id)
        .await
        .map_err(CoreError::from)?;
    let body: Vec<TimestampResponse> = times.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Admin correction of a session; every overwritten field is flagged
#[utoipa::path(
    put,
    path = "/api/times/{timestamp_id}",
    params(("timestamp_id" = u64, Path, description = "Timestamp to edit")),
    request_body = EditTimestampReq,
    responses(
        (status = 200, description = "Edited timestamp", body = TimestampResponse),
        (status = 400, description = "Empty edit"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Record outside your tenant"),
        (status = 404, description = "No such timestamp")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn edit_timestamp(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
    payload: web::Json<EditTimestampReq>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin_or_master()?;

    let edit = TimestampEdit {
        clock_in: payload.clock_in,
        clock_out: payload.clock_out,
        break_duration: payload.break_duration,
        lunch_duration: payload.lunch_duration,
    };

    let edited =
        attendance::edit_timestamp(store.get_ref(), &auth.actor(), path.into_inner(), edit).await?;
    Ok(HttpResponse::Ok().json(TimestampResponse::from(edited)))
}
