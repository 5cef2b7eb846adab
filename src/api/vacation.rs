use crate::auth::auth::AuthUser;
use crate::core::error::CoreError;
use crate::core::vacation::{self, Decision};
use crate::model::vacation::Vacation;
use crate::store::{MySqlStore, Store};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct VacationRequestReq {
    #[schema(example = "2024-01-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-01-15", format = "date", value_type = String)]
    pub end_date: NaiveDate,
}

/// File a vacation request (starts pending)
#[utoipa::path(
    post,
    path = "/api/vacation",
    request_body = VacationRequestReq,
    responses(
        (status = 200, description = "Request filed", body = Object, example = json!({
            "message": "Vacation request submitted",
            "status": "pending"
        })),
        (status = 400, description = "start_date after end_date"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Vacation"
)]
pub async fn request_vacation(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    payload: web::Json<VacationRequestReq>,
) -> actix_web::Result<impl Responder> {
    auth.require_worker()?;

    vacation::request(
        store.get_ref(),
        auth.user_id,
        payload.start_date,
        payload.end_date,
    )
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Vacation request submitted",
        "status": "pending"
    })))
}

/// Worker's own requests
#[utoipa::path(
    get,
    path = "/api/vacation",
    responses(
        (status = 200, description = "Own vacation requests", body = [Vacation]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Vacation"
)]
pub async fn my_vacations(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
) -> actix_web::Result<impl Responder> {
    auth.require_worker()?;

    let vacations = store
        .vacations_for_user(auth.user_id)
        .await
        .map_err(CoreError::from)?;
    Ok(HttpResponse::Ok().json(vacations))
}

/// Every request in the admin's tenant
#[utoipa::path(
    get,
    path = "/api/vacation/tenant",
    responses(
        (status = 200, description = "Tenant vacation requests", body = [Vacation]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Vacation"
)]
pub async fn tenant_vacations(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin_or_master()?;

    let Some(code) = auth.admin_code.as_deref() else {
        return Err(CoreError::Forbidden("no tenant of your own").into());
    };

    let workers = store.workers_by_code(code).await.map_err(CoreError::from)?;
    let worker_ids: Vec<u64> = workers.iter().map(|w| w.id).collect();
    let vacations = store
        .vacations_for_users(&worker_ids)
        .await
        .map_err(CoreError::from)?;
    Ok(HttpResponse::Ok().json(vacations))
}

async fn decide(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    vacation_id: u64,
    decision: Decision,
) -> actix_web::Result<HttpResponse> {
    auth.require_admin_or_master()?;

    vacation::decide(store.get_ref(), &auth.actor(), vacation_id, decision).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Vacation request decided",
        "status": decision.status().to_string()
    })))
}

/// Approve a pending request
#[utoipa::path(
    put,
    path = "/api/vacation/{vacation_id}/approve",
    params(("vacation_id" = u64, Path, description = "Request to approve")),
    responses(
        (status = 200, description = "Approved"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Request outside your tenant"),
        (status = 404, description = "No such request"),
        (status = 409, description = "Already decided")
    ),
    security(("bearer_auth" = [])),
    tag = "Vacation"
)]
pub async fn approve_vacation(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    decide(auth, store, path.into_inner(), Decision::Approved).await
}

/// Decline a pending request
#[utoipa::path(
    put,
    path = "/api/vacation/{vacation_id}/decline",
    params(("vacation_id" = u64, Path, description = "Request to decline")),
    responses(
        (status = 200, description = "Declined"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Request outside your tenant"),
        (status = 404, description = "No such request"),
        (status = 409, description = "Already decided")
    ),
    security(("bearer_auth" = [])),
    tag = "Vacation"
)]
pub async fn decline_vacation(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    decide(auth, store, path.into_inner(), Decision::Declined).await
}
