use crate::auth::auth::AuthUser;
use crate::core::error::CoreError;
use crate::model::geofence::Geofence;
use crate::model::role::Role;
use crate::store::{MySqlStore, Store};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateGeofenceReq {
    #[schema(example = 59.33)]
    pub latitude: f64,
    #[schema(example = 18.06)]
    pub longitude: f64,
    /// Meters
    #[schema(example = 100.0)]
    pub radius: f64,
}

fn require_admin(auth: &AuthUser) -> actix_web::Result<()> {
    if auth.role == Role::Admin {
        Ok(())
    } else {
        Err(actix_web::error::ErrorForbidden("Admin only"))
    }
}

/// Add an admission zone to the admin's tenant
#[utoipa::path(
    post,
    path = "/api/geofence",
    request_body = CreateGeofenceReq,
    responses(
        (status = 201, description = "Geofence created", body = Geofence),
        (status = 400, description = "Malformed coordinate or radius"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Geofence"
)]
pub async fn add_geofence(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    payload: web::Json<CreateGeofenceReq>,
) -> actix_web::Result<impl Responder> {
    require_admin(&auth)?;

    if !(-90.0..=90.0).contains(&payload.latitude)
        || !(-180.0..=180.0).contains(&payload.longitude)
    {
        return Err(CoreError::Validation("coordinate out of bounds".into()).into());
    }
    if !payload.radius.is_finite() || payload.radius <= 0.0 {
        return Err(CoreError::Validation("radius must be positive".into()).into());
    }

    let id = store
        .insert_geofence(auth.user_id, payload.latitude, payload.longitude, payload.radius)
        .await
        .map_err(CoreError::from)?;

    Ok(HttpResponse::Created().json(Geofence {
        id,
        latitude: payload.latitude,
        longitude: payload.longitude,
        radius: payload.radius,
        admin_id: auth.user_id,
    }))
}

/// The admin's own zones
#[utoipa::path(
    get,
    path = "/api/geofence",
    responses(
        (status = 200, description = "Own geofences", body = [Geofence]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Geofence"
)]
pub async fn list_geofences(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
) -> actix_web::Result<impl Responder> {
    require_admin(&auth)?;

    let fences = store
        .geofences_by_admin(auth.user_id)
        .await
        .map_err(CoreError::from)?;
    Ok(HttpResponse::Ok().json(fences))
}

/// Delete a zone; only its owning admin may
#[utoipa::path(
    delete,
    path = "/api/geofence/{geofence_id}",
    params(("geofence_id" = u64, Path, description = "Geofence to delete")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "No such geofence")
    ),
    security(("bearer_auth" = [])),
    tag = "Geofence"
)]
pub async fn delete_geofence(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    require_admin(&auth)?;

    let geofence_id = path.into_inner();
    let fence = store
        .find_geofence(geofence_id)
        .await
        .map_err(CoreError::from)?
        .ok_or(CoreError::NotFound("geofence"))?;

    if fence.admin_id != auth.user_id {
        return Err(CoreError::Forbidden("geofence belongs to another admin").into());
    }

    store
        .delete_geofence(geofence_id)
        .await
        .map_err(CoreError::from)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Geofence deleted"
    })))
}
