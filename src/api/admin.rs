//! Tenant administration: the master manages admin accounts, admins
//! manage their own code and their workers.

use crate::auth::auth::AuthUser;
use crate::auth::password::hash_password;
use crate::core::error::CoreError;
use crate::core::tenant;
use crate::model::role::Role;
use crate::model::user::{NewUser, User};
use crate::store::{MySqlStore, Store};
use crate::utils::{admin_code_cache, name_filter};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct CreateAdminReq {
    #[schema(example = "Anna")]
    pub first_name: String,
    #[schema(example = "Andersson")]
    pub last_name: String,
    pub password: String,
    /// Tenant key; must be unique across admins
    #[schema(example = "AC1")]
    pub admin_code: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateAdminCodeReq {
    #[schema(example = "AC2")]
    pub new_admin_code: String,
}

/// What an admin/master sees of an account; never the credential hash.
#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub role_id: u8,
    pub admin_code: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            role_id: user.role_id,
            admin_code: user.admin_code,
        }
    }
}

/// Create an admin tenant (master only)
#[utoipa::path(
    post,
    path = "/api/admin",
    request_body = CreateAdminReq,
    responses(
        (status = 201, description = "Admin created", body = UserResponse),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Master only"),
        (status = 409, description = "Admin code or name already in use")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_admin(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    payload: web::Json<CreateAdminReq>,
) -> actix_web::Result<impl Responder> {
    auth.require_master()?;

    let first_name = payload.first_name.trim();
    let last_name = payload.last_name.trim();
    let admin_code = payload.admin_code.trim();

    if first_name.is_empty() || last_name.is_empty() || payload.password.is_empty() || admin_code.is_empty() {
        return Err(CoreError::Validation("all fields are required".into()).into());
    }

    // Duplicate codes would silently merge two unrelated tenants
    if store
        .admin_code_in_use(admin_code)
        .await
        .map_err(CoreError::from)?
    {
        return Err(CoreError::Conflict("admin code already in use").into());
    }

    if store
        .name_in_use(first_name, last_name)
        .await
        .map_err(CoreError::from)?
    {
        return Err(CoreError::Conflict("name already taken").into());
    }

    let id = store
        .insert_user(NewUser {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            password_hash: hash_password(&payload.password),
            role_id: Role::Admin.id(),
            admin_code: Some(admin_code.to_string()),
        })
        .await
        .map_err(CoreError::from)?;

    name_filter::insert(first_name, last_name);
    admin_code_cache::bind(admin_code, id).await;

    Ok(HttpResponse::Created().json(UserResponse {
        id,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        role_id: Role::Admin.id(),
        admin_code: Some(admin_code.to_string()),
    }))
}

/// Delete an admin tenant (master only)
#[utoipa::path(
    delete,
    path = "/api/admin/{admin_id}",
    params(("admin_id" = u64, Path, description = "Admin to delete")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Master only"),
        (status = 404, description = "No such admin")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_admin(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_master()?;

    let admin_id = path.into_inner();
    let admin = store
        .find_user(admin_id)
        .await
        .map_err(CoreError::from)?
        .filter(|u| u.role() == Some(Role::Admin))
        .ok_or(CoreError::NotFound("admin"))?;

    if !store.delete_admin(admin_id).await.map_err(CoreError::from)? {
        return Err(CoreError::NotFound("admin").into());
    }

    if let Some(code) = admin.admin_code.as_deref() {
        admin_code_cache::forget(code).await;
    }
    name_filter::remove(&admin.first_name, &admin.last_name);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Admin deleted"
    })))
}

/// All admin tenants (master only)
#[utoipa::path(
    get,
    path = "/api/admin",
    responses(
        (status = 200, description = "Admin accounts", body = [UserResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Master only")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_admins(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
) -> actix_web::Result<impl Responder> {
    auth.require_master()?;

    let admins = store.list_admins().await.map_err(CoreError::from)?;
    let body: Vec<UserResponse> = admins.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Rekey the admin's tenant for future registrations. Existing workers
/// keep the old code until they re-register.
#[utoipa::path(
    put,
    path = "/api/admin/code",
    request_body = UpdateAdminCodeReq,
    responses(
        (status = 200, description = "Code updated"),
        (status = 400, description = "Empty code"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Code already in use")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_admin_code(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    payload: web::Json<UpdateAdminCodeReq>,
) -> actix_web::Result<impl Responder> {
    if auth.role != Role::Admin {
        return Err(actix_web::error::ErrorForbidden("Admin only"));
    }

    let new_code = payload.new_admin_code.trim();
    if new_code.is_empty() {
        return Err(CoreError::Validation("admin code must not be empty".into()).into());
    }

    if auth.admin_code.as_deref() == Some(new_code) {
        return Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "Admin code unchanged"
        })));
    }

    if store
        .admin_code_in_use(new_code)
        .await
        .map_err(CoreError::from)?
    {
        return Err(CoreError::Conflict("admin code already in use").into());
    }

    store
        .update_admin_code(auth.user_id, new_code)
        .await
        .map_err(CoreError::from)?;

    if let Some(old_code) = auth.admin_code.as_deref() {
        admin_code_cache::forget(old_code).await;
    }
    admin_code_cache::bind(new_code, auth.user_id).await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Admin code updated"
    })))
}

/// The admin's tenant workers
#[utoipa::path(
    get,
    path = "/api/worker",
    responses(
        (status = 200, description = "Tenant workers", body = [UserResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_workers(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin_or_master()?;

    let Some(code) = auth.admin_code.as_deref() else {
        return Err(CoreError::Forbidden("no tenant of your own").into());
    };

    let workers = store.workers_by_code(code).await.map_err(CoreError::from)?;
    let body: Vec<UserResponse> = workers.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// Remove a worker and cascade their timestamps and vacations
#[utoipa::path(
    delete,
    path = "/api/worker/{worker_id}",
    params(("worker_id" = u64, Path, description = "Worker to delete")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Worker outside your tenant"),
        (status = 404, description = "No such worker")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_worker(
    auth: AuthUser,
    store: web::Data<MySqlStore>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin_or_master()?;

    let worker_id = path.into_inner();
    let worker =
        tenant::require_worker_in_tenant(store.get_ref(), &auth.actor(), worker_id).await?;

    if !store
        .delete_worker_cascade(worker_id)
        .await
        .map_err(CoreError::from)?
    {
        return Err(CoreError::NotFound("worker").into());
    }

    name_filter::remove(&worker.first_name, &worker.last_name);

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Worker deleted"
    })))
}
