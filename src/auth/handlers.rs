use crate::{
    auth::{
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    core::error::CoreError,
    model::{role::Role, user::NewUser},
    models::{LoginReqDto, RegisterReq, TokenType},
    store::{MySqlStore, Store},
    utils::admin_code_cache,
    utils::name_filter,
};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info, instrument};

/// true  => name pair AVAILABLE
/// false => name pair TAKEN
async fn is_name_available(first_name: &str, last_name: &str, store: &MySqlStore) -> bool {
    // Cuckoo filter first: a miss is a definite "not registered".
    if !name_filter::might_exist(first_name, last_name) {
        return true;
    }

    // Database fallback on a possible hit
    !store
        .name_in_use(first_name, last_name)
        .await
        .unwrap_or(true) // fail-safe
}

/// Resolve an admin code to the owning admin's id, cache first.
async fn resolve_admin_code(code: &str, store: &MySqlStore) -> Result<Option<u64>, sqlx::Error> {
    if let Some(admin_id) = admin_code_cache::lookup(code).await {
        return Ok(Some(admin_id));
    }

    match store.find_admin_by_code(code).await? {
        Some(admin) => {
            admin_code_cache::bind(code, admin.id).await;
            Ok(Some(admin.id))
        }
        None => Ok(None),
    }
}

/// Worker self-registration: a valid admin code ties the new account to
/// that admin's tenant.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "Worker registered", body = Object, example = json!({
            "message": "Worker registered successfully"
        })),
        (status = 400, description = "Missing fields or invalid admin code"),
        (status = 409, description = "Name already taken"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
pub async fn register(
    payload: web::Json<RegisterReq>,
    store: web::Data<MySqlStore>,
) -> actix_web::Result<impl Responder> {
    let first_name = payload.first_name.trim();
    let last_name = payload.last_name.trim();
    let admin_code = payload.admin_code.trim();

    if first_name.is_empty() || last_name.is_empty() || payload.password.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "First name, last name and password must not be empty"
        })));
    }

    let admin_id = resolve_admin_code(admin_code, store.get_ref())
        .await
        .map_err(CoreError::from)?;
    if admin_id.is_none() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Invalid admin code"
        })));
    }

    if !is_name_available(first_name, last_name, store.get_ref()).await {
        return Ok(HttpResponse::Conflict().json(json!({
            "error": "Name already taken"
        })));
    }

    store
        .insert_user(NewUser {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            password_hash: hash_password(&payload.password),
            role_id: Role::Worker.id(),
            admin_code: Some(admin_code.to_string()),
        })
        .await
        .map_err(CoreError::from)?;

    // Keep the fast-path structures in step with the insert
    name_filter::insert(first_name, last_name);

    Ok(HttpResponse::Created().json(json!({
        "message": "Worker registered successfully"
    })))
}

#[derive(Serialize, Deserialize)]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
}

/// Login by first+last name and password.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Token pair issued"),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(store, config, user),
    fields(first_name = %user.first_name)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    store: web::Data<MySqlStore>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    if user.first_name.trim().is_empty()
        || user.last_name.trim().is_empty()
        || user.password.is_empty()
    {
        info!("Validation failed: empty name or password");
        return HttpResponse::BadRequest().body("Name and password required");
    }

    debug!("Fetching user from database");

    let db_user = match store
        .find_user_by_name(user.first_name.trim(), user.last_name.trim())
        .await
    {
        Ok(Some(user)) => {
            debug!(user_id = user.id, "User found");
            user
        }
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return HttpResponse::Unauthorized().body("Invalid credentials");
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    debug!("Verifying password");

    if !verify_password(&user.password, &db_user.password) {
        info!("Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    debug!("Generating token pair");

    let access_token = generate_access_token(
        db_user.id,
        db_user.full_name(),
        db_user.role_id,
        db_user.admin_code.clone(),
        &config.jwt_secret,
        config.access_token_ttl,
    );

    let (refresh_token, refresh_claims) = generate_refresh_token(
        db_user.id,
        db_user.full_name(),
        db_user.role_id,
        db_user.admin_code.clone(),
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    debug!(
        user_id = db_user.id,
        jti = %refresh_claims.jti,
        "Storing refresh token"
    );

    if let Err(e) = store
        .insert_refresh_token(db_user.id, &refresh_claims.jti, refresh_claims.exp as i64)
        .await
    {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    info!("Login successful");

    HttpResponse::Ok().json(LoginResponse {
        access_token,
        refresh_token,
    })
}

/// Rotate a refresh token and issue a fresh access token.
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "New token pair"),
        (status = 401, description = "Missing, invalid or revoked refresh token")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn refresh_token(
    req: HttpRequest,
    store: web::Data<MySqlStore>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::Unauthorized().body("No token"),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::Unauthorized().body("Invalid token"),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::Unauthorized().finish(),
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::Unauthorized().finish();
    }

    match store.refresh_token_active(&claims.jti).await {
        Ok(Some(_)) => {}
        Ok(None) => return HttpResponse::Unauthorized().finish(),
        Err(e) => {
            error!(error = %e, "Failed to check refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    }

    // Rotation: revoke the old one before issuing a replacement
    if let Err(e) = store.revoke_refresh_token(&claims.jti).await {
        error!(error = %e, "Failed to revoke refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    let (new_refresh_token, new_claims) = generate_refresh_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        claims.admin_code.clone(),
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    if let Err(e) = store
        .insert_refresh_token(claims.user_id, &new_claims.jti, new_claims.exp as i64)
        .await
    {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    let access_token = generate_access_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        claims.admin_code,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    HttpResponse::Ok().json(json!({
        "access_token": access_token,
        "refresh_token": new_refresh_token
    }))
}

/// Revoke the presented refresh token (idempotent).
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Logged out")),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn logout(
    req: HttpRequest,
    store: web::Data<MySqlStore>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::NoContent().finish(),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::NoContent().finish(),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::NoContent().finish(),
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::NoContent().finish();
    }

    let _ = store.revoke_refresh_token(&claims.jti).await;

    HttpResponse::NoContent().finish()
}
