use crate::config::Config;
use crate::core::tenant::Actor;
use crate::{model::role::Role, models::Claims};
use actix_web::{FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data};
use futures::future::{Ready, ready};
use jsonwebtoken::decode;
use jsonwebtoken::{DecodingKey, Validation};

pub struct AuthUser {
    pub user_id: u64,
    pub full_name: String,
    pub role: Role,

    /// Tenant key: own code for admins, owning admin's code for workers
    pub admin_code: Option<String>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        let data = match decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &Validation::default(),
        ) {
            Ok(d) => d,
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
        };

        let role = match Role::from_id(data.claims.role) {
            Some(r) => r,
            None => return ready(Err(ErrorUnauthorized("Invalid role"))),
        };

        ready(Ok(AuthUser {
            user_id: data.claims.user_id,
            full_name: data.claims.sub,
            role,
            admin_code: data.claims.admin_code,
        }))
    }
}

impl AuthUser {
    pub fn require_master(&self) -> actix_web::Result<()> {
        if self.role == Role::Master {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Master only"))
        }
    }

    pub fn require_admin_or_master(&self) -> actix_web::Result<()> {
        if matches!(self.role, Role::Master | Role::Admin) {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Admin/Master only"))
        }
    }

    pub fn require_worker(&self) -> actix_web::Result<()> {
        if self.role == Role::Worker {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Worker only"))
        }
    }

    /// Identity handed to the engine's tenant-scoping checks
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.user_id,
            role: self.role,
            admin_code: self.admin_code.clone(),
        }
    }
}
