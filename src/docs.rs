use crate::api::admin::{CreateAdminReq, UpdateAdminCodeReq, UserResponse};
use crate::api::attendance::{ClockInReq, ClockOutReq, EditTimestampReq, TimestampResponse};
use crate::api::geofence::CreateGeofenceReq;
use crate::api::vacation::VacationRequestReq;
use crate::model::geofence::Geofence;
use crate::model::vacation::{Vacation, VacationStatus};
use crate::models::{LoginReqDto, RegisterReq};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tidstamp API",
        version = "1.0.0",
        description = r#"
## Geofenced Time-Clock & Leave Service

Attendance tracking scoped to a master → admin → worker tenant hierarchy
keyed by a shared admin code.

### 🔹 Key Features
- **Attendance**
  - Clock-in gated by the tenant admin's geofences, clock-out with break/lunch bookkeeping
- **Vacations**
  - Workers file requests, tenant admins approve or decline them
- **Geofences**
  - Admins manage the circular admission zones of their tenant
- **Tenants**
  - The master account manages admin tenants; admins manage their own workers

### 🔐 Security
Protected endpoints use **JWT Bearer authentication**. Worker-level data is
visible only inside its own tenant.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,

        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,
        crate::api::attendance::my_times,
        crate::api::attendance::view_times,
        crate::api::attendance::edit_timestamp,

        crate::api::vacation::request_vacation,
        crate::api::vacation::my_vacations,
        crate::api::vacation::tenant_vacations,
        crate::api::vacation::approve_vacation,
        crate::api::vacation::decline_vacation,

        crate::api::geofence::add_geofence,
        crate::api::geofence::list_geofences,
        crate::api::geofence::delete_geofence,

        crate::api::admin::create_admin,
        crate::api::admin::delete_admin,
        crate::api::admin::list_admins,
        crate::api::admin::update_admin_code,
        crate::api::admin::list_workers,
        crate::api::admin::delete_worker
    ),
    components(
        schemas(
            RegisterReq,
            LoginReqDto,
            ClockInReq,
            ClockOutReq,
            EditTimestampReq,
            TimestampResponse,
            VacationRequestReq,
            Vacation,
            VacationStatus,
            CreateGeofenceReq,
            Geofence,
            CreateAdminReq,
            UpdateAdminCodeReq,
            UserResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Registration and token APIs"),
        (name = "Attendance", description = "Clock-in/out and session APIs"),
        (name = "Vacation", description = "Leave request workflow APIs"),
        (name = "Geofence", description = "Admission zone APIs"),
        (name = "Admin", description = "Tenant management APIs"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
