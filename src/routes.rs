use crate::{
    api::{admin, attendance, geofence, vacation},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("")
                            .route(web::get().to(attendance::my_times)),
                    )
                    // /attendance/clock-in
                    .service(
                        web::resource("/clock-in")
                            .route(web::post().to(attendance::clock_in)),
                    )
                    // /attendance/clock-out
                    .service(
                        web::resource("/clock-out")
                            .route(web::put().to(attendance::clock_out)),
                    ),
            )
            // /times/{id}
            .service(
                web::resource("/times/{id}").route(web::put().to(attendance::edit_timestamp)),
            )
            .service(
                web::scope("/vacation")
                    // /vacation
                    .service(
                        web::resource("")
                            .route(web::post().to(vacation::request_vacation))
                            .route(web::get().to(vacation::my_vacations)),
                    )
                    // /vacation/tenant
                    .service(
                        web::resource("/tenant")
                            .route(web::get().to(vacation::tenant_vacations)),
                    )
                    // /vacation/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(vacation::approve_vacation)),
                    )
                    // /vacation/{id}/decline
                    .service(
                        web::resource("/{id}/decline")
                            .route(web::put().to(vacation::decline_vacation)),
                    ),
            )
            .service(
                web::scope("/geofence")
                    // /geofence
                    .service(
                        web::resource("")
                            .route(web::post().to(geofence::add_geofence))
                            .route(web::get().to(geofence::list_geofences)),
                    )
                    // /geofence/{id}
                    .service(
                        web::resource("/{id}").route(web::delete().to(geofence::delete_geofence)),
                    ),
            )
            .service(
                web::scope("/admin")
                    // /admin/code
                    .service(
                        web::resource("/code").route(web::put().to(admin::update_admin_code)),
                    )
                    // /admin
                    .service(
                        web::resource("")
                            .route(web::post().to(admin::create_admin))
                            .route(web::get().to(admin::list_admins)),
                    )
                    // /admin/{id}
                    .service(
                        web::resource("/{id}").route(web::delete().to(admin::delete_admin)),
                    ),
            )
            .service(
                web::scope("/worker")
                    // /worker
                    .service(web::resource("").route(web::get().to(admin::list_workers)))
                    // /worker/{id}/times
                    .service(
                        web::resource("/{id}/times").route(web::get().to(attendance::view_times)),
                    )
                    // /worker/{id}
                    .service(
                        web::resource("/{id}").route(web::delete().to(admin::delete_worker)),
                    ),
            ),
    );
}
