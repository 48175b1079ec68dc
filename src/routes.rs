use crate::{
    api::{admin, attendance, correction, report},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond((60_000 / requests_per_min as u64).max(1))
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("non-zero period and burst always build");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter)
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter)
                    .route(web::post().to(handlers::register)),
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
                            .route(web::get().to(attendance::list_attendance))
                            .route(web::post().to(attendance::clock)),
                    )
                    // /attendance/today
                    .service(web::resource("/today").route(web::get().to(attendance::today))),
            )
            .service(
                web::scope("/correction-requests")
                    // /correction-requests
                    .service(
                        web::resource("")
                            .route(web::get().to(correction::list_own))
                            .route(web::post().to(correction::create_request)),
                    )
                    // /correction-requests/admin
                    .service(web::resource("/admin").route(web::get().to(correction::list_all)))
                    // /correction-requests/{id}/decision
                    .service(
                        web::resource("/{id}/decision").route(web::put().to(correction::decide)),
                    ),
            )
            .service(
                web::scope("/admin")
                    .service(web::resource("/users").route(web::get().to(admin::list_users)))
                    .service(
                        web::resource("/attendance").route(web::post().to(admin::create_record)),
                    )
                    .service(
                        web::resource("/attendance/correct")
                            .route(web::post().to(admin::correct_record)),
                    ),
            )
            .service(
                web::scope("/reports").service(
                    web::resource("/attendance-summary")
                        .route(web::get().to(report::attendance_summary)),
                ),
            ),
    );
}
