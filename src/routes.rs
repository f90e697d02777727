use crate::{
    api::{clock, report, team, user_schedule},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build a per-route limiter config. Reusing the same config to
    // construct multiple `Governor` middlewares shares the underlying bucket.
    fn build_limiter(requests_per_min: u32) -> GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap()
    }

    let login_limiter = build_limiter(config.rate_login_per_min);
    let register_limiter = build_limiter(config.rate_register_per_min);
    let refresh_limiter = build_limiter(config.rate_refresh_per_min);
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(Governor::new(&login_limiter))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(Governor::new(&register_limiter))
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(Governor::new(&refresh_limiter))
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(Governor::new(&login_limiter))
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(Governor::new(&protected_limiter)) // rate limiting
            .service(
                web::scope("/clock")
                    .service(web::resource("/in").route(web::post().to(clock::clock_in)))
                    .service(web::resource("/out").route(web::post().to(clock::clock_out)))
                    .service(web::resource("/status").route(web::get().to(clock::clock_status))),
            )
            .service(
                web::scope("/report")
                    .service(web::resource("/summary").route(web::get().to(report::summary)))
                    .service(web::resource("/daily").route(web::get().to(report::daily)))
                    .service(web::resource("/weekly").route(web::get().to(report::weekly))),
            )
            .service(
                web::scope("/users").service(
                    web::resource("/{id}/schedule")
                        .route(web::get().to(user_schedule::get_schedule))
                        .route(web::put().to(user_schedule::update_schedule)),
                ),
            )
            .service(
                web::scope("/teams").service(
                    web::resource("")
                        .route(web::post().to(team::create_team))
                        .route(web::get().to(team::list_teams)),
                ),
            ),
    );
}

// CLOCK DAY
//  ├─ POST /clock/in   (reaper runs first, then the grace-window check)
//  └─ POST /clock/out  (before pm_end; after that the reaper closes it)
//
// REPORTS
//  └─ GET /report/summary?from&to[&user_id|&team_id]
//       └─ reaper for the scoped users, then the aggregation
