use crate::{
    api::{attendance, employee, leave_request},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
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

    let submit_limiter = Arc::new(build_limiter(config.rate_submit_per_min));
    let decide_limiter = Arc::new(build_limiter(config.rate_decide_per_min));
    let read_limiter = Arc::new(build_limiter(config.rate_read_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .wrap(submit_limiter.clone())
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // /leave/{id}
                    .service(
                        web::resource("/{id}")
                            .wrap(submit_limiter.clone())
                            .route(web::get().to(leave_request::get_leave))
                            .route(web::put().to(leave_request::update_leave)),
                    )
                    // /leave/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .wrap(decide_limiter.clone())
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    // /leave/{id}/reject
                    .service(
                        web::resource("/{id}/reject")
                            .wrap(decide_limiter.clone())
                            .route(web::put().to(leave_request::reject_leave)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    // /attendance/summary
                    .service(
                        web::resource("/summary")
                            .wrap(read_limiter.clone())
                            .route(web::get().to(attendance::monthly_summary)),
                    ),
            )
            .service(
                web::scope("/employee")
                    // /employee
                    .service(
                        web::resource("")
                            .wrap(read_limiter.clone())
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employee/{id}
                    .service(
                        web::resource("/{id}")
                            .wrap(read_limiter.clone())
                            .route(web::get().to(employee::get_employee)),
                    ),
            ),
    );
}
