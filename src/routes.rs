use crate::{
    api::{attendance, employee, leave, payroll},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

/// Per-route limiter configuration. The config is built once and shared;
/// each `.wrap` site gets its own `Governor` over it.
fn build_limiter(requests_per_min: u32) -> GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        60_000 / requests_per_min as u64
    };
    GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap()
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
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
             // authentication
            .wrap(Governor::new(&protected_limiter)) // rate limiting
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::get().to(employee::get_employee))
                            .route(web::delete().to(employee::deactivate_employee)),
                    ),
            )
            .service(
                web::scope("/leave")
                    // Fixed paths first; actix matches in registration order and
                    // /{id} would otherwise swallow /balance and friends.
                    .service(web::resource("/apply").route(web::post().to(leave::apply_leave)))
                    .service(web::resource("/my").route(web::get().to(leave::my_leaves)))
                    .service(web::resource("/pending").route(web::get().to(leave::pending_leaves)))
                    .service(web::resource("/balance").route(web::get().to(leave::my_balance)))
                    .service(
                        web::resource("/balance/{employee_id}")
                            .route(web::get().to(leave::employee_balance)),
                    )
                    .service(
                        web::resource("/balance/{employee_id}/credit")
                            .route(web::post().to(leave::credit_balance)),
                    )
                    // /leave
                    .service(web::resource("").route(web::get().to(leave::leave_list)))
                    // /leave/{id}
                    .service(web::resource("/{id}").route(web::get().to(leave::get_leave)))
                    // /leave/{id}/status
                    .service(
                        web::resource("/{id}/status")
                            .route(web::put().to(leave::set_leave_status)),
                    )
                    // /leave/{id}/cancel
                    .service(
                        web::resource("/{id}/cancel").route(web::put().to(leave::cancel_leave)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("/clock-in").route(web::post().to(attendance::clock_in)),
                    )
                    .service(
                        web::resource("/clock-out").route(web::put().to(attendance::clock_out)),
                    )
                    .service(web::resource("/my").route(web::get().to(attendance::my_attendance))),
            )
            .service(
                web::scope("/payroll")
                    .service(
                        web::resource("/generate")
                            .route(web::post().to(payroll::generate_payroll)),
                    )
                    .service(web::resource("/my-slips").route(web::get().to(payroll::my_slips)))
                    // /payroll
                    .service(web::resource("").route(web::get().to(payroll::list_payrolls)))
                    // /payroll/{id}
                    .service(web::resource("/{id}").route(web::get().to(payroll::get_payroll))),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /refresh with refresh_token
//       └─ returns new access_token

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_limiter_config_backs_many_wrap_sites() {
        let limiter = build_limiter(60);
        let _login = Governor::new(&limiter);
        let _logout = Governor::new(&limiter);
    }

    #[test]
    fn rate_maps_to_request_interval() {
        // 60 req/min is one request per second
        let _ = build_limiter(60);
        // a very high rate still yields a non-zero interval
        let _ = build_limiter(1000);
    }
}
