use chrono::NaiveTime;
use dotenvy::dotenv;
use std::env;

/// Default per-category leave entitlements granted when an employee's
/// balance row is first touched.
#[derive(Debug, Clone, Copy)]
pub struct LeaveEntitlements {
    pub casual: u32,
    pub sick: u32,
    pub paid: u32,
}

impl Default for LeaveEntitlements {
    fn default() -> Self {
        LeaveEntitlements {
            casual: 12,
            sick: 10,
            paid: 15,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    pub entitlements: LeaveEntitlements,
    /// Clock-ins after this time are recorded as Late.
    pub work_start: NaiveTime,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let defaults = LeaveEntitlements::default();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            access_token_ttl: env::var("ACCESS_TOKEN_TTL")
                .unwrap_or_else(|_| "900".to_string()) // default 15 min
                .parse()
                .unwrap(),
            refresh_token_ttl: env::var("REFRESH_TOKEN_TTL")
                .unwrap_or_else(|_| "604800".to_string()) // default 7 days
                .parse()
                .unwrap(),

            rate_login_per_min: env::var("RATE_LOGIN_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),
            rate_register_per_min: env::var("RATE_REGISTER_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_refresh_per_min: env::var("RATE_REFRESH_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),

            entitlements: LeaveEntitlements {
                casual: env::var("LEAVE_CASUAL_DAYS")
                    .map(|v| v.parse().unwrap())
                    .unwrap_or(defaults.casual),
                sick: env::var("LEAVE_SICK_DAYS")
                    .map(|v| v.parse().unwrap())
                    .unwrap_or(defaults.sick),
                paid: env::var("LEAVE_PAID_DAYS")
                    .map(|v| v.parse().unwrap())
                    .unwrap_or(defaults.paid),
            },
            work_start: NaiveTime::parse_from_str(
                &env::var("WORK_START").unwrap_or_else(|_| "10:00:00".to_string()),
                "%H:%M:%S",
            )
            .unwrap(),
        }
    }
}
