use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

fn required(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} must be set"))
}

fn parsed_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{key} is not a valid value")),
        Err(_) => default,
    }
}

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub database_url: String,
    pub jwt_secret: String,

    /// Token lifetimes in seconds.
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Per-route rate limits, requests per minute
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: required("SERVER_ADDR"),
            database_url: required("DATABASE_URL"),
            jwt_secret: required("JWT_SECRET"),

            access_token_ttl: parsed_or("ACCESS_TOKEN_TTL", 900), // 15 min
            refresh_token_ttl: parsed_or("REFRESH_TOKEN_TTL", 604_800), // 7 days

            rate_login_per_min: parsed_or("RATE_LOGIN_PER_MIN", 60),
            rate_register_per_min: parsed_or("RATE_REGISTER_PER_MIN", 30),
            rate_refresh_per_min: parsed_or("RATE_REFRESH_PER_MIN", 30),
            rate_protected_per_min: parsed_or("RATE_PROTECTED_PER_MIN", 1000),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
        }
    }
}
