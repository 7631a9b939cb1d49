// src/config.rs

use std::{env, str::FromStr, time::Duration};

use dotenvy::dotenv;

use crate::ai::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiConfig};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Token lifetime in seconds.
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub bind_addr: String,

    /// Seeded on boot when both are set.
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    /// Lets a registration request claim the admin role.
    pub admin_signup_key: Option<String>,

    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub ai_timeout: Duration,
    pub roast_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        Self {
            database_url,
            jwt_secret,
            jwt_expiration: parse_or("JWT_EXPIRATION", 86400),
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            admin_email: non_empty("ADMIN_EMAIL"),
            admin_password: non_empty("ADMIN_PASSWORD"),
            admin_signup_key: non_empty("ADMIN_SIGNUP_KEY"),
            gemini_api_key: non_empty("GEMINI_API_KEY"),
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            gemini_model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            ai_timeout: Duration::from_secs(parse_or("AI_TIMEOUT_SECS", 60)),
            roast_timeout: Duration::from_secs(parse_or("ROAST_TIMEOUT_SECS", 8)),
        }
    }

    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.gemini_api_key.clone(),
            base_url: self.gemini_base_url.clone(),
            model: self.gemini_model.clone(),
            timeout: self.ai_timeout,
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    parse_value(key, env::var(key).ok(), default)
}

/// Panics on a malformed value, like the required vars above.
fn parse_value<T: FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{} must be a valid number, got {:?}", key, raw)),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_value_uses_default() {
        assert_eq!(parse_value("AI_TIMEOUT_SECS", None, 60u64), 60);
        assert_eq!(parse_value("AI_TIMEOUT_SECS", Some(" 90 ".to_string()), 60u64), 90);
    }

    #[test]
    #[should_panic(expected = "JWT_EXPIRATION must be a valid number")]
    fn test_malformed_value_aborts() {
        parse_value("JWT_EXPIRATION", Some("one day".to_string()), 86400u64);
    }
}
