use std::env;

use crate::auth::TokenSettings;
use crate::error::AppError;

const DEFAULT_DATABASE_URL: &str = "sqlite://taskshare.db";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

/// Runtime settings, read from the environment (and `.env` via `dotenv`).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub access_token_expire_minutes: i64,
    pub allowed_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::Configuration("JWT_SECRET must be set".into()))?;

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            server_port: parse_var("SERVER_PORT", 8000)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            jwt_secret,
            access_token_expire_minutes: parse_var("ACCESS_TOKEN_EXPIRE_MINUTES", 30)?,
            allowed_origins: parse_origins(
                &env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.into()),
            ),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }

    pub fn token_settings(&self) -> TokenSettings {
        TokenSettings::new(
            self.jwt_secret.clone(),
            chrono::Duration::minutes(self.access_token_expire_minutes),
        )
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Configuration(format!("{} must be a number", name))),
        Err(_) => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the environment mutations don't race with each other.
    #[test]
    fn test_config_from_env() {
        env::remove_var("JWT_SECRET");
        assert!(matches!(
            Config::from_env(),
            Err(AppError::Configuration(_))
        ));

        env::set_var("JWT_SECRET", "config-test-secret");
        env::remove_var("DATABASE_URL");
        env::remove_var("SERVER_PORT");
        env::remove_var("SERVER_HOST");
        env::remove_var("ALLOWED_ORIGINS");
        env::remove_var("ACCESS_TOKEN_EXPIRE_MINUTES");

        let config = Config::from_env().unwrap();
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.server_port, 8000);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.access_token_expire_minutes, 30);
        assert_eq!(
            config.allowed_origins,
            vec!["http://localhost:3000", "http://127.0.0.1:3000"]
        );
        assert_eq!(config.server_url(), "http://127.0.0.1:8000");

        env::set_var("SERVER_PORT", "3000");
        env::set_var("SERVER_HOST", "0.0.0.0");
        env::set_var("ALLOWED_ORIGINS", "https://app.example.com, ");
        let config = Config::from_env().unwrap();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.allowed_origins, vec!["https://app.example.com"]);

        env::set_var("SERVER_PORT", "not-a-port");
        assert!(Config::from_env().is_err());

        env::remove_var("SERVER_PORT");
        env::remove_var("SERVER_HOST");
        env::remove_var("ALLOWED_ORIGINS");
    }
}
