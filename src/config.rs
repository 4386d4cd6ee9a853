use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

const DEFAULT_MAX_CONNECTIONS: u32 = 20;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub public_rps: u32,
    pub api_rps: u32,
    pub database_max_connections: u32,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let jwt_ttl_hours: i64 = get_env_parse("JWT_TTL_HOURS")?;
        if jwt_ttl_hours <= 0 {
            return Err(Error::Config(
                "Invalid value for JWT_TTL_HOURS: must be positive".to_string(),
            ));
        }

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            jwt_secret: get_env("JWT_SECRET")?,
            jwt_ttl_hours,
            public_rps: get_env_parse("PUBLIC_RPS")?,
            api_rps: get_env_parse("API_RPS")?,
            database_max_connections: get_env_parse_or(
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_MAX_CONNECTIONS,
            )?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse<T>(name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_env(name)?;
    raw.parse()
        .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(_) => get_env_parse(name),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_helper_reports_variable_name() {
        env::set_var("COMPETENCY_TEST_BAD_NUMBER", "twelve");
        let err = get_env_parse::<u32>("COMPETENCY_TEST_BAD_NUMBER").unwrap_err();
        assert!(err.to_string().contains("COMPETENCY_TEST_BAD_NUMBER"));
    }

    #[test]
    fn optional_variable_falls_back_to_default() {
        env::remove_var("COMPETENCY_TEST_UNSET_NUMBER");
        let value = get_env_parse_or("COMPETENCY_TEST_UNSET_NUMBER", 7u32).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn missing_variable_is_a_config_error() {
        env::remove_var("COMPETENCY_TEST_MISSING");
        assert!(matches!(
            get_env("COMPETENCY_TEST_MISSING"),
            Err(Error::Config(_))
        ));
    }
}
