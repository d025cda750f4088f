use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub run_migrations: bool,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub default_exam_duration_secs: i64,
    pub max_exam_duration_secs: i64,
    pub session_grace_secs: i64,
    pub draft_ttl_secs: u64,
    pub cache_max_entries: u64,
    pub submission_workers: usize,
    pub submission_queue_capacity: usize,
    pub submission_status_ttl_secs: u64,
    pub auth_rps: u32,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let config = Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            db_max_connections: get_env_or("DB_MAX_CONNECTIONS", 20)?,
            run_migrations: get_env_or("RUN_MIGRATIONS", true)?,
            jwt_secret: get_env("JWT_SECRET")?,
            jwt_ttl_hours: get_env_or("JWT_TTL_HOURS", 24)?,
            default_exam_duration_secs: get_env_or("DEFAULT_EXAM_DURATION_SECS", 3600)?,
            max_exam_duration_secs: get_env_or("MAX_EXAM_DURATION_SECS", 86_400)?,
            session_grace_secs: get_env_or("SESSION_GRACE_SECS", 30)?,
            draft_ttl_secs: get_env_or("DRAFT_TTL_SECS", 3600)?,
            cache_max_entries: get_env_or("CACHE_MAX_ENTRIES", 100_000)?,
            submission_workers: get_env_or("SUBMISSION_WORKERS", 4)?,
            submission_queue_capacity: get_env_or("SUBMISSION_QUEUE_CAPACITY", 1024)?,
            submission_status_ttl_secs: get_env_or("SUBMISSION_STATUS_TTL_SECS", 3600)?,
            auth_rps: get_env_or("AUTH_RPS", 20)?,
            log_format: get_env_or("LOG_FORMAT", LogFormat::Pretty)?,
        };
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        if self.jwt_secret.len() < 16 {
            return Err(Error::Config(
                "JWT_SECRET must be at least 16 characters".to_string(),
            ));
        }
        if self.default_exam_duration_secs <= 0
            || self.default_exam_duration_secs > self.max_exam_duration_secs
        {
            return Err(Error::Config(format!(
                "DEFAULT_EXAM_DURATION_SECS must be in 1..={}",
                self.max_exam_duration_secs
            )));
        }
        if self.session_grace_secs < 0 {
            return Err(Error::Config("SESSION_GRACE_SECS must not be negative".to_string()));
        }
        if self.submission_workers == 0 || self.submission_queue_capacity == 0 {
            return Err(Error::Config(
                "SUBMISSION_WORKERS and SUBMISSION_QUEUE_CAPACITY must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn draft_ttl(&self) -> Duration {
        Duration::from_secs(self.draft_ttl_secs)
    }

    pub fn submission_status_ttl(&self) -> Duration {
        Duration::from_secs(self.submission_status_ttl_secs)
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            server_address: "127.0.0.1:0".into(),
            database_url: "postgres://localhost/exam".into(),
            db_max_connections: 5,
            run_migrations: false,
            jwt_secret: "0123456789abcdef0123".into(),
            jwt_ttl_hours: 24,
            default_exam_duration_secs: 3600,
            max_exam_duration_secs: 86_400,
            session_grace_secs: 30,
            draft_ttl_secs: 3600,
            cache_max_entries: 1000,
            submission_workers: 2,
            submission_queue_capacity: 16,
            submission_status_ttl_secs: 3600,
            auth_rps: 20,
            log_format: LogFormat::Pretty,
        }
    }

    #[test]
    fn rejects_short_jwt_secret() {
        let mut config = sample();
        config.jwt_secret = "short".into();
        assert!(matches!(config.check(), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_default_duration_above_ceiling() {
        let mut config = sample();
        config.default_exam_duration_secs = config.max_exam_duration_secs + 1;
        assert!(config.check().is_err());
        assert!(sample().check().is_ok());
    }

    #[test]
    fn parses_log_format() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
