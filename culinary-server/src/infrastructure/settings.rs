use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

const DEFAULT_SESSION_TTL_SECONDS: i64 = 12 * 60 * 60;

#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) database_url: String,
    pub(crate) database_read_url: String,
    pub(crate) db_max_connections: u32,
    pub(crate) jwt_secret: String,
    pub(crate) jwt_ttl_seconds: i64,
    pub(crate) http_addr: String,
    pub(crate) cors_origins: Vec<String>,
    pub(crate) log_level: String,
    pub(crate) upload_dir: PathBuf,
    pub(crate) cookie_secure: bool,
    pub(crate) http_request_body_limit_bytes: usize,
    pub(crate) http_concurrency_limit: usize,
    pub(crate) http_request_timeout_secs: u64,
}

impl Settings {
    pub(crate) fn from_env() -> Result<Self> {
        let database_url = get_required("DATABASE_URL").context("DATABASE_URL is required")?;
        let database_read_url = get_optional("DATABASE_READ_URL").unwrap_or_else(|| database_url.clone());
        let db_max_connections = parse_positive_env("DB_MAX_CONNECTIONS", 10u32)?;

        let jwt_secret = get_required("JWT_SECRET").context("JWT_SECRET is required")?;
        if jwt_secret.chars().count() < 32 {
            return Err(anyhow!("JWT_SECRET must be at least 32 characters"));
        }
        let jwt_ttl_seconds: i64 = std::env::var("JWT_TTL_SECONDS")
            .unwrap_or_else(|_| DEFAULT_SESSION_TTL_SECONDS.to_string())
            .parse()
            .context("Failed to parse JWT_TTL_SECONDS, expecting integer")?;
        if jwt_ttl_seconds <= 0 {
            return Err(anyhow!("JWT_TTL_SECONDS must be > 0"));
        }

        let http_addr = std::env::var("HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let cors_origins = parse_cors_origins(
            std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string()),
        );
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());
        let upload_dir = PathBuf::from(
            get_optional("UPLOAD_DIR").unwrap_or_else(|| "./uploads".to_string()),
        );
        let cookie_secure = parse_bool(
            "COOKIE_SECURE",
            &std::env::var("COOKIE_SECURE").unwrap_or_else(|_| "false".to_string()),
        )?;

        let http_request_body_limit_bytes =
            parse_positive_env("HTTP_REQUEST_BODY_LIMIT_BYTES", 6 * 1024 * 1024usize)?;
        let http_concurrency_limit = parse_positive_env("HTTP_CONCURRENCY_LIMIT", 256usize)?;
        let http_request_timeout_secs = parse_positive_env("HTTP_REQUEST_TIMEOUT_SECS", 10u64)?;

        Ok(Self {
            database_url,
            database_read_url,
            db_max_connections,
            jwt_secret,
            jwt_ttl_seconds,
            http_addr,
            cors_origins,
            log_level,
            upload_dir,
            cookie_secure,
            http_request_body_limit_bytes,
            http_concurrency_limit,
            http_request_timeout_secs,
        })
    }
}

fn get_required(key: &str) -> Result<String> {
    let value = std::env::var(key)?;
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(anyhow!("{key} must not be empty"));
    }
    Ok(value)
}

fn get_optional(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_cors_origins(raw: String) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(anyhow!("{key} must be a boolean, got '{other}'")),
    }
}

fn parse_positive_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr + PartialEq + Default + ToString,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse::<T>()
        .with_context(|| format!("Failed to parse {key}, expecting positive integer"))?;

    if value == T::default() {
        return Err(anyhow!("{key} must be > 0"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::{parse_bool, parse_cors_origins};

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let origins = parse_cors_origins(" http://a.test , ,http://b.test,".to_string());
        assert_eq!(origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn bool_flags_accept_common_spellings() {
        assert!(parse_bool("X", "TRUE").expect("valid"));
        assert!(parse_bool("X", "1").expect("valid"));
        assert!(!parse_bool("X", "off").expect("valid"));
        assert!(parse_bool("X", "maybe").is_err());
    }
}
