use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// File name of the SQLite database inside `STATE_DIR`.
pub const DATABASE_FILE_NAME: &str = "civic-state.db";

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Directory holding the SQLite database. Defaults to the current directory.
    pub state_dir: PathBuf,
    /// Origin allowed to make credentialed cross-origin requests.
    pub client_url: String,
    pub session_ttl_hours: i64,
    /// Adds the `Secure` attribute to the session cookie.
    pub cookie_secure: bool,
    /// Insert sample projects and events into an empty database at startup.
    pub seed_on_start: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .context("PORT must be a valid number")?;

        let state_dir = env::var("STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let client_url =
            env::var("CLIENT_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        let session_ttl_hours = parse_session_ttl_hours(env::var("SESSION_TTL_HOURS").ok())?;

        let cookie_secure = parse_flag(env::var("COOKIE_SECURE").ok());
        let seed_on_start = parse_flag(env::var("SEED_ON_START").ok());

        Ok(Config {
            host,
            port,
            state_dir,
            client_url,
            session_ttl_hours,
            cookie_secure,
            seed_on_start,
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.state_dir.join(DATABASE_FILE_NAME)
    }
}

/// Longest accepted session lifetime: ten years.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

/// Parse SESSION_TTL_HOURS, defaulting to one week.
///
/// Zero and negative values are rejected: they would issue cookies that are
/// already expired. Values above [`MAX_SESSION_TTL_HOURS`] are rejected too.
pub fn parse_session_ttl_hours(value: Option<String>) -> Result<i64> {
    let Some(raw) = value.filter(|s| !s.trim().is_empty()) else {
        return Ok(24 * 7);
    };
    let hours = raw
        .trim()
        .parse::<i64>()
        .context("SESSION_TTL_HOURS must be a valid number")?;
    if hours <= 0 {
        anyhow::bail!("SESSION_TTL_HOURS must be positive, got {}", hours);
    }
    if hours > MAX_SESSION_TTL_HOURS {
        anyhow::bail!(
            "SESSION_TTL_HOURS must be at most {}, got {}",
            MAX_SESSION_TTL_HOURS,
            hours
        );
    }
    Ok(hours)
}

/// Parse a boolean environment flag. Accepts `true`/`1`/`yes`, case-insensitively.
pub fn parse_flag(value: Option<String>) -> bool {
    value
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ttl_defaults_to_one_week() {
        assert_eq!(parse_session_ttl_hours(None).unwrap(), 168);
        assert_eq!(parse_session_ttl_hours(Some("  ".to_string())).unwrap(), 168);
    }

    #[test]
    fn test_session_ttl_parses_value() {
        assert_eq!(parse_session_ttl_hours(Some("12".to_string())).unwrap(), 12);
    }

    #[test]
    fn test_session_ttl_rejects_garbage_and_non_positive() {
        assert!(parse_session_ttl_hours(Some("abc".to_string())).is_err());
        assert!(parse_session_ttl_hours(Some("0".to_string())).is_err());
        assert!(parse_session_ttl_hours(Some("-3".to_string())).is_err());
    }

    #[test]
    fn test_session_ttl_rejects_values_beyond_ten_years() {
        assert_eq!(
            parse_session_ttl_hours(Some(MAX_SESSION_TTL_HOURS.to_string())).unwrap(),
            MAX_SESSION_TTL_HOURS
        );
        assert!(parse_session_ttl_hours(Some((MAX_SESSION_TTL_HOURS + 1).to_string())).is_err());
        assert!(parse_session_ttl_hours(Some("100000000000".to_string())).is_err());
        assert!(parse_session_ttl_hours(Some("9999999999999999".to_string())).is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert!(!parse_flag(None));
        assert!(parse_flag(Some("true".to_string())));
        assert!(parse_flag(Some("TRUE".to_string())));
        assert!(parse_flag(Some("1".to_string())));
        assert!(parse_flag(Some(" yes ".to_string())));
        assert!(!parse_flag(Some("false".to_string())));
        assert!(!parse_flag(Some("nope".to_string())));
    }

    #[test]
    fn test_database_path_joins_state_dir() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 5000,
            state_dir: PathBuf::from("/var/lib/civic"),
            client_url: "http://localhost:3000".to_string(),
            session_ttl_hours: 168,
            cookie_secure: false,
            seed_on_start: false,
        };
        assert_eq!(
            config.database_path(),
            PathBuf::from("/var/lib/civic/civic-state.db")
        );
    }
}
