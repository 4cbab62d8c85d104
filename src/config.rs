use std::env;

use rand::distributions::Alphanumeric;
use rand::Rng;

#[derive(Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub sqlite_path: String,
    pub database_url: Option<String>,
    pub secret_key: String,
    pub session_cookie: String,
    pub session_days: i64,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let server_port = env::var("SERVER_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(5000);

        let sqlite_path = env::var("SQLITE_PATH").unwrap_or_else(|_| "./warbler.sqlite".to_string());
        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty());

        let secret_key = env::var("SECRET_KEY")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| {
                log::warn!("SECRET_KEY not set, sessions will not survive a restart");
                random_secret()
            });

        let session_cookie = env::var("SESSION_COOKIE").unwrap_or_else(|_| "session".to_string());

        let session_days = session_days(env::var("SESSION_DAYS").ok().as_deref());

        let bcrypt_cost = env::var("BCRYPT_COST")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(bcrypt::DEFAULT_COST);

        Self {
            server_port,
            sqlite_path,
            database_url,
            secret_key,
            session_cookie,
            session_days,
            bcrypt_cost,
        }
    }

    pub fn database_url(&self) -> String {
        if let Some(url) = &self.database_url {
            return url.clone();
        }

        let path = self.sqlite_path.trim();
        if path.starts_with("sqlite:") || path.starts_with("file:") {
            return path.to_string();
        }
        format!("sqlite://{}?mode=rwc", path)
    }
}

pub const MAX_SESSION_DAYS: i64 = 365;

fn session_days(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| (1..=MAX_SESSION_DAYS).contains(v))
        .unwrap_or(7)
}

fn random_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(sqlite_path: &str, database_url: Option<&str>) -> AppConfig {
        AppConfig {
            server_port: 5000,
            sqlite_path: sqlite_path.to_string(),
            database_url: database_url.map(str::to_string),
            secret_key: "k".to_string(),
            session_cookie: "session".to_string(),
            session_days: 1,
            bcrypt_cost: 4,
        }
    }

    #[test]
    fn database_url_prefers_explicit_url() {
        let cfg = config("/tmp/w.sqlite", Some("postgres://localhost/warbler"));
        assert_eq!(cfg.database_url(), "postgres://localhost/warbler");
    }

    #[test]
    fn database_url_wraps_plain_sqlite_path() {
        assert_eq!(config("/tmp/w.sqlite", None).database_url(), "sqlite:///tmp/w.sqlite?mode=rwc");
        assert_eq!(config("sqlite::memory:", None).database_url(), "sqlite::memory:");
    }

    #[test]
    fn session_days_out_of_range_falls_back() {
        assert_eq!(session_days(Some("30")), 30);
        assert_eq!(session_days(Some("365")), MAX_SESSION_DAYS);
        assert_eq!(session_days(Some("0")), 7);
        assert_eq!(session_days(Some("-3")), 7);
        assert_eq!(session_days(Some("9223372036854775807")), 7);
        assert_eq!(session_days(Some("soon")), 7);
        assert_eq!(session_days(None), 7);
    }

    #[test]
    fn random_secret_is_not_reused() {
        let a = random_secret();
        assert_eq!(a.len(), 48);
        assert_ne!(a, random_secret());
    }
}
