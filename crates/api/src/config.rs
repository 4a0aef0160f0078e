use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// Only `JWT_SECRET` (and `DATABASE_URL`, read in `main`) must be set; the
/// rest default to values that suit a local dashboard on Vite's dev port.
///
/// | Env Var                         | Default                 |
/// |---------------------------------|-------------------------|
/// | `HOST`                          | `0.0.0.0`               |
/// | `PORT`                          | `3000`                  |
/// | `CORS_ORIGINS`                  | `http://localhost:5173` |
/// | `REQUEST_TIMEOUT_SECS`          | `30`                    |
/// | `INVOICE_OVERDUE_INTERVAL_SECS` | `3600`                  |
///
/// See [`JwtConfig::from_env`] for the token settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Dashboard origins allowed by CORS, from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout: Duration,
    /// How often `sent` invoices are checked against their due date.
    pub invoice_overdue_interval: Duration,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// # Panics
    ///
    /// Panics when a variable is set but does not parse, or when an interval
    /// is zero.
    pub fn from_env() -> Self {
        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30);
        let overdue_secs: u64 = env_or("INVOICE_OVERDUE_INTERVAL_SECS", 3600);
        assert!(request_timeout_secs > 0, "REQUEST_TIMEOUT_SECS must be positive");
        assert!(overdue_secs > 0, "INVOICE_OVERDUE_INTERVAL_SECS must be positive");

        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Self {
            host: env_or("HOST", IpAddr::from([0, 0, 0, 0])),
            port: env_or("PORT", 3000),
            cors_origins,
            request_timeout: Duration::from_secs(request_timeout_secs),
            invoice_overdue_interval: Duration::from_secs(overdue_secs),
            jwt: JwtConfig::from_env(),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Parse `key` from the environment, falling back to `default` when unset.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{key} has an invalid value: {raw:?}")),
        Err(_) => default,
    }
}
