use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::rooms::{
    AllocationSettings, InventoryLayout, DEFAULT_MAX_WRITE_ATTEMPTS, DEFAULT_TOTAL_ROOMS,
};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the hostel service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub inventory: InventoryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let total_rooms = match env::var("HOSTEL_TOTAL_ROOMS") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|value| *value > 0)
                .ok_or(ConfigError::InvalidTotalRooms(raw))?,
            Err(_) => DEFAULT_TOTAL_ROOMS,
        };
        let max_write_attempts = match env::var("HOSTEL_MAX_WRITE_ATTEMPTS") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|value| *value > 0)
                .ok_or(ConfigError::InvalidWriteAttempts(raw))?,
            Err(_) => DEFAULT_MAX_WRITE_ATTEMPTS,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            inventory: InventoryConfig {
                total_rooms,
                max_write_attempts,
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Inventory size and write-retry budget for the allocation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryConfig {
    pub total_rooms: u16,
    pub max_write_attempts: u32,
}

impl InventoryConfig {
    pub fn allocation_settings(&self) -> Result<AllocationSettings, ConfigError> {
        let layout = InventoryLayout::new(self.total_rooms)
            .ok_or_else(|| ConfigError::InvalidTotalRooms(self.total_rooms.to_string()))?;
        Ok(AllocationSettings {
            layout,
            max_write_attempts: self.max_write_attempts,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTotalRooms(String),
    InvalidWriteAttempts(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTotalRooms(raw) => write!(
                f,
                "HOSTEL_TOTAL_ROOMS must be between 1 and 65535, got '{}'",
                raw
            ),
            ConfigError::InvalidWriteAttempts(raw) => write!(
                f,
                "HOSTEL_MAX_WRITE_ATTEMPTS must be a positive integer, got '{}'",
                raw
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidTotalRooms(_)
            | ConfigError::InvalidWriteAttempts(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "HOSTEL_TOTAL_ROOMS",
            "HOSTEL_MAX_WRITE_ATTEMPTS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.inventory.total_rooms, 200);
        assert_eq!(config.inventory.max_write_attempts, 3);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn inventory_overrides_feed_allocation_settings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "ci");
        env::set_var("HOSTEL_TOTAL_ROOMS", "40");
        env::set_var("HOSTEL_MAX_WRITE_ATTEMPTS", "5");

        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Test);
        let settings = config
            .inventory
            .allocation_settings()
            .expect("valid inventory");
        assert_eq!(settings.layout.total_rooms(), 40);
        assert_eq!(settings.max_write_attempts, 5);
        reset_env();
    }

    #[test]
    fn rejects_empty_inventory() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("HOSTEL_TOTAL_ROOMS", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidTotalRooms(raw)) if raw == "0"
        ));

        env::set_var("HOSTEL_TOTAL_ROOMS", "100");
        env::set_var("HOSTEL_MAX_WRITE_ATTEMPTS", "none");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidWriteAttempts(_))
        ));
        reset_env();
    }
}
