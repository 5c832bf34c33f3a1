//! Application configuration loaded from environment variables.

use checkout::CheckoutConfig;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `CHECKOUT_ROLLBACK_ON_FAILURE` — restore partial stock decrements
///   when a checkout fails (default: `true`)
/// - `CHECKOUT_REDECREMENT_ON_REPROCESS` — decrement stock every time
///   an order re-enters `processing` (default: `true`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub checkout: CheckoutConfig,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = CheckoutConfig::default();
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            checkout: CheckoutConfig {
                rollback_decrements_on_failure: env_flag(
                    "CHECKOUT_ROLLBACK_ON_FAILURE",
                    defaults.rollback_decrements_on_failure,
                ),
                redecrement_on_reprocess: env_flag(
                    "CHECKOUT_REDECREMENT_ON_REPROCESS",
                    defaults.redecrement_on_reprocess,
                ),
            },
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            checkout: CheckoutConfig::default(),
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}
