//! Process configuration.
//!
//! Everything is read once at startup and injected; no module reads the
//! environment after this point.

use badgekit_orders::policy::DEFAULT_MIN_ORDER_QUANTITY;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Postgres connection string; falls back to the in-memory store when
    /// absent (dev/tests).
    pub database_url: Option<String>,
    pub stripe_secret_key: Option<String>,
    pub currency: String,
    pub smtp2go_api_key: Option<String>,
    pub email_sender: String,
    pub min_order_quantity: u32,
    pub log_format: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:8080"),
            database_url: std::env::var("DATABASE_URL").ok(),
            stripe_secret_key: std::env::var("STRIPE_SECRET_KEY").ok(),
            currency: env_or("PAYMENT_CURRENCY", "aud"),
            smtp2go_api_key: std::env::var("SMTP2GO_API_KEY").ok(),
            email_sender: env_or("EMAIL_SENDER", "orders@badgekit.example"),
            min_order_quantity: parse_min_order_quantity(
                std::env::var("MIN_ORDER_QUANTITY").ok().as_deref(),
            ),
            log_format: env_or("LOG_FORMAT", "json"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_min_order_quantity(raw: Option<&str>) -> u32 {
    match raw {
        None => DEFAULT_MIN_ORDER_QUANTITY,
        Some(s) => match s.trim().parse() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!(value = %s, "MIN_ORDER_QUANTITY is not a number; using default");
                DEFAULT_MIN_ORDER_QUANTITY
            }
        },
    }
}
