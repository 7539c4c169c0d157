use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub store_backend: StoreBackend,
    pub host: String,
    pub port: u16,

    pub push_endpoint: String,
    pub push_auth_token: String,

    pub dispatch_concurrency: usize,
    pub invocation_timeout: Duration,

    pub tracked_quantities: Vec<String>,
    pub price_poll_secs: u64,
    pub price_api_url: String,
    pub simulate_mode: bool,
    pub simulate_min: f64,
    pub simulate_max: f64,
    pub send_notifications: bool,

    pub alert_title_template: String,
    pub alert_body_template: String,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn flag(key: &str) -> bool {
    env::var(key).map(|v| v.trim() == "1").unwrap_or(false)
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let store_backend = match var_or("STORE_BACKEND", "mongo").to_lowercase().as_str() {
        "memory" => StoreBackend::Memory,
        _ => StoreBackend::Mongo,
    };

    let tracked_quantities = var_or("TRACKED_QUANTITIES", "btc,eth")
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    Settings {
        mongodb_uri: var_or("MONGODB_URI", "mongodb://localhost:27017"),
        mongodb_db: var_or("MONGODB_DB", "cryptoalert"),
        store_backend,
        host: var_or("HOST", "127.0.0.1"),
        port: parsed_or("PORT", 3000),

        push_endpoint: var_or(
            "PUSH_ENDPOINT",
            "https://fcm.googleapis.com/v1/projects/cryptoalert/messages:send",
        ),
        push_auth_token: var_or("PUSH_AUTH_TOKEN", ""),

        dispatch_concurrency: parsed_or("DISPATCH_CONCURRENCY", 32usize).max(1),
        invocation_timeout: Duration::from_secs(parsed_or("INVOCATION_TIMEOUT_SECS", 30)),

        tracked_quantities,
        price_poll_secs: parsed_or("PRICE_POLL_SECS", 60),
        price_api_url: var_or(
            "PRICE_API_URL",
            "https://min-api.cryptocompare.com/data/pricemulti",
        ),
        simulate_mode: flag("SIMULATE_MODE"),
        simulate_min: parsed_or("SIMULATE_MIN", 1000.0),
        simulate_max: parsed_or("SIMULATE_MAX", 15000.0),
        send_notifications: flag("SEND_NOTIFICATIONS"),

        alert_title_template: var_or("ALERT_TITLE_TEMPLATE", "Crypto Price Alert"),
        alert_body_template: var_or(
            "ALERT_BODY_TEMPLATE",
            "{{name}} price changed to USD {{value}}.",
        ),
    }
}
