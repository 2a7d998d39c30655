use std::{env, fmt::Display, fs::read_to_string, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub google_key: String,
    pub places_url: String,
    pub token_settle_ms: u64,
    pub token_retry_ms: u64,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RUST_PORT", "5001"),
            google_key: read_secret("GOOGLE_API_KEY"),
            places_url: try_load("PLACES_URL", "https://maps.googleapis.com/maps/api/place"),
            token_settle_ms: try_load("PLACES_TOKEN_SETTLE_MS", "2000"),
            token_retry_ms: try_load("PLACES_TOKEN_RETRY_MS", "3000"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

fn read_secret(secret_name: &str) -> String {
    if let Ok(value) = env::var(secret_name) {
        return value.trim().to_string();
    }

    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            warn!("Failed to read {secret_name} from file: {e}");
        })
        .expect("Secrets misconfigured!")
}
