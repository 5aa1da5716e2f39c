//! Connectivity check against the pharmacy backend.
//!
//! Resolves the base URL from `API_BASE_URL`, optionally loads a stored
//! session from the JSON file named by `SESSION_FILE`, and fetches
//! `/api/inventory` once. Prints the body and exits non-zero on failure.

use pharmacy_core::{ApiClient, Body, Config, FileStorage, MemoryStorage};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

const SESSION_FILE_ENV: &str = "SESSION_FILE";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::from_env()?;
    let client = match std::env::var(SESSION_FILE_ENV) {
        Ok(path) => {
            info!("reading session from {path}");
            ApiClient::new(&config, FileStorage::new(path))
        }
        Err(_) => ApiClient::new(&config, MemoryStorage::new()),
    };

    let session = client.session();
    info!(
        base_url = client.base_url(),
        authenticated = session.is_authenticated(),
        pharmacy = %session.pharmacy_name,
        "probing inventory"
    );

    let query: Vec<(&str, &str)> = session
        .pharmacy_id
        .as_deref()
        .map(|id| ("pharmacyId", id))
        .into_iter()
        .collect();

    match client.get("/api/inventory", &query) {
        Ok(Body::Json(value)) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Ok(Body::Text(text)) => {
            println!("{text}");
            Ok(())
        }
        Err(e) => {
            error!("inventory request failed: {e}");
            Err(e.into())
        }
    }
}
