use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;

use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use transit_server::cache::{CacheConfig, CachedRoutingProvider};
use transit_server::planner::PlannerConfig;
use transit_server::routing::{OsrmClient, OsrmConfig};
use transit_server::store::MemoryStore;
use transit_server::web::{AppState, create_router};

const DEFAULT_DATA_PATH: &str = "data/network.json";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Seconds between snapshot reloads when `TRANSIT_RELOAD_SECS` is unset.
const DEFAULT_RELOAD_SECS: u64 = 300;

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(true).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn Error>> {
    let data_path = env::var("TRANSIT_DATA")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_PATH));
    let store = MemoryStore::load(&data_path)?;

    let mut osrm_config = OsrmConfig::new();
    if let Ok(url) = env::var("ROUTING_URL") {
        osrm_config = osrm_config.with_base_url(url);
    }
    if let Some(secs) = env_parse::<u64>("ROUTING_TIMEOUT_SECS") {
        osrm_config = osrm_config.with_timeout(secs);
    }
    info!(url = %osrm_config.base_url, timeout_secs = osrm_config.timeout_secs, "routing provider");
    let provider = CachedRoutingProvider::new(OsrmClient::new(osrm_config)?, &CacheConfig::default());

    let mut planner_config = PlannerConfig::default();
    if let Some(penalty) = env_parse::<f64>("TRANSFER_PENALTY_KM") {
        planner_config = planner_config.with_transfer_penalty(penalty);
    }

    // Pick up edits to the snapshot without a restart
    let reload_secs = env_parse::<u64>("TRANSIT_RELOAD_SECS").unwrap_or(DEFAULT_RELOAD_SECS);
    if reload_secs > 0 {
        let store = store.clone();
        let path = data_path.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(reload_secs));
            interval.tick().await; // First tick is immediate, skip it
            loop {
                interval.tick().await;
                if let Err(e) = store.reload(&path).await {
                    warn!(error = %e, "snapshot reload failed, keeping current data");
                }
            }
        });
    }

    let app = create_router(AppState::new(store, provider, planner_config));

    let addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, data = %data_path.display(), "transit server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Parse an environment variable, warning if it is set but malformed.
fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var = name, value = %raw, "ignoring malformed environment variable");
            None
        }
    }
}
