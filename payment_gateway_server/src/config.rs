use std::env;

use log::*;
use payment_gateway_engine::settlement::SettlementConfig;

const DEFAULT_PGW_HOST: &str = "127.0.0.1";
const DEFAULT_PGW_PORT: u16 = 8000;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/pgw_store.db";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Timing and outcome behaviour of the simulated bank. See
    /// [`SettlementConfig::from_env_or_default`] for the environment variables involved.
    pub settlement: SettlementConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_PGW_HOST.to_string(),
            port: DEFAULT_PGW_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            settlement: SettlementConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("PGW_HOST").ok().unwrap_or_else(|| DEFAULT_PGW_HOST.into());
        let port = env::var("PGW_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for PGW_PORT. {e} Using the default, {DEFAULT_PGW_PORT}, instead."
                    );
                    DEFAULT_PGW_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_PGW_PORT);
        let database_url = env::var("PGW_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ PGW_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let settlement = SettlementConfig::from_env_or_default();
        Self { host, port, database_url, settlement }
    }
}
