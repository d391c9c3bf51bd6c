//! Server configuration.
//!
//! Every setting comes from an environment variable (a `.env` file is loaded first, if present). Invalid values are
//! logged and replaced by their defaults, so the daemon always starts with a usable configuration. The two settings
//! without a sensible default, `TCS_LEDGER_RPC_URL` and `TCS_COLLECTIONS`, are checked by [`ServerConfig::validate`].
use std::{env, fmt::Display, str::FromStr, time::Duration};

use log::*;
use tcm_common::{parse_boolean_flag, Secret};
use tile_cache_engine::{
    helpers::CollectionRegistry,
    scheduler::{SchedulerConfig, DEFAULT_BUSY_DELAY, DEFAULT_IDLE_DELAY, DEFAULT_STALENESS_WINDOW},
};

use crate::errors::ServerError;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/tile_cache.db";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_BLOCK_HEIGHT_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_LEDGER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    /// The JSON-RPC endpoint of the ledger node. Usually carries an API key, hence the [`Secret`].
    pub ledger_rpc_url: Secret<String>,
    pub ledger_timeout: Duration,
    pub collections: CollectionRegistry,
    /// How often the block-height snapshot is refreshed.
    pub block_height_interval: Duration,
    pub scheduler: SchedulerConfig,
    /// Run the order-book reconciliation loop.
    pub poll_orders: bool,
    /// Run the ownership reconciliation loop.
    pub poll_balances: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            ledger_rpc_url: Secret::default(),
            ledger_timeout: DEFAULT_LEDGER_TIMEOUT,
            collections: CollectionRegistry::default(),
            block_height_interval: DEFAULT_BLOCK_HEIGHT_INTERVAL,
            scheduler: SchedulerConfig::default(),
            poll_orders: true,
            poll_balances: true,
        }
    }
}

impl ServerConfig {
    pub fn from_env_or_default() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any source of variables. `lookup` returns `None` for unset variables.
    pub fn from_lookup<F>(lookup: F) -> Self
    where F: Fn(&str) -> Option<String> {
        let database_url = lookup("TCS_DATABASE_URL").unwrap_or_else(|| {
            info!("🪛️ TCS_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let db_max_connections = parse_or_default(&lookup, "TCS_DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS);
        let ledger_rpc_url = lookup("TCS_LEDGER_RPC_URL").unwrap_or_else(|| {
            error!("🪛️ TCS_LEDGER_RPC_URL is not set. Please set it to the JSON-RPC URL of a ledger node.");
            String::default()
        });
        let ledger_timeout =
            Duration::from_secs(parse_or_default(&lookup, "TCS_LEDGER_TIMEOUT_SECS", DEFAULT_LEDGER_TIMEOUT.as_secs()));
        let collections = match lookup("TCS_COLLECTIONS") {
            Some(s) => CollectionRegistry::parse(&s).unwrap_or_else(|e| {
                error!("🪛️ Invalid configuration value for TCS_COLLECTIONS. {e}");
                CollectionRegistry::default()
            }),
            None => {
                error!("🪛️ TCS_COLLECTIONS is not set. Please set it to a list of name=0xContractAddress pairs.");
                CollectionRegistry::default()
            },
        };
        let block_height_interval = Duration::from_secs(parse_or_default(
            &lookup,
            "TCS_BLOCK_HEIGHT_INTERVAL_SECS",
            DEFAULT_BLOCK_HEIGHT_INTERVAL.as_secs(),
        ));
        let staleness_window = Duration::from_secs(parse_or_default(
            &lookup,
            "TCS_STALENESS_WINDOW_SECS",
            DEFAULT_STALENESS_WINDOW.as_secs(),
        ));
        let busy_delay = Duration::from_millis(parse_or_default(&lookup, "TCS_BUSY_DELAY_MS", millis(DEFAULT_BUSY_DELAY)));
        let idle_delay = Duration::from_millis(parse_or_default(&lookup, "TCS_IDLE_DELAY_MS", millis(DEFAULT_IDLE_DELAY)));
        let poll_orders = parse_boolean_flag(lookup("TCS_POLL_ORDERS"), true);
        let poll_balances = parse_boolean_flag(lookup("TCS_POLL_BALANCES"), true);
        Self {
            database_url,
            db_max_connections,
            ledger_rpc_url: Secret::new(ledger_rpc_url),
            ledger_timeout,
            collections,
            block_height_interval,
            scheduler: SchedulerConfig { staleness_window, busy_delay, idle_delay },
            poll_orders,
            poll_balances,
        }
    }

    /// Checks the settings that have no usable default.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.ledger_rpc_url.reveal().trim().is_empty() {
            return Err(ServerError::ConfigurationError("TCS_LEDGER_RPC_URL must be set".into()));
        }
        if self.collections.is_empty() {
            return Err(ServerError::ConfigurationError("TCS_COLLECTIONS must name at least one collection".into()));
        }
        if self.block_height_interval.is_zero() {
            return Err(ServerError::ConfigurationError("TCS_BLOCK_HEIGHT_INTERVAL_SECS must be positive".into()));
        }
        if self.db_max_connections == 0 {
            return Err(ServerError::ConfigurationError("TCS_DB_MAX_CONNECTIONS must be at least 1".into()));
        }
        Ok(())
    }
}

fn parse_or_default<F, T>(lookup: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display + Copy,
    T::Err: Display,
{
    match lookup(name) {
        Some(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            warn!("🪛️ Invalid configuration value for {name} ({s}). {e} Using the default, {default}, instead.");
            default
        }),
        None => {
            debug!("🪛️ {name} is not set. Using the default value of {default}.");
            default
        },
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = config_from(&[]);
        assert_eq!(config.database_url, "sqlite://data/tile_cache.db");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.block_height_interval, Duration::from_secs(60));
        assert_eq!(config.scheduler, SchedulerConfig::default());
        assert_eq!(config.scheduler.staleness_window, Duration::from_secs(360));
        assert_eq!(config.scheduler.busy_delay, Duration::from_millis(10));
        assert_eq!(config.scheduler.idle_delay, Duration::from_millis(200));
        assert!(config.poll_orders);
        assert!(config.poll_balances);
        assert!(config.collections.is_empty());
        assert!(matches!(config.validate(), Err(ServerError::ConfigurationError(_))));
    }

    #[test]
    fn explicit_values() {
        let config = config_from(&[
            ("TCS_DATABASE_URL", "sqlite://tmp/tiles.db"),
            ("TCS_LEDGER_RPC_URL", "https://rpc.example.org/v2/key"),
            ("TCS_COLLECTIONS", "tiles=0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359"),
            ("TCS_BLOCK_HEIGHT_INTERVAL_SECS", "12"),
            ("TCS_STALENESS_WINDOW_SECS", "30"),
            ("TCS_BUSY_DELAY_MS", "1"),
            ("TCS_IDLE_DELAY_MS", "50"),
            ("TCS_POLL_BALANCES", "false"),
        ]);
        assert_eq!(config.database_url, "sqlite://tmp/tiles.db");
        assert_eq!(config.ledger_rpc_url.reveal(), "https://rpc.example.org/v2/key");
        assert_eq!(config.collections.resolve("0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359"), Some("tiles".into()));
        assert_eq!(config.block_height_interval, Duration::from_secs(12));
        assert_eq!(config.scheduler.staleness_window, Duration::from_secs(30));
        assert_eq!(config.scheduler.busy_delay, Duration::from_millis(1));
        assert_eq!(config.scheduler.idle_delay, Duration::from_millis(50));
        assert!(config.poll_orders);
        assert!(!config.poll_balances);
        assert!(config.validate().is_ok());
        assert!(!format!("{config:?}").contains("v2/key"));
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let config = config_from(&[
            ("TCS_DB_MAX_CONNECTIONS", "many"),
            ("TCS_STALENESS_WINDOW_SECS", "-5"),
            ("TCS_COLLECTIONS", "tiles"),
        ]);
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.scheduler.staleness_window, Duration::from_secs(360));
        assert!(config.collections.is_empty());
    }

    #[test]
    fn zero_sized_pool_is_rejected() {
        let config = config_from(&[
            ("TCS_LEDGER_RPC_URL", "https://rpc.example.org/v2/key"),
            ("TCS_COLLECTIONS", "tiles=0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359"),
            ("TCS_DB_MAX_CONNECTIONS", "0"),
        ]);
        assert_eq!(config.db_max_connections, 0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("TCS_DB_MAX_CONNECTIONS"));
    }
}
