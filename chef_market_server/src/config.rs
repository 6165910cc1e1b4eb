use std::env;

use chef_market_engine::escrow::{SplitRatios, DEFAULT_GROCERY_ADVANCE_RATIO, DEFAULT_PLATFORM_FEE_RATIO};
use log::*;

const DEFAULT_CMB_HOST: &str = "127.0.0.1";
const DEFAULT_CMB_PORT: u16 = 8360;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The escrow split ratios handed to the split calculator on every placement and backfill. Configuration
    /// is the only source of these values; nothing reads them from ambient state.
    pub escrow: SplitRatios,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CMB_HOST.to_string(),
            port: DEFAULT_CMB_PORT,
            database_url: String::default(),
            escrow: SplitRatios::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("CMB_HOST").ok().unwrap_or_else(|| DEFAULT_CMB_HOST.into());
        let port = env::var("CMB_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for CMB_PORT. {e} Using the default, {DEFAULT_CMB_PORT}, instead."
                    );
                    DEFAULT_CMB_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_CMB_PORT);
        let database_url = env::var("CMB_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ CMB_DATABASE_URL is not set. Please set it to the URL for the Chef Market database.");
            String::default()
        });
        let escrow = configure_split_ratios();
        Self { host, port, database_url, escrow }
    }
}

fn configure_split_ratios() -> SplitRatios {
    let grocery_advance = ratio_from_env("CMB_GROCERY_ADVANCE_RATIO", DEFAULT_GROCERY_ADVANCE_RATIO);
    let platform_fee = ratio_from_env("CMB_PLATFORM_FEE_RATIO", DEFAULT_PLATFORM_FEE_RATIO);
    if grocery_advance + platform_fee >= 1.0 {
        warn!(
            "🪛️ The configured escrow ratios ({grocery_advance} + {platform_fee}) leave no final payout. \
             Reverting to the defaults."
        );
        return SplitRatios::default();
    }
    SplitRatios { grocery_advance, platform_fee }
}

fn ratio_from_env(var: &str, default: f64) -> f64 {
    env::var(var)
        .map_err(|_| info!("🪛️ {var} is not set. Using the default value of {default}."))
        .and_then(|s| {
            s.parse::<f64>().map_err(|e| warn!("🪛️ Invalid configuration value for {var}. {e}"))
        })
        .ok()
        .filter(|r| {
            let ok = (0.0..1.0).contains(r);
            if !ok {
                warn!("🪛️ {var} must be in [0, 1). Using the default value of {default}.");
            }
            ok
        })
        .unwrap_or(default)
}
