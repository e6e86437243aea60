//! Server configuration and CLI argument parsing
//!
//! This module handles all server configuration through:
//! - Command-line arguments
//! - Environment variables (with KVGATE_ prefix)
//!
//! # Configuration Priority
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables
//! 3. Default values (lowest priority)
//!
//! # Example Usage
//!
//! ```bash
//! # Using CLI arguments
//! kvgate --port 9090 --max-per-second 100
//!
//! # Using environment variables
//! export KVGATE_PORT=8080
//! export KVGATE_ENABLE_LIST=true
//! kvgate
//!
//! # Mixed (CLI overrides env)
//! export KVGATE_PORT=8080
//! kvgate --port 9090  # Uses port 9090
//! ```
//!
//! Configuration is read once at startup. There is no runtime reconfiguration.

use anyhow::{Result, anyhow};
use clap::Parser;
use kvgate::AdmissionConfig;

/// Main configuration structure for the server
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP transport configuration
    pub http: HttpConfig,
    /// Admission control limits
    pub admission: AdmissionSettings,
    /// Key-value store configuration
    pub store: StoreConfig,
    /// Whether `GET /kv` returns every record
    pub enable_list: bool,
    /// Logging level (error, warn, info, debug, trace)
    pub log_level: String,
}

/// HTTP transport configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

/// Admission control limits
#[derive(Debug, Clone, Copy)]
pub struct AdmissionSettings {
    /// Requests allowed per window; zero or less disables admission control
    pub max_per_window: i64,
    /// Trailing window length in milliseconds
    pub window_ms: i64,
}

impl From<AdmissionSettings> for AdmissionConfig {
    fn from(settings: AdmissionSettings) -> Self {
        AdmissionConfig::new(settings.max_per_window, settings.window_ms)
    }
}

/// Key-value store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Type of store to use
    pub store_type: StoreType,
    /// Expected number of keys
    pub capacity: usize,
    /// Number of shards for the sharded store
    pub shards: usize,
}

/// Available store types
///
/// - **Memory**: One lock for the whole map
/// - **Sharded**: One lock per shard, best under concurrent load
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoreType {
    /// Single-lock map
    Memory,
    /// Independently locked shards
    Sharded,
}

impl std::str::FromStr for StoreType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StoreType::Memory),
            "sharded" => Ok(StoreType::Sharded),
            _ => Err(anyhow!(
                "Invalid store type: {}. Valid options are: memory, sharded",
                s
            )),
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Command-line arguments for the server
///
/// All arguments can also be set via environment variables with the
/// KVGATE_ prefix. CLI arguments take precedence over environment variables.
///
/// # Examples
///
/// Limit to 50 requests per second with bulk listing:
/// ```bash
/// kvgate --max-per-second 50 --enable-list
/// ```
///
/// Single-lock store with debug logging:
/// ```bash
/// kvgate --store memory --log-level debug
/// ```
#[derive(Parser, Debug)]
#[command(
    name = "kvgate",
    about = "Key-value HTTP service with sliding-window admission control",
    long_about = "A key-value HTTP service that rejects requests once too many arrived in the trailing window.\n\nEnvironment variables with KVGATE_ prefix are supported. CLI arguments take precedence over environment variables."
)]
pub struct Args {
    // HTTP Transport
    #[arg(
        long,
        value_name = "HOST",
        help = "HTTP host",
        default_value = "127.0.0.1",
        env = "KVGATE_HOST"
    )]
    pub host: String,
    #[arg(
        long,
        value_name = "PORT",
        help = "HTTP port",
        default_value_t = 8080,
        env = "KVGATE_PORT"
    )]
    pub port: u16,

    // Admission control
    #[arg(
        long,
        value_name = "N",
        help = "Maximum requests per window (0 or less disables admission control)",
        default_value_t = 0,
        allow_negative_numbers = true,
        env = "KVGATE_MAX_PER_SECOND"
    )]
    pub max_per_second: i64,
    #[arg(
        long,
        value_name = "MS",
        help = "Admission window length in milliseconds",
        default_value_t = 1000,
        env = "KVGATE_WINDOW_MS"
    )]
    pub window_ms: i64,
    #[arg(
        long,
        help = "Enable GET /kv bulk listing",
        env = "KVGATE_ENABLE_LIST"
    )]
    pub enable_list: bool,

    // Store Configuration
    #[arg(
        long,
        value_name = "TYPE",
        help = "Store type: memory, sharded",
        default_value = "sharded",
        env = "KVGATE_STORE"
    )]
    pub store: StoreType,
    #[arg(
        long,
        value_name = "N",
        help = "Number of shards for the sharded store",
        default_value_t = 16,
        env = "KVGATE_STORE_SHARDS"
    )]
    pub store_shards: usize,
    #[arg(
        long,
        value_name = "SIZE",
        help = "Expected number of keys",
        default_value_t = 10_000,
        env = "KVGATE_STORE_CAPACITY"
    )]
    pub store_capacity: usize,

    // General options
    #[arg(
        long,
        value_name = "LEVEL",
        help = "Log level: error, warn, info, debug, trace",
        default_value = "info",
        env = "KVGATE_LOG_LEVEL"
    )]
    pub log_level: String,

    // Utility options
    #[arg(
        long,
        help = "List all environment variables and exit",
        action = clap::ArgAction::SetTrue
    )]
    pub list_env_vars: bool,
}

impl Config {
    /// Build configuration from environment variables and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if a value fails validation.
    pub fn from_env_and_args() -> Result<Self> {
        let args = Args::parse();

        if args.list_env_vars {
            Self::print_env_vars();
            std::process::exit(0);
        }

        Self::from_args(args)
    }

    /// Build and validate configuration from already parsed arguments
    pub fn from_args(args: Args) -> Result<Self> {
        let config = Config {
            http: HttpConfig {
                host: args.host,
                port: args.port,
            },
            admission: AdmissionSettings {
                max_per_window: args.max_per_second,
                window_ms: args.window_ms,
            },
            store: StoreConfig {
                store_type: args.store,
                capacity: args.store_capacity,
                shards: args.store_shards,
            },
            enable_list: args.enable_list,
            log_level: args.log_level.to_lowercase(),
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.admission.window_ms < 1 {
            return Err(anyhow!(
                "Invalid window: {}ms. The admission window must be at least 1ms",
                self.admission.window_ms
            ));
        }

        if self.store.shards == 0 {
            return Err(anyhow!("The sharded store needs at least one shard"));
        }

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(anyhow!(
                "Invalid log level: {}. Valid options are: {}",
                self.log_level,
                LOG_LEVELS.join(", ")
            ));
        }

        Ok(())
    }

    /// Print all available environment variables and their descriptions
    fn print_env_vars() {
        println!("kvgate Environment Variables");
        println!("============================");
        println!();
        println!("All environment variables use the KVGATE_ prefix.");
        println!("CLI arguments take precedence over environment variables.");
        println!();

        println!("HTTP Configuration:");
        println!("  KVGATE_HOST=<host>              HTTP host [default: 127.0.0.1]");
        println!("  KVGATE_PORT=<port>              HTTP port [default: 8080]");
        println!();

        println!("Admission Control:");
        println!(
            "  KVGATE_MAX_PER_SECOND=<n>       Requests per window, 0 disables [default: 0]"
        );
        println!("  KVGATE_WINDOW_MS=<ms>           Window length [default: 1000]");
        println!("  KVGATE_ENABLE_LIST=true|false   Enable GET /kv [default: false]");
        println!();

        println!("Store Configuration:");
        println!("  KVGATE_STORE=<type>             Store type: memory, sharded [default: sharded]");
        println!("  KVGATE_STORE_SHARDS=<n>         Shard count [default: 16]");
        println!("  KVGATE_STORE_CAPACITY=<size>    Expected number of keys [default: 10000]");
        println!();

        println!("General Configuration:");
        println!(
            "  KVGATE_LOG_LEVEL=<level>        Log level: error, warn, info, debug, trace [default: info]"
        );
        println!();

        println!("Examples:");
        println!("  # 100 requests per second, listing enabled");
        println!("  export KVGATE_MAX_PER_SECOND=100");
        println!("  export KVGATE_ENABLE_LIST=true");
        println!();
        println!("  # Run server (CLI args override env vars)");
        println!("  kvgate --port 9090");
    }
}
