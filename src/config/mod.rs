//! Configuration management
//!
//! Pool capacity, block size, id namespace and the default miner label.
//! Values come from defaults, an optional TOML file and `LEDGER_*`
//! environment variables.

pub mod settings;

pub use settings::Config;
