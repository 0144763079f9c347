use crate::core::DEFAULT_BLOCK_MAX_TXS;
use crate::error::{LedgerError, Result};
use crate::storage::DEFAULT_MEMPOOL_CAPACITY;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

const MEMPOOL_CAPACITY_KEY: &str = "LEDGER_MEMPOOL_CAPACITY";
const BLOCK_MAX_TXS_KEY: &str = "LEDGER_BLOCK_MAX_TXS";
const ID_NAMESPACE_KEY: &str = "LEDGER_ID_NAMESPACE";
const MINER_KEY: &str = "LEDGER_MINER";

static DEFAULT_ID_NAMESPACE: &str = "local";
static DEFAULT_MINER: &str = "miner";

/// Ledger settings.
///
/// Built once by the caller and handed to [`crate::Ledger::new`]; there is
/// no process-wide instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mempool_capacity: usize,
    pub block_max_txs: usize,
    pub id_namespace: String,
    pub miner: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mempool_capacity: DEFAULT_MEMPOOL_CAPACITY,
            block_max_txs: DEFAULT_BLOCK_MAX_TXS,
            id_namespace: String::from(DEFAULT_ID_NAMESPACE),
            miner: String::from(DEFAULT_MINER),
        }
    }
}

impl Config {
    /// Defaults, overridden by any `LEDGER_*` environment variables
    pub fn from_env() -> Result<Config> {
        let mut config = Config::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Read a TOML file; keys it leaves out keep their defaults
    pub fn load(path: &Path) -> Result<Config> {
        let text = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(value) = env::var(MEMPOOL_CAPACITY_KEY) {
            self.mempool_capacity = parse_count(MEMPOOL_CAPACITY_KEY, &value)?;
        }
        if let Ok(value) = env::var(BLOCK_MAX_TXS_KEY) {
            self.block_max_txs = parse_count(BLOCK_MAX_TXS_KEY, &value)?;
        }
        if let Ok(namespace) = env::var(ID_NAMESPACE_KEY) {
            self.id_namespace = namespace;
        }
        if let Ok(miner) = env::var(MINER_KEY) {
            self.miner = miner;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if self.mempool_capacity == 0 {
            return Err(LedgerError::Config(
                "mempool_capacity must be at least 1".to_string(),
            ));
        }
        if self.block_max_txs == 0 {
            return Err(LedgerError::Config(
                "block_max_txs must be at least 1".to_string(),
            ));
        }
        if self.id_namespace.is_empty() {
            return Err(LedgerError::Config(
                "id_namespace must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_count(key: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|e| LedgerError::Config(format!("{key}={value}: {e}")))
}
