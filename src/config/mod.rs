use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::chain::{ChainContext, ChainRegistry, NativeCurrency};
use crate::infrastructure::ethereum::ProviderConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct ChainSpec {
    pub id: u64,
    pub name: Option<String>,
    pub rpc: Option<String>,
    pub currency_name: Option<String>,
    pub currency_symbol: Option<String>,
    pub currency_decimals: Option<u8>,
    pub explorer: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Sender for transactions; the node's first account when unset
    pub account: Option<String>,

    pub active_chain: Option<u64>,

    #[serde(default)]
    pub chains: Vec<ChainSpec>,

    pub buttons_dir: Option<PathBuf>,
}

impl ChainSpec {
    pub fn context(&self) -> ChainContext {
        let native_currency = match (&self.currency_name, &self.currency_symbol) {
            (Some(name), Some(symbol)) => Some(NativeCurrency {
                name: name.clone(),
                symbol: symbol.clone(),
                decimals: self.currency_decimals.unwrap_or(18),
            }),
            _ => None,
        };
        ChainContext {
            chain_id: self.id,
            chain_name: self.name.clone().filter(|name| !name.trim().is_empty()),
            native_currency,
            rpc_urls: self.rpc.iter().cloned().collect(),
            block_explorer_urls: self.explorer.iter().cloned().collect(),
        }
    }
}

impl Config {
    /// Registration data for every configured chain
    pub fn registry(&self) -> ChainRegistry {
        self.chains.iter().map(ChainSpec::context).collect()
    }

    /// RPC endpoints keyed by chain id, for chains that have one
    pub fn endpoints(&self) -> BTreeMap<u64, ProviderConfig> {
        self.chains
            .iter()
            .filter_map(|chain| {
                let rpc = chain.rpc.as_deref()?.trim();
                (!rpc.is_empty()).then(|| (chain.id, ProviderConfig::parse(rpc)))
            })
            .collect()
    }
}

/// Load the config from the default location
///
/// A missing or unreadable file yields the defaults; a file that is not
/// valid TOML is an error.
pub fn load() -> Result<Config> {
    match config_path() {
        Some(path) => load_from(&path),
        None => Ok(Config::default()),
    }
}

pub fn load_from(path: &Path) -> Result<Config> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return Ok(Config::default()),
    };
    toml::from_str::<Config>(&content)
        .with_context(|| format!("Malformed config file {}", path.display()))
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("ACTIONPAD_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("actionpad").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("actionpad").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "actionpad", "actionpad")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
