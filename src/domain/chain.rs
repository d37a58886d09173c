//! Chain descriptors and the injected chain registry

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Native currency of a chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

fn default_decimals() -> u8 {
    18
}

/// Parameters needed to switch to, or register, a chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainContext {
    pub chain_id: u64,
    #[serde(default)]
    pub chain_name: Option<String>,
    #[serde(default)]
    pub native_currency: Option<NativeCurrency>,
    #[serde(default)]
    pub rpc_urls: Vec<String>,
    #[serde(default)]
    pub block_explorer_urls: Vec<String>,
}

impl ChainContext {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            chain_name: None,
            native_currency: None,
            rpc_urls: Vec::new(),
            block_explorer_urls: Vec::new(),
        }
    }

    /// Chain name, RPC endpoints and native currency are all present
    pub fn is_registrable(&self) -> bool {
        let named = self
            .chain_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty());
        let has_rpc = self.rpc_urls.iter().any(|url| !url.trim().is_empty());
        let has_currency = self.native_currency.as_ref().is_some_and(|currency| {
            !currency.name.trim().is_empty() && !currency.symbol.trim().is_empty()
        });
        named && has_rpc && has_currency
    }

    /// Fill fields this context lacks from another descriptor of the same chain
    pub fn or_from(mut self, fallback: &ChainContext) -> Self {
        if fallback.chain_id != self.chain_id {
            return self;
        }
        if self.chain_name.is_none() {
            self.chain_name = fallback.chain_name.clone();
        }
        if self.native_currency.is_none() {
            self.native_currency = fallback.native_currency.clone();
        }
        if self.rpc_urls.is_empty() {
            self.rpc_urls = fallback.rpc_urls.clone();
        }
        if self.block_explorer_urls.is_empty() {
            self.block_explorer_urls = fallback.block_explorer_urls.clone();
        }
        self
    }
}

/// Known chains by id, passed to the engine explicitly
#[derive(Debug, Clone, Default)]
pub struct ChainRegistry {
    chains: BTreeMap<u64, ChainContext>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chain descriptor
    ///
    /// Note: Later descriptors for the same id replace earlier ones
    pub fn insert(&mut self, chain: ChainContext) {
        self.chains.insert(chain.chain_id, chain);
    }

    pub fn get(&self, chain_id: u64) -> Option<&ChainContext> {
        self.chains.get(&chain_id)
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

impl FromIterator<ChainContext> for ChainRegistry {
    fn from_iter<I: IntoIterator<Item = ChainContext>>(iter: I) -> Self {
        let mut registry = Self::new();
        for chain in iter {
            registry.insert(chain);
        }
        registry
    }
}
