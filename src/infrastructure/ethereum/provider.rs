//! Endpoint configuration and Alloy provider construction

use std::fmt;
use std::path::PathBuf;

use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use anyhow::{Context, Result};

/// Provider configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    /// HTTP JSON-RPC endpoint
    Http(String),
    /// WebSocket endpoint
    WebSocket(String),
    /// IPC socket path (Unix only)
    #[cfg(unix)]
    Ipc(PathBuf),
}

impl ProviderConfig {
    /// Classify an endpoint string by its scheme
    ///
    /// Anything that is not `ws(s)://` or `http(s)://` is treated as an IPC
    /// path on Unix and as HTTP elsewhere.
    pub fn parse(endpoint: &str) -> Self {
        let endpoint = endpoint.trim();
        let lower = endpoint.to_ascii_lowercase();
        if lower.starts_with("ws://") || lower.starts_with("wss://") {
            return ProviderConfig::WebSocket(endpoint.to_string());
        }
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return ProviderConfig::Http(endpoint.to_string());
        }
        #[cfg(unix)]
        {
            let path = endpoint.strip_prefix("ipc://").unwrap_or(endpoint);
            ProviderConfig::Ipc(PathBuf::from(path))
        }
        #[cfg(not(unix))]
        {
            ProviderConfig::Http(endpoint.to_string())
        }
    }

    /// Get display name for this endpoint
    pub fn display(&self) -> String {
        match self {
            ProviderConfig::Http(url) => url.clone(),
            ProviderConfig::WebSocket(url) => url.clone(),
            #[cfg(unix)]
            ProviderConfig::Ipc(path) => path.display().to_string(),
        }
    }

    /// Check if this is a WebSocket endpoint
    pub fn is_websocket(&self) -> bool {
        matches!(self, ProviderConfig::WebSocket(_))
    }
}

impl fmt::Display for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Create a type-erased provider from configuration
pub async fn create_provider(config: &ProviderConfig) -> Result<DynProvider> {
    match config {
        ProviderConfig::Http(url) => {
            let rpc_url = url.parse().context("Invalid HTTP URL")?;
            Ok(ProviderBuilder::new().connect_http(rpc_url).erased())
        }
        ProviderConfig::WebSocket(url) => {
            let provider = ProviderBuilder::new()
                .connect(url)
                .await
                .context("Failed to create WebSocket provider")?;
            Ok(provider.erased())
        }
        #[cfg(unix)]
        ProviderConfig::Ipc(path) => {
            use alloy::providers::IpcConnect;
            let ipc = IpcConnect::new(path.to_string_lossy().to_string());
            let provider = ProviderBuilder::new()
                .connect_ipc(ipc)
                .await
                .context("Failed to create IPC provider")?;
            Ok(provider.erased())
        }
    }
}
