use anyhow::{anyhow, Result};

/// Capability for obtaining a wallet account address.
///
/// The browser version of this product reached for an ambient injected
/// global; here the provider is passed in at construction so the UI never
/// touches process-wide state and tests can substitute a fake.
pub trait WalletProvider {
    /// Ask the provider for an account address.
    fn request_address(&self) -> Result<String>;
}

/// Wallet provider backed by configuration.
///
/// Takes the address from the `MEDICHAIN_WALLET` environment variable first,
/// then the config file. Display-only; no signing or chain access.
pub struct ConfiguredWallet {
    address: Option<String>,
}

impl ConfiguredWallet {
    pub fn new(configured: Option<String>) -> Self {
        let address = std::env::var("MEDICHAIN_WALLET").ok().or(configured);
        Self { address }
    }
}

impl WalletProvider for ConfiguredWallet {
    fn request_address(&self) -> Result<String> {
        self.address
            .clone()
            .filter(|a| !a.trim().is_empty())
            .ok_or_else(|| anyhow!("no wallet address configured"))
    }
}

/// Truncated display form of an address: first 6 and last 4 characters,
/// e.g. `0x1a2b...9f3c`. Short addresses are shown as-is.
pub fn truncate_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
