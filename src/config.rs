//! Configuration management for the fanout relayer
//!
//! Loads configuration from TOML files with environment variable substitution.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub relayer: RelayerConfig,
    pub wallet: WalletConfig,
    /// Ordered: position in this list defines broadcast preference.
    pub endpoints: Vec<EndpointConfig>,
    /// Transfer for the one-shot binary to submit. Optional so the lib
    /// surface can be configured without one.
    pub transfer: Option<TransferConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelayerConfig {
    pub chain_id: u64,
    pub gas_limit: u64,
    pub send_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    /// Name of the env var holding a raw hex private key.
    pub private_key_env: Option<String>,
    /// Name of the env var holding a BIP-39 seed phrase.
    pub mnemonic_env: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransferConfig {
    pub recipient: String,
    /// Amount in the payload's smallest unit (wei for native transfers,
    /// token units for ERC-20).
    pub amount: String,
    /// ERC-20 contract address; omitted means a native transfer.
    pub token_address: Option<String>,
}

impl Settings {
    /// Load settings from configuration files
    pub fn load() -> Result<Self> {
        let config_path = env::var("FANOUT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/default.toml"));

        Self::load_from(&config_path)
    }

    /// Load settings from a specific path
    pub fn load_from(config_path: &PathBuf) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        // Substitute environment variables
        let config_str = substitute_env_vars(&config_str);

        let settings: Settings =
            toml::from_str(&config_str).with_context(|| "Failed to parse configuration")?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        if self.endpoints.is_empty() {
            anyhow::bail!("At least one endpoint must be configured");
        }

        for endpoint in &self.endpoints {
            if endpoint.url.is_empty() {
                anyhow::bail!("Endpoint {} has an empty URL", endpoint.name);
            }
        }

        if self.wallet.private_key_env.is_none() && self.wallet.mnemonic_env.is_none() {
            anyhow::bail!("Wallet must name a private key or mnemonic env var");
        }

        if self.relayer.gas_limit == 0 {
            anyhow::bail!("gas_limit must be non-zero");
        }

        Ok(())
    }
}

/// Substitute environment variables in the format ${VAR_NAME}
fn substitute_env_vars(input: &str) -> String {
    let mut result = input.to_string();
    let re = regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        let var_value = env::var(var_name).unwrap_or_default();
        result = result.replace(&cap[0], &var_value);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_env_var_substitution() {
        env::set_var("TEST_VAR", "test_value");
        let input = "url = \"https://api.example.com/${TEST_VAR}/endpoint\"";
        let result = substitute_env_vars(input);
        assert_eq!(
            result,
            "url = \"https://api.example.com/test_value/endpoint\""
        );
    }

    #[test]
    fn test_load_preserves_endpoint_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[relayer]
chain_id = 1
gas_limit = 100000
send_timeout_ms = 30000

[wallet]
private_key_env = "RELAYER_PRIVATE_KEY"

[[endpoints]]
name = "infura"
url = "https://mainnet.example-a.io/v3/key"

[[endpoints]]
name = "alchemy"
url = "https://eth.example-b.com/v2/key"

[[endpoints]]
name = "ankr"
url = "https://rpc.example-c.com/eth"
"#
        )
        .unwrap();

        let settings = Settings::load_from(&file.path().to_path_buf()).unwrap();
        let names: Vec<_> = settings.endpoints.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["infura", "alchemy", "ankr"]);
        assert_eq!(settings.relayer.gas_limit, 100_000);
    }

    #[test]
    fn test_missing_wallet_source_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[relayer]
chain_id = 1
gas_limit = 100000
send_timeout_ms = 30000

[wallet]

[[endpoints]]
name = "infura"
url = "https://mainnet.example-a.io/v3/key"
"#
        )
        .unwrap();

        assert!(Settings::load_from(&file.path().to_path_buf()).is_err());
    }
}
