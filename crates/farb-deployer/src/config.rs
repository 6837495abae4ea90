//! Network and compiler configuration.
//!
//! The on-disk format mirrors a Hardhat config:
//!
//! ```json
//! {
//!   "solidity": "0.8.18",
//!   "networks": {
//!     "arbitrum": { "url": "https://arb1.arbitrum.io/rpc", "accountsEnv": "OPEN_SOURCE_PKEY" }
//!   }
//! }
//! ```
//!
//! Nothing in this module reads the process environment. The caller resolves the secret named by
//! `accountsEnv` and hands it over as a [`SigningKey`].

use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use serde::Deserialize;
use url::Url;

use crate::ConfigError;

/// Environment variable holding the deployer key when a network does not name one.
pub const DEFAULT_KEY_ENV: &str = "OPEN_SOURCE_PKEY";

/// Directory Hardhat writes contract artifacts to.
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts/contracts";

/// Parsed harness configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarnessConfig {
    /// Pinned solc version
    #[serde(default)]
    pub solidity: Option<String>,
    /// Configured networks by name
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkEntry>,
}

/// A network entry as written in the configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkEntry {
    /// RPC endpoint, may be left empty and supplied on the command line
    #[serde(default)]
    pub url: String,
    /// Name of the environment variable holding the signing key
    #[serde(default)]
    pub accounts_env: Option<String>,
    /// Expected chain id of the endpoint
    #[serde(default)]
    pub chain_id: Option<u64>,
}

impl HarnessConfig {
    /// Reads and parses a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::FileRead { path: path.to_path_buf(), source })?;
        serde_json::from_str(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Picks the active network. With no name given, the configuration must hold exactly one.
    pub fn select(&self, name: Option<&str>) -> Result<(&str, &NetworkEntry), ConfigError> {
        match name {
            Some(name) => self
                .networks
                .get_key_value(name)
                .map(|(k, v)| (k.as_str(), v))
                .ok_or_else(|| ConfigError::UnknownNetwork(name.to_string())),
            None => {
                let mut iter = self.networks.iter();
                match (iter.next(), iter.next()) {
                    (Some((k, v)), None) => Ok((k.as_str(), v)),
                    (None, _) => Err(ConfigError::UnknownNetwork("<none configured>".to_string())),
                    _ => Err(ConfigError::AmbiguousNetwork(
                        self.networks.keys().cloned().collect::<Vec<_>>().join(", "),
                    )),
                }
            }
        }
    }

    /// Parses the pinned compiler version, if any.
    pub fn compiler_version(&self) -> Result<Option<semver::Version>, ConfigError> {
        self.solidity.as_deref().map(parse_compiler_version).transpose()
    }
}

impl NetworkEntry {
    /// Environment variable that holds the signing key for this network.
    pub fn key_env(&self) -> &str {
        self.accounts_env.as_deref().filter(|s| !s.is_empty()).unwrap_or(DEFAULT_KEY_ENV)
    }

    /// Resolves the entry into a [`NetworkConfig`]. A non-empty `url_override` wins over the
    /// file's url.
    pub fn resolve(
        &self,
        name: &str,
        url_override: Option<&str>,
    ) -> Result<NetworkConfig, ConfigError> {
        let raw = url_override.filter(|u| !u.trim().is_empty()).unwrap_or(&self.url).trim();
        if raw.is_empty() {
            return Err(ConfigError::MissingUrl(name.to_string()));
        }
        let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;
        Ok(NetworkConfig { name: name.to_string(), url, chain_id: self.chain_id })
    }
}

/// The single network a run deploys to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Network name from the configuration file
    pub name: String,
    /// JSON-RPC endpoint
    pub url: Url,
    /// Expected chain id, checked on connect when set
    pub chain_id: Option<u64>,
}

/// Secret key authorizing deployments. The key material never appears in `Debug` output.
#[derive(Clone)]
pub struct SigningKey(PrivateKeySigner);

impl SigningKey {
    /// Address of the deployer account.
    pub fn address(&self) -> Address {
        self.0.address()
    }

    /// The underlying local signer.
    pub fn signer(&self) -> &PrivateKeySigner {
        &self.0
    }
}

impl FromStr for SigningKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::MissingSigningKey("signing key".to_string()));
        }
        PrivateKeySigner::from_str(trimmed)
            .map(Self)
            .map_err(|e| ConfigError::InvalidSigningKey(e.to_string()))
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey").field("address", &self.address()).finish_non_exhaustive()
    }
}

/// Everything a deployment run needs, resolved up front.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// Target network
    pub network: NetworkConfig,
    /// Deployer key
    pub signing_key: SigningKey,
    /// Root of the compiled artifacts
    pub artifacts_dir: PathBuf,
    /// Pinned compiler version, checked against artifacts that record one
    pub compiler: Option<semver::Version>,
    /// Number of block confirmations to wait for per deployment
    pub confirmations: u64,
    /// Upper bound on waiting for a receipt; `None` waits forever
    pub receipt_timeout: Option<Duration>,
}

impl DeployConfig {
    /// Creates a configuration with Hardhat's artifact directory and one confirmation.
    pub fn new(network: NetworkConfig, signing_key: SigningKey) -> Self {
        Self {
            network,
            signing_key,
            artifacts_dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR),
            compiler: None,
            confirmations: 1,
            receipt_timeout: None,
        }
    }

    /// Sets the artifact directory.
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = dir.into();
        self
    }

    /// Pins the compiler version.
    pub fn with_compiler(mut self, compiler: Option<semver::Version>) -> Self {
        self.compiler = compiler;
        self
    }

    /// Sets the number of confirmations; zero is treated as one.
    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations.max(1);
        self
    }

    /// Sets the receipt timeout.
    pub fn with_receipt_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.receipt_timeout = timeout;
        self
    }
}

/// Parses a solc version such as `0.8.18` or `0.8.18+commit.87f61d96`.
pub fn parse_compiler_version(s: &str) -> Result<semver::Version, ConfigError> {
    let trimmed = s.trim().trim_start_matches('v');
    semver::Version::parse(trimmed).map_err(|e| ConfigError::InvalidCompilerVersion {
        version: s.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANVIL_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn parse(json: &str) -> HarnessConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_hardhat_shaped_config() {
        let config = parse(
            r#"{
                "solidity": "0.8.18",
                "networks": {
                    "arbitrum": {
                        "url": "http://localhost:8545",
                        "accountsEnv": "OPEN_SOURCE_PKEY"
                    }
                }
            }"#,
        );
        assert_eq!(config.compiler_version().unwrap(), Some(semver::Version::new(0, 8, 18)));

        let (name, entry) = config.select(None).unwrap();
        assert_eq!(name, "arbitrum");
        assert_eq!(entry.key_env(), "OPEN_SOURCE_PKEY");

        let network = entry.resolve(name, None).unwrap();
        assert_eq!(network.url.as_str(), "http://localhost:8545/");
        assert_eq!(network.chain_id, None);
    }

    #[test]
    fn test_select_requires_name_with_multiple_networks() {
        let config = parse(
            r#"{ "networks": { "a": { "url": "http://a" }, "b": { "url": "http://b" } } }"#,
        );
        assert!(matches!(config.select(None), Err(ConfigError::AmbiguousNetwork(_))));
        assert_eq!(config.select(Some("b")).unwrap().0, "b");
        assert!(matches!(
            config.select(Some("c")),
            Err(ConfigError::UnknownNetwork(n)) if n == "c"
        ));
    }

    #[test]
    fn test_empty_url_needs_override() {
        // The shipped config leaves the url empty.
        let config = parse(r#"{ "networks": { "arbitrum": { "url": "" } } }"#);
        let (name, entry) = config.select(Some("arbitrum")).unwrap();

        assert!(matches!(entry.resolve(name, None), Err(ConfigError::MissingUrl(_))));
        let network = entry.resolve(name, Some("http://127.0.0.1:8545")).unwrap();
        assert_eq!(network.url.host_str(), Some("127.0.0.1"));
        assert_eq!(entry.key_env(), DEFAULT_KEY_ENV);
    }

    #[test]
    fn test_invalid_url() {
        let entry = NetworkEntry { url: "not a url".to_string(), ..Default::default() };
        assert!(matches!(entry.resolve("x", None), Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn test_signing_key_parsing_and_redaction() {
        let key: SigningKey = ANVIL_KEY.parse().unwrap();
        assert_eq!(
            key.address(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse::<Address>().unwrap()
        );
        let debug = format!("{key:?}");
        assert!(!debug.contains(&ANVIL_KEY[2..]));

        // Without the 0x prefix as well
        assert!(ANVIL_KEY[2..].parse::<SigningKey>().is_ok());

        assert!(matches!("".parse::<SigningKey>(), Err(ConfigError::MissingSigningKey(_))));
        assert!(matches!("0x1234".parse::<SigningKey>(), Err(ConfigError::InvalidSigningKey(_))));
    }

    #[test]
    fn test_compiler_version_with_build_metadata() {
        let version = parse_compiler_version("0.8.18+commit.87f61d96").unwrap();
        assert_eq!((version.major, version.minor, version.patch), (0, 8, 18));
        assert!(parse_compiler_version("latest").is_err());
    }

    #[test]
    fn test_zero_confirmations_clamped() {
        let network = NetworkEntry { url: "http://localhost:8545".into(), ..Default::default() }
            .resolve("local", None)
            .unwrap();
        let config =
            DeployConfig::new(network, ANVIL_KEY.parse().unwrap()).with_confirmations(0);
        assert_eq!(config.confirmations, 1);
        assert_eq!(config.artifacts_dir, PathBuf::from(DEFAULT_ARTIFACTS_DIR));
    }
}
