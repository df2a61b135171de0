//! Optional TOML configuration and its merge with command line flags.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use cosigner_credentials::{cipher::KdfParams, Network};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration file read when `--config` is not given.
pub(crate) const DEFAULT_CONFIG_PATH: &str = "cosigner.toml";

/// Credentials file used when neither the configuration nor the command line names one.
pub(crate) const DEFAULT_CREDENTIALS_PATH: &str = "credentials.json";

/// Contents of the configuration file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    /// Network for newly created credentials.
    pub(crate) network: Option<Network>,

    /// Path of the credentials file.
    pub(crate) credentials: Option<PathBuf>,

    /// Argon2id cost used when encrypting.
    #[serde(default)]
    pub(crate) kdf: KdfParams,
}

impl Config {
    /// Loads the configuration.
    ///
    /// An explicitly named file must exist; the default file is optional.
    pub(crate) fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Path::new(DEFAULT_CONFIG_PATH),
            None => return Ok(Self::default()),
        };

        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = toml::from_str::<Self>(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        debug!(?config, path = %path.display(), "loaded config");

        Ok(config)
    }

    /// Resolves the credentials path, preferring the command line.
    pub(crate) fn credentials_path(&self, cli: Option<PathBuf>) -> PathBuf {
        cli.or_else(|| self.credentials.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_PATH))
    }

    /// Resolves the network, preferring the command line.
    pub(crate) fn network(&self, cli: Option<Network>) -> Network {
        cli.or(self.network).unwrap_or(Network::Livenet)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn config_serde_toml() {
        let config = r#"
            network = "testnet"
            credentials = "alice.json"

            [kdf]
            memory_kib = 65536
            iterations = 3
            parallelism = 4
        "#;

        let config = toml::from_str::<Config>(config);
        assert!(
            config.is_ok(),
            "must be able to deserialize config from toml but got: {}",
            config.unwrap_err()
        );

        let config = config.unwrap();
        assert_eq!(config.network, Some(Network::Testnet));
        assert_eq!(config.kdf.memory_kib, 65536);

        let serialized = toml::to_string(&config).unwrap();
        let deserialized = toml::from_str::<Config>(&serialized).unwrap();
        assert_eq!(
            deserialized, config,
            "must be able to serialize and deserialize config to toml"
        );
    }

    #[test]
    fn partial_kdf_table() {
        let config = toml::from_str::<Config>("[kdf]\niterations = 5\n").unwrap();
        assert_eq!(config.kdf.iterations, 5);
        assert_eq!(config.kdf.memory_kib, KdfParams::default().memory_kib);
        assert_eq!(config.network, None);
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!(toml::from_str::<Config>("seed = \"x\"\n").is_err());
        assert!(toml::from_str::<Config>("network = \"regtest\"\n").is_err());
    }

    #[test]
    fn command_line_wins() {
        let config = Config {
            network: Some(Network::Testnet),
            credentials: Some(PathBuf::from("from-config.json")),
            kdf: KdfParams::default(),
        };
        assert_eq!(config.network(None), Network::Testnet);
        assert_eq!(config.network(Some(Network::Livenet)), Network::Livenet);
        assert_eq!(
            config.credentials_path(Some(PathBuf::from("cli.json"))),
            PathBuf::from("cli.json")
        );
        assert_eq!(
            Config::default().credentials_path(None),
            PathBuf::from(DEFAULT_CREDENTIALS_PATH)
        );
    }

    #[test]
    fn loads_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "network = \"testnet\"").unwrap();
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.network, Some(Network::Testnet));

        let missing = file.path().with_extension("missing");
        assert!(Config::load(Some(&missing)).is_err());
    }
}
