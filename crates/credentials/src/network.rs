//! Networks a credential can belong to.

use std::{fmt, str::FromStr};

use bitcoin::NetworkKind;
use serde::{Deserialize, Serialize};

use crate::error::CredentialsError;

/// Network a credential is bound to. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Bitcoin mainnet (`xprv`/`xpub` version bytes).
    Livenet,
    /// Any test network (`tprv`/`tpub` version bytes).
    Testnet,
}

impl Network {
    /// Version-byte family used when serializing extended keys.
    pub const fn kind(self) -> NetworkKind {
        match self {
            Self::Livenet => NetworkKind::Main,
            Self::Testnet => NetworkKind::Test,
        }
    }
}

impl From<NetworkKind> for Network {
    fn from(kind: NetworkKind) -> Self {
        match kind {
            NetworkKind::Main => Self::Livenet,
            NetworkKind::Test => Self::Testnet,
        }
    }
}

impl From<Network> for NetworkKind {
    fn from(network: Network) -> Self {
        network.kind()
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Livenet => f.write_str("livenet"),
            Self::Testnet => f.write_str("testnet"),
        }
    }
}

impl FromStr for Network {
    type Err = CredentialsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "livenet" => Ok(Self::Livenet),
            "testnet" => Ok(Self::Testnet),
            other => Err(CredentialsError::UnknownNetwork(other.to_owned())),
        }
    }
}
