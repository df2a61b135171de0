//! BIP32 derivation paths for the copayer key hierarchy.
//!
//! # Key Hierarchy Overview
//!
//! ```text
//! Master key (m)
//! ├── m/1'/0 ──────────────────────── Request key (server authentication)
//! ├── m/44'/<coin>'/<account>' ────── Base address key, BIP44 strategy
//! ├── m/45' ───────────────────────── Base address key, BIP45 strategy
//! └── m/48'/<coin>'/<account>' ────── Base address key, BIP48 strategy
//! ```
//!
//! | Network | Coin type |
//! |---------|-----------|
//! | livenet | `0'`      |
//! | testnet | `1'`      |
//!
//! The request key lives outside every address branch so that revoking one never
//! touches the other.

use std::{fmt, str::FromStr};

use bitcoin::bip32::{ChildNumber, DerivationPath};
use serde::{Deserialize, Serialize};

use crate::{error::CredentialsError, network::Network};

/// Path of the request key, relative to the master key (`m/1'/0`).
pub(crate) const REQUEST_KEY_PATH: &[ChildNumber] = &[
    ChildNumber::Hardened { index: 1 },
    ChildNumber::Normal { index: 0 },
];

/// Shared co-signer root used by the BIP45 strategy (`m/45'`).
const BIP45_PATH: &[ChildNumber] = &[ChildNumber::Hardened { index: 45 }];

/// Coin type per network, for the BIP44 and BIP48 strategies.
const fn coin_type(network: Network) -> u32 {
    match network {
        Network::Livenet => 0,
        Network::Testnet => 1,
    }
}

/// Path convention used for the base address derivation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DerivationStrategy {
    /// `m/44'/<coin>'/<account>'`.
    #[serde(rename = "BIP44")]
    Bip44,
    /// `m/45'`, independent of network and account.
    #[serde(rename = "BIP45")]
    Bip45,
    /// `m/48'/<coin>'/<account>'`.
    #[serde(rename = "BIP48")]
    Bip48,
}

impl DerivationStrategy {
    /// Strategy name as used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bip44 => "BIP44",
            Self::Bip45 => "BIP45",
            Self::Bip48 => "BIP48",
        }
    }
}

impl fmt::Display for DerivationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DerivationStrategy {
    type Err = CredentialsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BIP44" => Ok(Self::Bip44),
            "BIP45" => Ok(Self::Bip45),
            "BIP48" => Ok(Self::Bip48),
            other => Err(CredentialsError::UnknownDerivationStrategy(
                other.to_owned(),
            )),
        }
    }
}

/// BIP44-style account index, guaranteed to fit a hardened child number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Account(u32);

impl Account {
    /// Validates `index` as an account number.
    pub fn new(index: u32) -> Result<Self, CredentialsError> {
        ChildNumber::from_hardened_idx(index)
            .map(|_| Self(index))
            .map_err(|_| CredentialsError::InvalidAccount(index))
    }

    /// Raw account index.
    pub const fn index(self) -> u32 {
        self.0
    }

    const fn child_number(self) -> ChildNumber {
        ChildNumber::Hardened { index: self.0 }
    }
}

/// Base address derivation path for a strategy, network and account.
///
/// All segments are hardened.
pub fn base_address_derivation_path(
    strategy: DerivationStrategy,
    network: Network,
    account: Account,
) -> DerivationPath {
    let purpose = match strategy {
        DerivationStrategy::Bip45 => return DerivationPath::from(BIP45_PATH),
        DerivationStrategy::Bip44 => 44,
        DerivationStrategy::Bip48 => 48,
    };

    DerivationPath::from(vec![
        ChildNumber::Hardened { index: purpose },
        ChildNumber::Hardened {
            index: coin_type(network),
        },
        account.child_number(),
    ])
}

/// Renders `path` in the canonical `m/...` form.
///
/// The master key alone renders as `m`.
pub fn format_path(path: &DerivationPath) -> String {
    let segments: &[ChildNumber] = path.as_ref();
    segments
        .iter()
        .fold(String::from("m"), |mut out, child| {
            out.push('/');
            out.push_str(&child.to_string());
            out
        })
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn path(strategy: DerivationStrategy, network: Network, account: u32) -> String {
        format_path(&base_address_derivation_path(
            strategy,
            network,
            Account::new(account).unwrap(),
        ))
    }

    #[test]
    fn bip44_paths() {
        assert_eq!(
            path(DerivationStrategy::Bip44, Network::Livenet, 0),
            "m/44'/0'/0'"
        );
        assert_eq!(
            path(DerivationStrategy::Bip44, Network::Testnet, 2),
            "m/44'/1'/2'"
        );
    }

    #[test]
    fn bip48_paths() {
        assert_eq!(
            path(DerivationStrategy::Bip48, Network::Livenet, 0),
            "m/48'/0'/0'"
        );
        assert_eq!(
            path(DerivationStrategy::Bip48, Network::Testnet, 7),
            "m/48'/1'/7'"
        );
    }

    #[test]
    fn request_key_path() {
        assert_eq!(format_path(&DerivationPath::from(REQUEST_KEY_PATH)), "m/1'/0");
    }

    #[test]
    fn master_path_renders_as_m() {
        assert_eq!(format_path(&DerivationPath::master()), "m");
        assert_eq!(
            format_path(&DerivationPath::from_str("m/48'/1'/0'").unwrap()),
            "m/48'/1'/0'"
        );
    }

    #[test]
    fn account_range() {
        assert!(Account::new(0).is_ok());
        assert!(Account::new((1 << 31) - 1).is_ok());
        assert!(matches!(
            Account::new(1 << 31),
            Err(CredentialsError::InvalidAccount(_))
        ));
    }

    #[test]
    fn strategy_names() {
        for strategy in [
            DerivationStrategy::Bip44,
            DerivationStrategy::Bip45,
            DerivationStrategy::Bip48,
        ] {
            assert_eq!(strategy.as_str().parse::<DerivationStrategy>().unwrap(), strategy);
            assert_eq!(
                serde_json::to_string(&strategy).unwrap(),
                format!("\"{strategy}\"")
            );
        }
        assert!("BIP32".parse::<DerivationStrategy>().is_err());
    }

    proptest! {
        #[test]
        fn bip45_ignores_network_and_account(account in 0u32..(1 << 31), testnet in any::<bool>()) {
            let network = if testnet { Network::Testnet } else { Network::Livenet };
            prop_assert_eq!(path(DerivationStrategy::Bip45, network, account), "m/45'");
        }

        #[test]
        fn account_is_last_hardened_segment(account in 0u32..(1 << 31)) {
            let path = base_address_derivation_path(
                DerivationStrategy::Bip44,
                Network::Livenet,
                Account::new(account).unwrap(),
            );
            let segments: &[ChildNumber] = path.as_ref();
            prop_assert_eq!(segments.len(), 3);
            prop_assert!(segments.iter().all(ChildNumber::is_hardened));
            prop_assert_eq!(segments[2], ChildNumber::Hardened { index: account });
        }
    }
}
