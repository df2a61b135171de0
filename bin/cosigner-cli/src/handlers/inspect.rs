//! Read-only commands.

use std::path::Path;

use anyhow::Result;
use cosigner_credentials::{Credentials, DerivationStrategy, Network, PublicKeyRingEntry};
use serde::Serialize;

use super::print_json;
use crate::{cli::PasswordArgs, store};

/// Public view of stored credentials.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Summary {
    network: Network,
    copayer_id: String,
    x_pub_key: String,
    request_pub_key: String,
    derivation_strategy: DerivationStrategy,
    account: u32,
    base_address_derivation_path: String,
    compliant_derivation: bool,
    encrypted: bool,
    has_mnemonic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    wallet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wallet_name: Option<String>,
    complete: bool,
    public_key_ring: Vec<PublicKeyRingEntry>,
}

impl From<&Credentials> for Summary {
    fn from(credentials: &Credentials) -> Self {
        let wallet = credentials.wallet_info();
        Self {
            network: credentials.network(),
            copayer_id: credentials.copayer_id().to_owned(),
            x_pub_key: credentials.x_pub_key().to_string(),
            request_pub_key: credentials.request_public_key().to_string(),
            derivation_strategy: credentials.derivation_strategy(),
            account: credentials.account().index(),
            base_address_derivation_path: credentials.base_address_derivation_path_str(),
            compliant_derivation: credentials.compliant_derivation(),
            encrypted: credentials.is_priv_key_encrypted(),
            has_mnemonic: credentials.mnemonic().is_some()
                || credentials.mnemonic_encrypted().is_some(),
            wallet_id: wallet.map(|w| w.wallet_id.clone()),
            wallet_name: wallet.map(|w| w.wallet_name.clone()),
            complete: credentials.is_complete(),
            public_key_ring: credentials.public_key_ring().to_vec(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DerivedKey {
    path: String,
    x_priv_key: String,
    x_pub_key: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RootSecrets<'a> {
    x_priv_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    mnemonic: Option<&'a str>,
    mnemonic_has_passphrase: bool,
}

/// Handles the `show` command.
pub(crate) fn handle_show(path: &Path) -> Result<()> {
    let credentials = store::load(path)?;
    print_json(&Summary::from(&credentials))
}

/// Handles the `derive` command.
pub(crate) fn handle_derive(args: PasswordArgs, path: &Path) -> Result<()> {
    let credentials = store::load(path)?;
    let derived = credentials.derived_x_priv_key(args.password.as_deref())?;

    print_json(&DerivedKey {
        path: credentials.base_address_derivation_path_str(),
        x_priv_key: derived.to_string(),
        x_pub_key: credentials.x_pub_key().to_string(),
    })
}

/// Handles the `keys` command.
pub(crate) fn handle_keys(args: PasswordArgs, path: &Path) -> Result<()> {
    let credentials = store::load(path)?;
    let keys = credentials.keys(args.password.as_deref())?;

    print_json(&RootSecrets {
        x_priv_key: keys.x_priv_key().to_string(),
        mnemonic: keys.mnemonic(),
        mnemonic_has_passphrase: credentials.mnemonic_has_passphrase(),
    })
}

#[cfg(test)]
mod tests {
    use cosigner_credentials::{Account, ImportOptions, WalletInfo};

    use super::*;

    #[test]
    fn summary_is_public() {
        let mut credentials = Credentials::from_mnemonic(
            Network::Testnet,
            "level unusual burger hole call main basic flee drama diary argue legal",
            "",
            Account::default(),
            DerivationStrategy::Bip44,
            ImportOptions::default(),
        )
        .unwrap();
        credentials
            .add_wallet_info(WalletInfo::new("wallet-1", "vault", 1, 1))
            .unwrap();

        let json = serde_json::to_value(Summary::from(&credentials)).unwrap();
        assert_eq!(json["baseAddressDerivationPath"], "m/44'/1'/0'");
        assert_eq!(json["hasMnemonic"], true);
        assert_eq!(json["complete"], true);
        assert_eq!(json["walletId"], "wallet-1");

        let text = json.to_string();
        assert!(!text.contains("tprv"));
        assert!(!text.contains("level unusual"));
    }
}
