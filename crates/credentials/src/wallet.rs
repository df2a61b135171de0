//! Wallet association data attached after key creation.
//!
//! None of this participates in key derivation.

use serde::{Deserialize, Serialize};

use crate::error::CredentialsError;

/// Entry of the public key ring shared between co-signers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyRingEntry {
    /// Extended public key of the co-signer's base address derivation key.
    pub x_pub_key: String,
    /// Hex-encoded compressed request public key.
    pub request_pub_key: String,
    /// Display name of the co-signer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copayer_name: Option<String>,
}

/// Association of a credential with a multisig wallet.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
    /// Wallet identifier assigned by the wallet service.
    pub wallet_id: String,
    /// Human readable wallet name.
    pub wallet_name: String,
    /// Required signatures.
    pub m: u32,
    /// Total co-signers.
    pub n: u32,
    /// Hex-encoded wallet private key shared by all co-signers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_priv_key: Option<String>,
    /// This co-signer's display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copayer_name: Option<String>,
}

impl WalletInfo {
    /// Creates an association without a wallet private key or copayer name.
    pub fn new(wallet_id: impl Into<String>, wallet_name: impl Into<String>, m: u32, n: u32) -> Self {
        Self {
            wallet_id: wallet_id.into(),
            wallet_name: wallet_name.into(),
            m,
            n,
            wallet_priv_key: None,
            copayer_name: None,
        }
    }

    /// Sets the shared wallet private key (hex).
    pub fn with_wallet_priv_key(mut self, key: impl Into<String>) -> Self {
        self.wallet_priv_key = Some(key.into());
        self
    }

    /// Sets this co-signer's display name.
    pub fn with_copayer_name(mut self, name: impl Into<String>) -> Self {
        self.copayer_name = Some(name.into());
        self
    }

    /// Checks the `m`-of-`n` parameters.
    pub(crate) fn validate(&self) -> Result<(), CredentialsError> {
        if self.n == 0 {
            return Err(CredentialsError::InvalidWalletInfo("n must be at least 1"));
        }
        if self.m == 0 || self.m > self.n {
            return Err(CredentialsError::InvalidWalletInfo(
                "m must be between 1 and n",
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for WalletInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletInfo")
            .field("wallet_id", &self.wallet_id)
            .field("wallet_name", &self.wallet_name)
            .field("m", &self.m)
            .field("n", &self.n)
            .field(
                "wallet_priv_key",
                &self.wallet_priv_key.as_ref().map(|_| "<redacted>"),
            )
            .field("copayer_name", &self.copayer_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_threshold() {
        assert!(WalletInfo::new("id", "name", 1, 1).validate().is_ok());
        assert!(WalletInfo::new("id", "name", 2, 3).validate().is_ok());
        assert!(WalletInfo::new("id", "name", 0, 3).validate().is_err());
        assert!(WalletInfo::new("id", "name", 4, 3).validate().is_err());
        assert!(WalletInfo::new("id", "name", 0, 0).validate().is_err());
    }

    #[test]
    fn ring_entry_wire_names() {
        let entry = PublicKeyRingEntry {
            x_pub_key: "xpub".to_owned(),
            request_pub_key: "02ab".to_owned(),
            copayer_name: None,
        };
        assert_eq!(
            serde_json::to_string(&entry).unwrap(),
            r#"{"xPubKey":"xpub","requestPubKey":"02ab"}"#
        );
    }

    #[test]
    fn debug_hides_wallet_key() {
        let info = WalletInfo::new("id", "name", 1, 1).with_wallet_priv_key("deadbeef");
        assert!(!format!("{info:?}").contains("deadbeef"));
    }
}
