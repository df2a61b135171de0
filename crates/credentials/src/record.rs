//! Flat persistence form of [`Credentials`].
//!
//! The record is what goes to disk or over the wire. Field names are camelCase and optional
//! fields are omitted when absent. Loading a record keeps the stored identity fields. When the
//! private key is in plaintext they are re-derived from it and must match; an encrypted record
//! can only be checked for internal consistency.

use std::{fmt, str::FromStr};

use bitcoin::bip32::{ChildNumber, Xpriv, Xpub};
use secp256k1::{PublicKey, SecretKey};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::{
    credentials::Credentials,
    derive::DerivationAlgorithm,
    error::CredentialsError,
    identity::{self, Identity},
    network::Network,
    paths::{self, Account, DerivationStrategy},
    secret::{Keys, SealedKeys, SecretState},
    wallet::{PublicKeyRingEntry, WalletInfo},
};

/// Current record layout version.
pub const RECORD_VERSION: u32 = 1;

/// Serializable snapshot of a credential.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRecord {
    /// Record layout version, see [`RECORD_VERSION`].
    pub version: u32,
    /// Network of every key in the record.
    pub network: Network,

    /// Master extended private key, when held in plaintext.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_priv_key: Option<String>,
    /// Ciphertext of the master extended private key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_priv_key_encrypted: Option<String>,
    /// Mnemonic phrase, when held in plaintext.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mnemonic: Option<String>,
    /// Ciphertext of the mnemonic phrase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mnemonic_encrypted: Option<String>,
    /// Whether a non-empty passphrase took part in seed derivation.
    #[serde(default)]
    pub mnemonic_has_passphrase: bool,

    /// Extended public key of the base address derivation key.
    pub x_pub_key: String,
    /// Hex-encoded request private key.
    pub request_priv_key: String,
    /// Hex-encoded compressed request public key.
    pub request_pub_key: String,
    /// Copayer identity handle.
    pub copayer_id: String,
    /// Hex-encoded entropy source.
    pub entropy_source: String,
    /// Base64 personal encrypting key.
    pub personal_encrypting_key: String,

    /// Account index.
    pub account: u32,
    /// Base address path convention.
    pub derivation_strategy: DerivationStrategy,
    /// Whether standards-compliant derivation is used.
    pub compliant_derivation: bool,

    /// Public keys of known co-signers.
    #[serde(default)]
    pub public_key_ring: Vec<PublicKeyRingEntry>,

    /// Associated wallet identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_id: Option<String>,
    /// Associated wallet name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_name: Option<String>,
    /// Required signatures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub m: Option<u32>,
    /// Total co-signers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    /// Hex-encoded shared wallet private key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_priv_key: Option<String>,
    /// This co-signer's display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copayer_name: Option<String>,
    /// Base64 key shared by all co-signers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_encrypting_key: Option<String>,
}

impl fmt::Debug for CredentialsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsRecord")
            .field("version", &self.version)
            .field("network", &self.network)
            .field("copayer_id", &self.copayer_id)
            .field("x_pub_key", &self.x_pub_key)
            .field("encrypted", &self.x_priv_key_encrypted.is_some())
            .field("account", &self.account)
            .field("derivation_strategy", &self.derivation_strategy)
            .field("wallet_id", &self.wallet_id)
            .finish_non_exhaustive()
    }
}

fn invalid(reason: impl Into<String>) -> CredentialsError {
    CredentialsError::InvalidRecord(reason.into())
}

impl Credentials {
    /// Snapshot for persistence.
    pub fn to_record(&self) -> CredentialsRecord {
        let (x_priv_key, x_priv_key_encrypted, mnemonic, mnemonic_encrypted) = match &self.secret
        {
            SecretState::Plaintext(keys) => (
                Some(keys.x_priv_key().to_string()),
                None,
                keys.mnemonic().map(str::to_owned),
                None,
            ),
            SecretState::Encrypted(sealed) => (
                None,
                Some(sealed.x_priv_key.clone()),
                None,
                sealed.mnemonic.clone(),
            ),
        };
        let wallet = self.wallet.as_ref();

        CredentialsRecord {
            version: RECORD_VERSION,
            network: self.network,
            x_priv_key,
            x_priv_key_encrypted,
            mnemonic,
            mnemonic_encrypted,
            mnemonic_has_passphrase: self.mnemonic_has_passphrase,
            x_pub_key: self.identity.x_pub_key.to_string(),
            request_priv_key: hex::encode(self.identity.request_priv_key.secret_bytes()),
            request_pub_key: self.identity.request_pub_key.to_string(),
            copayer_id: self.identity.copayer_id.clone(),
            entropy_source: self.identity.entropy_source.clone(),
            personal_encrypting_key: self.identity.personal_encrypting_key.clone(),
            account: self.account.index(),
            derivation_strategy: self.derivation_strategy,
            compliant_derivation: self.algorithm.is_compliant(),
            public_key_ring: self.public_key_ring.clone(),
            wallet_id: wallet.map(|w| w.wallet_id.clone()),
            wallet_name: wallet.map(|w| w.wallet_name.clone()),
            m: wallet.map(|w| w.m),
            n: wallet.map(|w| w.n),
            wallet_priv_key: wallet.and_then(|w| w.wallet_priv_key.clone()),
            copayer_name: wallet.and_then(|w| w.copayer_name.clone()),
            shared_encrypting_key: self.shared_encrypting_key.clone(),
        }
    }

    /// Restores a credential from a record, rejecting any that break the credential invariants.
    pub fn from_record(record: CredentialsRecord) -> Result<Self, CredentialsError> {
        if record.version != RECORD_VERSION {
            return Err(invalid(format!("unsupported version {}", record.version)));
        }

        let secret = restore_secret(&record)?;
        let identity = restore_identity(&record)?;
        let account = Account::new(record.account)
            .map_err(|_| invalid(format!("account {} out of range", record.account)))?;
        let wallet = restore_wallet(&record)?;
        let algorithm = DerivationAlgorithm::from_compliance(record.compliant_derivation);
        if let SecretState::Plaintext(keys) = &secret {
            verify_identity(keys, &identity, &record, algorithm)?;
        }

        Ok(Self {
            network: record.network,
            secret,
            mnemonic_has_passphrase: record.mnemonic_has_passphrase,
            identity,
            account,
            derivation_strategy: record.derivation_strategy,
            algorithm,
            public_key_ring: record.public_key_ring,
            wallet,
            shared_encrypting_key: record.shared_encrypting_key,
        })
    }
}

fn restore_secret(record: &CredentialsRecord) -> Result<SecretState, CredentialsError> {
    match (&record.x_priv_key, &record.x_priv_key_encrypted) {
        (Some(x_priv_key), None) => {
            if record.mnemonic_encrypted.is_some() {
                return Err(invalid("encrypted mnemonic next to a plaintext private key"));
            }
            let x_priv_key = Xpriv::from_str(x_priv_key)
                .map_err(|e| invalid(format!("xPrivKey: {e}")))?;
            if Network::from(x_priv_key.network) != record.network {
                return Err(invalid("xPrivKey belongs to another network"));
            }
            let mnemonic = record.mnemonic.clone().map(Zeroizing::new);
            Ok(SecretState::Plaintext(Keys::new(x_priv_key, mnemonic)))
        }
        (None, Some(x_priv_key_encrypted)) => {
            if record.mnemonic.is_some() {
                return Err(invalid("plaintext mnemonic next to an encrypted private key"));
            }
            Ok(SecretState::Encrypted(SealedKeys {
                x_priv_key: x_priv_key_encrypted.clone(),
                mnemonic: record.mnemonic_encrypted.clone(),
            }))
        }
        (Some(_), Some(_)) => Err(invalid("both xPrivKey and xPrivKeyEncrypted are set")),
        (None, None) => Err(invalid("neither xPrivKey nor xPrivKeyEncrypted is set")),
    }
}

fn restore_identity(record: &CredentialsRecord) -> Result<Identity, CredentialsError> {
    let x_pub_key =
        Xpub::from_str(&record.x_pub_key).map_err(|e| invalid(format!("xPubKey: {e}")))?;
    if Network::from(x_pub_key.network) != record.network {
        return Err(invalid("xPubKey belongs to another network"));
    }
    if identity::copayer_id(&x_pub_key) != record.copayer_id {
        return Err(invalid("copayerId does not match xPubKey"));
    }

    let request_priv_key = SecretKey::from_str(&record.request_priv_key)
        .map_err(|e| invalid(format!("requestPrivKey: {e}")))?;
    let request_pub_key = PublicKey::from_str(&record.request_pub_key)
        .map_err(|e| invalid(format!("requestPubKey: {e}")))?;
    if request_priv_key.public_key(secp256k1::SECP256K1) != request_pub_key {
        return Err(invalid("requestPubKey does not match requestPrivKey"));
    }

    Ok(Identity {
        x_pub_key,
        request_priv_key,
        request_pub_key,
        copayer_id: record.copayer_id.clone(),
        entropy_source: record.entropy_source.clone(),
        personal_encrypting_key: record.personal_encrypting_key.clone(),
    })
}

/// Re-derives the identity from the plaintext master key.
///
/// `xPubKey` is derived at the account it was created for, which its child number records.
fn verify_identity(
    keys: &Keys,
    identity: &Identity,
    record: &CredentialsRecord,
    algorithm: DerivationAlgorithm,
) -> Result<(), CredentialsError> {
    let ChildNumber::Hardened { index } = identity.x_pub_key.child_number else {
        return Err(invalid("xPubKey is not a hardened child"));
    };
    let account = Account::new(index).map_err(|_| invalid("xPubKey account out of range"))?;
    let base_path =
        paths::base_address_derivation_path(record.derivation_strategy, record.network, account);
    let derived = Identity::derive(keys.x_priv_key(), &base_path, algorithm)
        .map_err(|e| invalid(format!("re-deriving identity: {e}")))?;
    if derived != *identity {
        return Err(invalid("identity fields do not derive from xPrivKey"));
    }
    Ok(())
}

fn restore_wallet(record: &CredentialsRecord) -> Result<Option<WalletInfo>, CredentialsError> {
    let info = match (&record.wallet_id, &record.wallet_name, record.m, record.n) {
        (Some(wallet_id), Some(wallet_name), Some(m), Some(n)) => WalletInfo {
            wallet_id: wallet_id.clone(),
            wallet_name: wallet_name.clone(),
            m,
            n,
            wallet_priv_key: record.wallet_priv_key.clone(),
            copayer_name: record.copayer_name.clone(),
        },
        (None, None, None, None) => return Ok(None),
        _ => return Err(invalid("incomplete wallet info")),
    };
    info.validate()
        .map_err(|e| invalid(format!("wallet info: {e}")))?;
    Ok(Some(info))
}
