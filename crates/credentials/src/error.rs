//! Errors returned by credential operations.

use bitcoin::bip32;
use thiserror::Error;

use crate::cipher::CipherError;

/// Error type for every fallible credential operation.
#[derive(Debug, Error)]
pub enum CredentialsError {
    /// The private key is already encrypted; there is no re-encryption.
    #[error("private key is already encrypted")]
    AlreadyEncrypted,

    /// The private key is held in plaintext, there is nothing to decrypt.
    #[error("private key is not encrypted")]
    NotEncrypted,

    /// The password failed to authenticate the stored ciphertext.
    #[error("could not decrypt private key: wrong password")]
    WrongPassword,

    /// The private key is encrypted and the caller gave no password.
    #[error("private key is encrypted, a password is required")]
    PasswordRequired,

    /// The phrase is not a valid mnemonic in any supported language.
    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(#[from] bip39::Error),

    /// The serialized extended private key could not be parsed.
    #[error("invalid extended private key: {0}")]
    InvalidExtendedKey(bip32::Error),

    /// Language code with no wordlist behind it.
    #[error("unknown mnemonic language {0:?}")]
    UnknownLanguage(String),

    /// Derivation strategy name not in {BIP44, BIP45, BIP48}.
    #[error("unknown derivation strategy {0:?}")]
    UnknownDerivationStrategy(String),

    /// Network name not in {livenet, testnet}.
    #[error("unknown network {0:?}")]
    UnknownNetwork(String),

    /// Account index does not fit a hardened child number.
    #[error("account index {0} is out of range")]
    InvalidAccount(u32),

    /// Wallet association parameters are inconsistent.
    #[error("invalid wallet info: {0}")]
    InvalidWalletInfo(&'static str),

    /// A persisted record violates the credential invariants.
    #[error("invalid credentials record: {0}")]
    InvalidRecord(String),

    /// BIP32 child derivation failed.
    #[error("BIP32 derivation error: {0}")]
    Derivation(#[from] bip32::Error),

    /// The cipher failed for a reason other than a wrong password.
    #[error("cipher error: {0}")]
    Cipher(CipherError),
}

impl From<CipherError> for CredentialsError {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::Authentication => Self::WrongPassword,
            other => Self::Cipher(other),
        }
    }
}
