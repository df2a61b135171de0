//! HD wallet credentials for multisig co-signers.
//!
//! This crate owns the key material of one wallet participant: master key generation and import,
//! mnemonic handling, derivation path policy for the BIP44, BIP45 and BIP48 conventions, the
//! legacy non-compliant derivation, identity derivation, and password encryption of the root
//! secrets.
//!
//! # Usage
//!
//! ```rust,ignore
//! use cosigner_credentials::{Account, Credentials, Language, Network};
//!
//! let mut creds =
//!     Credentials::create_with_mnemonic(Network::Testnet, "", Language::English, Account::default())?;
//! let words = creds.mnemonic().map(str::to_owned);
//!
//! // Share the public half with co-signers.
//! let xpub = creds.x_pub_key().to_string();
//!
//! // Seal the root secrets; derivation still works with the password.
//! creds.encrypt_private_key("correct horse")?;
//! let derived = creds.derived_x_priv_key(Some("correct horse"))?;
//! ```
//!
//! # Key Hierarchy
//!
//! See the [`paths`] module. Every constructor fixes the derivation algorithm once; identity
//! fields never change afterwards.

pub mod cipher;
mod credentials;
pub mod derive;
mod error;
mod identity;
pub mod mnemonic;
mod network;
pub mod paths;
mod record;
mod secret;
mod wallet;

pub use credentials::{Credentials, ImportOptions};
pub use error::CredentialsError;
pub use identity::{copayer_id, shared_encrypting_key};
pub use mnemonic::Language;
pub use network::Network;
pub use paths::{Account, DerivationStrategy};
pub use record::{CredentialsRecord, RECORD_VERSION};
pub use secret::Keys;
pub use wallet::{PublicKeyRingEntry, WalletInfo};
