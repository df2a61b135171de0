//! Identity material computed once from the master key.
//!
//! - `xPubKey`: public half of the base address derivation key, shared with co-signers.
//! - `copayerId`: `hex(SHA-256(xPubKey))`.
//! - request key: key pair at `m/1'/0`, authenticates requests to the wallet service.
//! - `entropySource`: `SHA-256(request private key)`, seed for the keys below.
//! - `personalEncryptingKey`: `HMAC-SHA256("personalKey", entropySource)[..16]`, base64.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bitcoin::{
    bip32::{self, DerivationPath, Xpriv, Xpub},
    hashes::{hmac, sha256, Hash, HashEngine},
};
use secp256k1::{PublicKey, SecretKey, SECP256K1};
use sha2::{Digest, Sha256};

use crate::{derive::DerivationAlgorithm, paths::REQUEST_KEY_PATH};

/// HMAC key used for the personal encrypting key.
const PERSONAL_KEY_PREFIX: &[u8] = b"personalKey";

/// Length in bytes of the symmetric keys handed to metadata encryption.
const AES_KEY_LEN: usize = 16;

/// Identity fields of a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Identity {
    pub(crate) x_pub_key: Xpub,
    pub(crate) request_priv_key: SecretKey,
    pub(crate) request_pub_key: PublicKey,
    pub(crate) copayer_id: String,
    pub(crate) entropy_source: String,
    pub(crate) personal_encrypting_key: String,
}

impl Identity {
    /// Derives every identity field from `master`.
    pub(crate) fn derive(
        master: &Xpriv,
        base_path: &DerivationPath,
        algorithm: DerivationAlgorithm,
    ) -> Result<Self, bip32::Error> {
        let base = algorithm.derive(master, base_path)?;
        let x_pub_key = Xpub::from_priv(SECP256K1, &base);

        let request = algorithm.derive(master, &REQUEST_KEY_PATH)?;
        let request_priv_key = request.private_key;
        let request_pub_key = request_priv_key.public_key(SECP256K1);

        let entropy_source = Sha256::digest(request_priv_key.secret_bytes());

        Ok(Self {
            copayer_id: copayer_id(&x_pub_key),
            x_pub_key,
            request_priv_key,
            request_pub_key,
            personal_encrypting_key: personal_encrypting_key(&entropy_source),
            entropy_source: hex::encode(entropy_source),
        })
    }
}

/// Stable copayer identity handle for an extended public key.
pub fn copayer_id(x_pub_key: &Xpub) -> String {
    hex::encode(Sha256::digest(x_pub_key.to_string().as_bytes()))
}

/// Personal encrypting key from the entropy source bytes.
pub(crate) fn personal_encrypting_key(entropy_source: &[u8]) -> String {
    let mut engine = hmac::HmacEngine::<sha256::Hash>::new(PERSONAL_KEY_PREFIX);
    engine.input(entropy_source);
    let mac = hmac::Hmac::<sha256::Hash>::from_engine(engine).to_byte_array();
    BASE64.encode(&mac[..AES_KEY_LEN])
}

/// Shared wallet encrypting key from the wallet private key.
pub fn shared_encrypting_key(wallet_priv_key: &SecretKey) -> String {
    let digest = Sha256::digest(wallet_priv_key.secret_bytes());
    BASE64.encode(&digest[..AES_KEY_LEN])
}
