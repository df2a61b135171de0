//! Child key derivation algorithms.
//!
//! Two algorithms exist behind [`DerivationAlgorithm`]:
//!
//! - [`DerivationAlgorithm::Standard`] is plain BIP32.
//! - [`DerivationAlgorithm::Legacy`] reproduces a historical derivation used by old wallets. For
//!   hardened children the parent private key is fed to HMAC-SHA512 in its minimal big-endian
//!   form, i.e. without zero-padding to 32 bytes. Non-hardened children are derived exactly as in
//!   BIP32.
//!
//! The two only diverge when a parent private key along the path starts with a zero byte, which
//! happens for roughly one key in 256. Credentials record the algorithm once, at creation or
//! import, and never switch afterwards.

use bitcoin::{
    bip32::{self, ChainCode, ChildNumber, Xpriv},
    hashes::{hmac, sha512, Hash, HashEngine},
    secp256k1::Scalar,
};
use secp256k1::SECP256K1;

/// Child derivation algorithm, fixed as provenance of a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DerivationAlgorithm {
    /// Standards-compliant BIP32 derivation.
    Standard,
    /// Non-compliant derivation kept to recover legacy wallets.
    Legacy,
}

impl DerivationAlgorithm {
    /// Picks the algorithm from the `compliant` provenance flag.
    pub const fn from_compliance(compliant: bool) -> Self {
        if compliant {
            Self::Standard
        } else {
            Self::Legacy
        }
    }

    /// Whether this is the standards-compliant algorithm.
    pub const fn is_compliant(self) -> bool {
        matches!(self, Self::Standard)
    }

    /// Derives `path` from `parent`, one child at a time.
    pub fn derive<P: AsRef<[ChildNumber]>>(
        self,
        parent: &Xpriv,
        path: &P,
    ) -> Result<Xpriv, bip32::Error> {
        match self {
            Self::Standard => parent.derive_priv(SECP256K1, path),
            Self::Legacy => path
                .as_ref()
                .iter()
                .try_fold(*parent, |key, child| match child {
                    ChildNumber::Hardened { .. } => legacy_hardened_child(&key, *child),
                    ChildNumber::Normal { .. } => key.derive_priv(SECP256K1, &[*child]),
                }),
        }
    }
}

/// Hardened child derivation with the parent key stripped of leading zero bytes.
fn legacy_hardened_child(parent: &Xpriv, child: ChildNumber) -> Result<Xpriv, bip32::Error> {
    let secret = parent.private_key.secret_bytes();
    let start = secret.iter().position(|b| *b != 0).unwrap_or(secret.len());

    let mut engine = hmac::HmacEngine::<sha512::Hash>::new(parent.chain_code.as_bytes());
    engine.input(&[0u8]);
    engine.input(&secret[start..]);
    engine.input(&u32::from(child).to_be_bytes());
    let output = hmac::Hmac::<sha512::Hash>::from_engine(engine).to_byte_array();

    let mut tweak = [0u8; 32];
    tweak.copy_from_slice(&output[..32]);
    let mut chain_code = [0u8; 32];
    chain_code.copy_from_slice(&output[32..]);

    let tweak = Scalar::from_be_bytes(tweak)
        .map_err(|_| bip32::Error::Secp256k1(secp256k1::Error::InvalidTweak))?;
    let private_key = parent.private_key.add_tweak(&tweak)?;

    Ok(Xpriv {
        network: parent.network,
        depth: parent.depth + 1,
        parent_fingerprint: parent.fingerprint(SECP256K1),
        child_number: child,
        private_key,
        chain_code: ChainCode::from(chain_code),
    })
}
