//! Root secret material and its encryption state.
//!
//! The master private key and the optional mnemonic form one bundle. The bundle is either held
//! in plaintext ([`Keys`]) or sealed under a password ([`SealedKeys`]); [`SecretState`] makes
//! the two forms mutually exclusive. Sealing and opening always handle both secrets together,
//! so a failure never leaves one encrypted and the other not.

use std::{fmt, str::FromStr};

use bitcoin::bip32::{ChildNumber, Xpriv};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::{
    cipher::{self, KdfParams},
    error::CredentialsError,
};

/// Plaintext root secrets: master extended private key and optional mnemonic.
#[derive(Clone, PartialEq, Eq)]
pub struct Keys {
    x_priv_key: Xpriv,
    mnemonic: Option<Zeroizing<String>>,
}

impl Keys {
    pub(crate) fn new(x_priv_key: Xpriv, mnemonic: Option<Zeroizing<String>>) -> Self {
        Self {
            x_priv_key,
            mnemonic,
        }
    }

    /// Master extended private key.
    pub const fn x_priv_key(&self) -> &Xpriv {
        &self.x_priv_key
    }

    /// Mnemonic phrase, if one was established and not cleared.
    pub fn mnemonic(&self) -> Option<&str> {
        self.mnemonic.as_deref().map(String::as_str)
    }

    pub(crate) fn clear_mnemonic(&mut self) {
        self.mnemonic = None;
    }

    /// Seals both secrets under `password`.
    pub(crate) fn seal(
        &self,
        password: &str,
        params: &KdfParams,
    ) -> Result<SealedKeys, CredentialsError> {
        let x_priv_key = Zeroizing::new(self.x_priv_key.to_string());
        let x_priv_key = cipher::encrypt(&x_priv_key, password, params)?;
        let mnemonic = self
            .mnemonic
            .as_ref()
            .map(|words| cipher::encrypt(words, password, params))
            .transpose()?;

        Ok(SealedKeys {
            x_priv_key,
            mnemonic,
        })
    }
}

impl fmt::Debug for Keys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keys")
            .field("x_priv_key", &"<redacted>")
            .field("mnemonic", &self.mnemonic.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Drop for Keys {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl Zeroize for Keys {
    fn zeroize(&mut self) {
        let Self {
            x_priv_key,
            mnemonic,
        } = self;

        // The network is public and stays as is.
        //
        // NOTE: `SecretKey::non_secure_erase` writes `1`s to the memory.
        x_priv_key.depth.zeroize();
        {
            let fingerprint: &mut [u8; 4] = x_priv_key.parent_fingerprint.as_mut();
            fingerprint.zeroize();
        }
        x_priv_key.child_number = ChildNumber::Normal { index: 0 };
        x_priv_key.private_key.non_secure_erase();
        {
            let chain_code: &mut [u8; 32] = x_priv_key.chain_code.as_mut();
            chain_code.zeroize();
        }

        // `Zeroizing` wipes the phrase when dropped.
        *mnemonic = None;
    }
}

impl ZeroizeOnDrop for Keys {}

/// Ciphertexts of the root secrets under one password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SealedKeys {
    pub(crate) x_priv_key: String,
    pub(crate) mnemonic: Option<String>,
}

impl SealedKeys {
    /// Decrypts both secrets without touching the sealed form.
    pub(crate) fn open(&self, password: &str) -> Result<Keys, CredentialsError> {
        let x_priv_key = cipher::decrypt(&self.x_priv_key, password)?;
        let x_priv_key = Xpriv::from_str(&x_priv_key).map_err(|e| {
            CredentialsError::InvalidRecord(format!("decrypted private key: {e}"))
        })?;
        let mnemonic = self
            .mnemonic
            .as_deref()
            .map(|ct| cipher::decrypt(ct, password))
            .transpose()?;

        Ok(Keys::new(x_priv_key, mnemonic))
    }
}

/// Encryption state of the root secrets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SecretState {
    Plaintext(Keys),
    Encrypted(SealedKeys),
}

impl SecretState {
    /// Plaintext keys, decrypting in memory with `password` when sealed.
    pub(crate) fn keys(&self, password: Option<&str>) -> Result<Keys, CredentialsError> {
        match self {
            Self::Plaintext(keys) => Ok(keys.clone()),
            Self::Encrypted(sealed) => {
                sealed.open(password.ok_or(CredentialsError::PasswordRequired)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bitcoin::NetworkKind;

    use super::*;

    const FAST: KdfParams = KdfParams {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    };

    fn keys(mnemonic: Option<&str>) -> Keys {
        let xpriv = Xpriv::new_master(NetworkKind::Test, &[3u8; 32]).unwrap();
        Keys::new(xpriv, mnemonic.map(|m| Zeroizing::new(m.to_owned())))
    }

    #[test]
    fn seal_and_open() {
        let keys = keys(Some("one two three"));
        let sealed = keys.seal("pw", &FAST).unwrap();
        assert!(sealed.mnemonic.is_some());
        assert!(!sealed.x_priv_key.contains(&keys.x_priv_key().to_string()));
        assert_eq!(sealed.open("pw").unwrap(), keys);
    }

    #[test]
    fn seal_without_mnemonic() {
        let keys = keys(None);
        let sealed = keys.seal("pw", &FAST).unwrap();
        assert!(sealed.mnemonic.is_none());
        assert_eq!(sealed.open("pw").unwrap().mnemonic(), None);
    }

    #[test]
    fn open_with_wrong_password() {
        let sealed = keys(Some("words")).seal("pw", &FAST).unwrap();
        assert!(matches!(
            sealed.open("nope"),
            Err(CredentialsError::WrongPassword)
        ));
    }

    #[test]
    fn state_requires_password_when_sealed() {
        let state = SecretState::Encrypted(keys(None).seal("pw", &FAST).unwrap());
        assert!(matches!(
            state.keys(None),
            Err(CredentialsError::PasswordRequired)
        ));
        assert!(state.keys(Some("pw")).is_ok());
        assert!(matches!(state, SecretState::Encrypted(_)));
    }

    #[test]
    fn zeroize_wipes_key_material() {
        let mut keys = keys(Some("words"));
        keys.zeroize();
        assert_eq!(keys.x_priv_key().private_key.secret_bytes(), [1u8; 32]);
        assert_eq!(*keys.x_priv_key().chain_code.as_bytes(), [0u8; 32]);
        assert_eq!(keys.x_priv_key().depth, 0);
        assert_eq!(keys.mnemonic(), None);
    }

    #[test]
    fn debug_redacts() {
        let rendered = format!("{:?}", keys(Some("secret words")));
        assert!(!rendered.contains("secret words"));
        assert!(!rendered.contains("tprv"));
    }
}
