//! Password-based encryption of secret strings.
//!
//! The password is stretched with Argon2id into a 256-bit key, which seals the plaintext with
//! ChaCha20-Poly1305. The result is a self-describing JSON envelope:
//!
//! ```text
//! {"v":1,"kdf":"argon2id","m":19456,"t":2,"p":1,"salt":"<b64>","iv":"<b64>","ct":"<b64>"}
//! ```
//!
//! KDF parameters travel with the ciphertext, so decryption needs nothing but the password. A
//! wrong password fails tag verification and surfaces as [`CipherError::Authentication`].

use argon2::{Algorithm, Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

const ENVELOPE_VERSION: u8 = 1;
const KDF_NAME: &str = "argon2id";
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

/// Upper bounds on KDF costs accepted from an envelope (1 GiB of memory).
const MAX_MEMORY_KIB: u32 = 1 << 20;
const MAX_ITERATIONS: u32 = 64;
const MAX_PARALLELISM: u32 = 16;

/// Errors from the envelope codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    /// The ciphertext is not a well-formed envelope.
    #[error("malformed ciphertext: {0}")]
    Malformed(String),

    /// Tag verification failed: wrong password or tampered ciphertext.
    #[error("authentication failed")]
    Authentication,

    /// The password could not be stretched with the given parameters.
    #[error("key derivation failed: {0}")]
    Kdf(String),

    /// The AEAD refused to encrypt.
    #[error("encryption failed")]
    Encryption,
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    v: u8,
    kdf: String,
    m: u32,
    t: u32,
    p: u32,
    salt: String,
    iv: String,
    ct: String,
}

/// Encrypts `plaintext` under `password`.
pub fn encrypt(plaintext: &str, password: &str, params: &KdfParams) -> Result<String, CipherError> {
    let mut rng = thread_rng();
    let salt: [u8; SALT_LEN] = rng.gen();
    let iv: [u8; NONCE_LEN] = rng.gen();

    let key = stretch(password, &salt, params)?;
    let ct = ChaCha20Poly1305::new(Key::from_slice(&key[..]))
        .encrypt(Nonce::from_slice(&iv), plaintext.as_bytes())
        .map_err(|_| CipherError::Encryption)?;

    let envelope = Envelope {
        v: ENVELOPE_VERSION,
        kdf: KDF_NAME.to_owned(),
        m: params.memory_kib,
        t: params.iterations,
        p: params.parallelism,
        salt: BASE64.encode(salt),
        iv: BASE64.encode(iv),
        ct: BASE64.encode(ct),
    };
    serde_json::to_string(&envelope).map_err(|e| CipherError::Malformed(e.to_string()))
}

/// Decrypts an envelope produced by [`encrypt`].
pub fn decrypt(ciphertext: &str, password: &str) -> Result<Zeroizing<String>, CipherError> {
    let envelope: Envelope =
        serde_json::from_str(ciphertext).map_err(|e| CipherError::Malformed(e.to_string()))?;
    if envelope.v != ENVELOPE_VERSION || envelope.kdf != KDF_NAME {
        return Err(CipherError::Malformed(format!(
            "unsupported envelope v{} ({})",
            envelope.v, envelope.kdf
        )));
    }

    let salt = decode_field(&envelope.salt, "salt")?;
    let iv = decode_field(&envelope.iv, "iv")?;
    let ct = decode_field(&envelope.ct, "ct")?;
    if iv.len() != NONCE_LEN {
        return Err(CipherError::Malformed(format!("iv is {} bytes", iv.len())));
    }

    if envelope.m > MAX_MEMORY_KIB
        || envelope.t > MAX_ITERATIONS
        || envelope.p > MAX_PARALLELISM
    {
        return Err(CipherError::Malformed(format!(
            "kdf cost out of bounds (m={}, t={}, p={})",
            envelope.m, envelope.t, envelope.p
        )));
    }
    let params = KdfParams {
        memory_kib: envelope.m,
        iterations: envelope.t,
        parallelism: envelope.p,
    };
    let key = stretch(password, &salt, &params)?;
    let plaintext = ChaCha20Poly1305::new(Key::from_slice(&key[..]))
        .decrypt(Nonce::from_slice(&iv), ct.as_slice())
        .map_err(|_| CipherError::Authentication)?;

    String::from_utf8(plaintext)
        .map(Zeroizing::new)
        .map_err(|_| CipherError::Malformed("plaintext is not UTF-8".to_owned()))
}

fn stretch(
    password: &str,
    salt: &[u8],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>, CipherError> {
    let params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| CipherError::Kdf(e.to_string()))?;

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password_into(password.as_bytes(), salt, &mut key[..])
        .map_err(|e| CipherError::Kdf(e.to_string()))?;
    Ok(key)
}

fn decode_field(value: &str, name: &str) -> Result<Vec<u8>, CipherError> {
    BASE64
        .decode(value)
        .map_err(|e| CipherError::Malformed(format!("{name}: {e}")))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    /// Cheap parameters so tests do not pay for the default memory cost.
    const FAST: KdfParams = KdfParams {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    };

    #[test]
    fn roundtrip() {
        let ct = encrypt("secret words", "password", &FAST).unwrap();
        assert_eq!(decrypt(&ct, "password").unwrap().as_str(), "secret words");
    }

    #[test]
    fn default_params_roundtrip() {
        let ct = encrypt("secret", "password", &KdfParams::default()).unwrap();
        assert!(ct.contains("\"m\":19456"));
        assert_eq!(decrypt(&ct, "password").unwrap().as_str(), "secret");
    }

    #[test]
    fn wrong_password_fails_authentication() {
        let ct = encrypt("secret", "password", &FAST).unwrap();
        assert_eq!(decrypt(&ct, "wrong"), Err(CipherError::Authentication));
    }

    #[test]
    fn ciphertexts_are_salted() {
        let a = encrypt("secret", "password", &FAST).unwrap();
        let b = encrypt("secret", "password", &FAST).unwrap();
        assert_ne!(a, b);
        assert!(!a.contains("secret"));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let ct = encrypt("secret", "password", &FAST).unwrap();
        let mut envelope: Envelope = serde_json::from_str(&ct).unwrap();
        let mut raw = BASE64.decode(&envelope.ct).unwrap();
        raw[0] ^= 0xff;
        envelope.ct = BASE64.encode(raw);
        let tampered = serde_json::to_string(&envelope).unwrap();
        assert_eq!(
            decrypt(&tampered, "password"),
            Err(CipherError::Authentication)
        );
    }

    #[test]
    fn malformed_envelopes() {
        assert!(matches!(
            decrypt("not json", "password"),
            Err(CipherError::Malformed(_))
        ));
        let ct = encrypt("secret", "password", &FAST).unwrap();
        let other_kdf = ct.replace(KDF_NAME, "scrypt");
        assert!(matches!(
            decrypt(&other_kdf, "password"),
            Err(CipherError::Malformed(_))
        ));
    }

    #[test]
    fn excessive_kdf_costs_are_rejected() {
        let ct = encrypt("secret", "password", &FAST).unwrap();
        for (m, t, p) in [(u32::MAX, 1, 1), (64, u32::MAX, 1), (64, 1, 255)] {
            let mut envelope: Envelope = serde_json::from_str(&ct).unwrap();
            envelope.m = m;
            envelope.t = t;
            envelope.p = p;
            let inflated = serde_json::to_string(&envelope).unwrap();
            assert!(matches!(
                decrypt(&inflated, "password"),
                Err(CipherError::Malformed(_))
            ));
        }
    }

    #[test]
    fn invalid_params() {
        let params = KdfParams {
            memory_kib: 1,
            ..FAST
        };
        assert!(matches!(
            encrypt("secret", "password", &params),
            Err(CipherError::Kdf(_))
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn roundtrip_arbitrary(plaintext in ".*", password in ".{0,32}") {
            let ct = encrypt(&plaintext, &password, &FAST).unwrap();
            let decrypted = decrypt(&ct, &password).unwrap();
            prop_assert_eq!(decrypted.as_str(), plaintext.as_str());
        }
    }
}
