//! The credential aggregate: root secrets, derived identity and wallet association.

use std::{fmt, str::FromStr};

use bitcoin::bip32::{DerivationPath, Xpriv, Xpub};
use rand::{thread_rng, CryptoRng, RngCore};
use secp256k1::{PublicKey, SecretKey};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::{
    cipher::KdfParams,
    derive::DerivationAlgorithm,
    error::CredentialsError,
    identity::{self, Identity},
    mnemonic::{self, Language},
    network::Network,
    paths::{self, Account, DerivationStrategy},
    secret::{Keys, SecretState},
    wallet::{PublicKeyRingEntry, WalletInfo},
};

/// Entropy drawn for a random master key, used directly as the BIP32 seed.
const RANDOM_SEED_BYTES: usize = 64;

/// Options for importing existing key material.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    /// Use the legacy non-compliant derivation to recover old wallets.
    pub non_compliant_derivation: bool,
}

/// Key material of one wallet participant.
///
/// The root secrets are either held in plaintext or sealed under a password. Identity fields
/// (`xPubKey`, request key, copayer id, personal encrypting key) are computed once when the
/// credential is established and stay fixed across encryption cycles and account changes.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub(crate) network: Network,
    pub(crate) secret: SecretState,
    pub(crate) mnemonic_has_passphrase: bool,
    pub(crate) identity: Identity,
    pub(crate) account: Account,
    pub(crate) derivation_strategy: DerivationStrategy,
    pub(crate) algorithm: DerivationAlgorithm,
    pub(crate) public_key_ring: Vec<PublicKeyRingEntry>,
    pub(crate) wallet: Option<WalletInfo>,
    pub(crate) shared_encrypting_key: Option<String>,
}

impl Credentials {
    /// Creates a credential from a fresh random master key.
    pub fn create(network: Network) -> Result<Self, CredentialsError> {
        Self::create_with_rng(&mut thread_rng(), network)
    }

    /// [`Credentials::create`] with an explicit entropy source.
    pub fn create_with_rng<R: RngCore + CryptoRng>(
        rng: &mut R,
        network: Network,
    ) -> Result<Self, CredentialsError> {
        let mut seed = Zeroizing::new([0u8; RANDOM_SEED_BYTES]);
        rng.fill_bytes(&mut seed[..]);
        let x_priv_key = Xpriv::new_master(network.kind(), &seed[..])?;

        Self::establish(
            Keys::new(x_priv_key, None),
            false,
            Account::default(),
            DerivationStrategy::Bip44,
            DerivationAlgorithm::Standard,
        )
    }

    /// Creates a credential from a freshly generated 12-word mnemonic.
    pub fn create_with_mnemonic(
        network: Network,
        passphrase: &str,
        language: Language,
        account: Account,
    ) -> Result<Self, CredentialsError> {
        Self::create_with_mnemonic_with_rng(&mut thread_rng(), network, passphrase, language, account)
    }

    /// [`Credentials::create_with_mnemonic`] with an explicit entropy source.
    pub fn create_with_mnemonic_with_rng<R: RngCore + CryptoRng>(
        rng: &mut R,
        network: Network,
        passphrase: &str,
        language: Language,
        account: Account,
    ) -> Result<Self, CredentialsError> {
        let words = mnemonic::generate(rng, language)?;
        let x_priv_key = master_from_words(network, &words, passphrase)?;

        Self::establish(
            Keys::new(x_priv_key, Some(words)),
            !passphrase.is_empty(),
            account,
            DerivationStrategy::Bip44,
            DerivationAlgorithm::Standard,
        )
    }

    /// Imports a serialized master extended private key.
    ///
    /// The network is taken from the key's version bytes. No mnemonic is recorded.
    pub fn from_extended_private_key(
        x_priv_key: &str,
        account: Account,
        derivation_strategy: DerivationStrategy,
        options: ImportOptions,
    ) -> Result<Self, CredentialsError> {
        let x_priv_key =
            Xpriv::from_str(x_priv_key).map_err(CredentialsError::InvalidExtendedKey)?;

        Self::establish(
            Keys::new(x_priv_key, None),
            false,
            account,
            derivation_strategy,
            DerivationAlgorithm::from_compliance(!options.non_compliant_derivation),
        )
    }

    /// Imports a mnemonic phrase in any supported language.
    ///
    /// The phrase is kept exactly as supplied.
    pub fn from_mnemonic(
        network: Network,
        words: &str,
        passphrase: &str,
        account: Account,
        derivation_strategy: DerivationStrategy,
        options: ImportOptions,
    ) -> Result<Self, CredentialsError> {
        let x_priv_key = master_from_words(network, words, passphrase)?;

        Self::establish(
            Keys::new(x_priv_key, Some(Zeroizing::new(words.to_owned()))),
            !passphrase.is_empty(),
            account,
            derivation_strategy,
            DerivationAlgorithm::from_compliance(!options.non_compliant_derivation),
        )
    }

    fn establish(
        keys: Keys,
        mnemonic_has_passphrase: bool,
        account: Account,
        derivation_strategy: DerivationStrategy,
        algorithm: DerivationAlgorithm,
    ) -> Result<Self, CredentialsError> {
        let network = Network::from(keys.x_priv_key().network);
        let base_path = paths::base_address_derivation_path(derivation_strategy, network, account);
        let identity = Identity::derive(keys.x_priv_key(), &base_path, algorithm)?;

        info!(
            %network,
            %derivation_strategy,
            account = account.index(),
            compliant = algorithm.is_compliant(),
            copayer_id = %identity.copayer_id,
            "established credentials"
        );

        Ok(Self {
            network,
            secret: SecretState::Plaintext(keys),
            mnemonic_has_passphrase,
            public_key_ring: vec![own_ring_entry(&identity, None)],
            identity,
            account,
            derivation_strategy,
            algorithm,
            wallet: None,
            shared_encrypting_key: None,
        })
    }

    /// Network the credential is bound to.
    pub const fn network(&self) -> Network {
        self.network
    }

    /// Current account index.
    pub const fn account(&self) -> Account {
        self.account
    }

    /// Reassigns the account. Changes the base address derivation path.
    pub fn set_account(&mut self, account: Account) {
        debug!(from = self.account.index(), to = account.index(), "reassigning account");
        self.account = account;
    }

    /// Path convention of the base address derivation key.
    pub const fn derivation_strategy(&self) -> DerivationStrategy {
        self.derivation_strategy
    }

    /// Child derivation algorithm fixed at creation or import.
    pub const fn derivation_algorithm(&self) -> DerivationAlgorithm {
        self.algorithm
    }

    /// Whether standards-compliant derivation is used.
    pub const fn compliant_derivation(&self) -> bool {
        self.algorithm.is_compliant()
    }

    /// Path of the base address derivation key for the current strategy, network and account.
    pub fn base_address_derivation_path(&self) -> DerivationPath {
        paths::base_address_derivation_path(self.derivation_strategy, self.network, self.account)
    }

    /// [`Self::base_address_derivation_path`] in its canonical `m/...` string form.
    pub fn base_address_derivation_path_str(&self) -> String {
        paths::format_path(&self.base_address_derivation_path())
    }

    /// Private key at the base address derivation path.
    ///
    /// When encrypted, `password` decrypts in memory only; the stored state does not change.
    pub fn derived_x_priv_key(&self, password: Option<&str>) -> Result<Xpriv, CredentialsError> {
        let keys = self.secret.keys(password)?;
        let path = self.base_address_derivation_path();
        Ok(self.algorithm.derive(keys.x_priv_key(), &path)?)
    }

    /// Plaintext root secrets, decrypting in memory with `password` when encrypted.
    pub fn keys(&self, password: Option<&str>) -> Result<Keys, CredentialsError> {
        self.secret.keys(password)
    }

    /// Master extended private key, if held in plaintext.
    pub const fn x_priv_key(&self) -> Option<&Xpriv> {
        match &self.secret {
            SecretState::Plaintext(keys) => Some(keys.x_priv_key()),
            SecretState::Encrypted(_) => None,
        }
    }

    /// Ciphertext of the master extended private key, if encrypted.
    pub fn x_priv_key_encrypted(&self) -> Option<&str> {
        match &self.secret {
            SecretState::Plaintext(_) => None,
            SecretState::Encrypted(sealed) => Some(&sealed.x_priv_key),
        }
    }

    /// Mnemonic phrase, if present and held in plaintext.
    pub fn mnemonic(&self) -> Option<&str> {
        match &self.secret {
            SecretState::Plaintext(keys) => keys.mnemonic(),
            SecretState::Encrypted(_) => None,
        }
    }

    /// Ciphertext of the mnemonic, if present and encrypted.
    pub fn mnemonic_encrypted(&self) -> Option<&str> {
        match &self.secret {
            SecretState::Plaintext(_) => None,
            SecretState::Encrypted(sealed) => sealed.mnemonic.as_deref(),
        }
    }

    /// Whether a non-empty passphrase took part in seed derivation.
    pub const fn mnemonic_has_passphrase(&self) -> bool {
        self.mnemonic_has_passphrase
    }

    /// Irreversibly discards the mnemonic, in whichever form it is held.
    pub fn clear_mnemonic(&mut self) {
        match &mut self.secret {
            SecretState::Plaintext(keys) => keys.clear_mnemonic(),
            SecretState::Encrypted(sealed) => sealed.mnemonic = None,
        }
        info!(copayer_id = %self.identity.copayer_id, "cleared mnemonic");
    }

    /// Whether the root secrets are encrypted.
    pub const fn is_priv_key_encrypted(&self) -> bool {
        matches!(self.secret, SecretState::Encrypted(_))
    }

    /// Whether the credential holds a private key, encrypted or not.
    ///
    /// A credential always carries its root secret in one of the two forms.
    pub const fn can_sign(&self) -> bool {
        match self.secret {
            SecretState::Plaintext(_) | SecretState::Encrypted(_) => true,
        }
    }

    /// Encrypts the root secrets under `password` with default KDF parameters.
    pub fn encrypt_private_key(&mut self, password: &str) -> Result<(), CredentialsError> {
        self.encrypt_private_key_with(password, &KdfParams::default())
    }

    /// Encrypts the root secrets under `password` with explicit KDF parameters.
    pub fn encrypt_private_key_with(
        &mut self,
        password: &str,
        params: &KdfParams,
    ) -> Result<(), CredentialsError> {
        let SecretState::Plaintext(keys) = &self.secret else {
            return Err(CredentialsError::AlreadyEncrypted);
        };

        let sealed = keys.seal(password, params)?;
        self.secret = SecretState::Encrypted(sealed);
        info!(copayer_id = %self.identity.copayer_id, "encrypted private key");
        Ok(())
    }

    /// Decrypts the root secrets. On failure the credential stays encrypted and unchanged.
    pub fn decrypt_private_key(&mut self, password: &str) -> Result<(), CredentialsError> {
        let SecretState::Encrypted(sealed) = &self.secret else {
            return Err(CredentialsError::NotEncrypted);
        };

        let keys = sealed.open(password).inspect_err(|err| {
            warn!(copayer_id = %self.identity.copayer_id, %err, "could not decrypt private key")
        })?;
        self.secret = SecretState::Plaintext(keys);
        info!(copayer_id = %self.identity.copayer_id, "decrypted private key");
        Ok(())
    }

    /// Extended public key of the base address derivation key.
    pub const fn x_pub_key(&self) -> &Xpub {
        &self.identity.x_pub_key
    }

    /// Copayer identity handle.
    pub fn copayer_id(&self) -> &str {
        &self.identity.copayer_id
    }

    /// Request signing key.
    pub const fn request_private_key(&self) -> &SecretKey {
        &self.identity.request_priv_key
    }

    /// Public half of the request signing key.
    pub const fn request_public_key(&self) -> &PublicKey {
        &self.identity.request_pub_key
    }

    /// Hex-encoded entropy source behind the personal encrypting key.
    pub fn entropy_source(&self) -> &str {
        &self.identity.entropy_source
    }

    /// Base64 key for encrypting personal metadata.
    pub fn personal_encrypting_key(&self) -> &str {
        &self.identity.personal_encrypting_key
    }

    /// Associates the credential with a wallet.
    ///
    /// For a 1-of-1 wallet the public key ring is reset to this credential alone.
    pub fn add_wallet_info(&mut self, info: WalletInfo) -> Result<(), CredentialsError> {
        info.validate()?;
        let shared_encrypting_key = info
            .wallet_priv_key
            .as_deref()
            .map(|key_hex| {
                SecretKey::from_str(key_hex)
                    .map(|key| identity::shared_encrypting_key(&key))
                    .map_err(|_| {
                        CredentialsError::InvalidWalletInfo("wallet private key is not a valid key")
                    })
            })
            .transpose()?;

        if info.n == 1 {
            self.public_key_ring = vec![own_ring_entry(&self.identity, info.copayer_name.clone())];
        }

        info!(
            wallet_id = %info.wallet_id,
            m = info.m,
            n = info.n,
            "attached wallet info"
        );
        self.shared_encrypting_key = shared_encrypting_key;
        self.wallet = Some(info);
        Ok(())
    }

    /// Wallet association, if attached.
    pub const fn wallet_info(&self) -> Option<&WalletInfo> {
        self.wallet.as_ref()
    }

    /// Whether a wallet association is attached.
    pub const fn has_wallet_info(&self) -> bool {
        self.wallet.is_some()
    }

    /// Base64 key shared by all co-signers, if a wallet private key was attached.
    pub fn shared_encrypting_key(&self) -> Option<&str> {
        self.shared_encrypting_key.as_deref()
    }

    /// Replaces the public key ring.
    pub fn add_public_key_ring(&mut self, entries: Vec<PublicKeyRingEntry>) {
        debug!(entries = entries.len(), "replacing public key ring");
        self.public_key_ring = entries;
    }

    /// Public keys of all known co-signers.
    pub fn public_key_ring(&self) -> &[PublicKeyRingEntry] {
        &self.public_key_ring
    }

    /// Whether every co-signer of the wallet is in the public key ring.
    pub fn is_complete(&self) -> bool {
        self.wallet
            .as_ref()
            .is_some_and(|info| self.public_key_ring.len() == info.n as usize)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("network", &self.network)
            .field("copayer_id", &self.identity.copayer_id)
            .field("x_pub_key", &self.identity.x_pub_key)
            .field("account", &self.account.index())
            .field("derivation_strategy", &self.derivation_strategy)
            .field("algorithm", &self.algorithm)
            .field("encrypted", &self.is_priv_key_encrypted())
            .field("wallet", &self.wallet)
            .finish_non_exhaustive()
    }
}

fn master_from_words(
    network: Network,
    words: &str,
    passphrase: &str,
) -> Result<Xpriv, CredentialsError> {
    let parsed = mnemonic::parse(words)?;
    let seed = mnemonic::to_seed(&parsed, passphrase);
    Ok(Xpriv::new_master(network.kind(), &seed[..])?)
}

fn own_ring_entry(identity: &Identity, copayer_name: Option<String>) -> PublicKeyRingEntry {
    PublicKeyRingEntry {
        x_pub_key: identity.x_pub_key.to_string(),
        request_pub_key: identity.request_pub_key.to_string(),
        copayer_name,
    }
}
