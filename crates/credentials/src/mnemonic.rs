//! Mnemonic generation, import and seed stretching (BIP39).

use std::{fmt, str::FromStr};

use bip39::Mnemonic;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::CredentialsError;

/// Entropy behind a freshly generated mnemonic: 128 bits, 12 words.
const MNEMONIC_ENTROPY_BYTES: usize = 16;

/// Wordlist languages a mnemonic can be generated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Language {
    /// `en`
    English,
    /// `es`
    Spanish,
    /// `ja`
    Japanese,
    /// `zh`, simplified characters.
    Chinese,
    /// `fr`
    French,
    /// `it`
    Italian,
}

impl Language {
    /// Every supported language.
    pub const ALL: [Self; 6] = [
        Self::English,
        Self::Spanish,
        Self::Japanese,
        Self::Chinese,
        Self::French,
        Self::Italian,
    ];

    /// Two-letter language code.
    pub const fn code(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Spanish => "es",
            Self::Japanese => "ja",
            Self::Chinese => "zh",
            Self::French => "fr",
            Self::Italian => "it",
        }
    }

    const fn wordlist(self) -> bip39::Language {
        match self {
            Self::English => bip39::Language::English,
            Self::Spanish => bip39::Language::Spanish,
            Self::Japanese => bip39::Language::Japanese,
            Self::Chinese => bip39::Language::SimplifiedChinese,
            Self::French => bip39::Language::French,
            Self::Italian => bip39::Language::Italian,
        }
    }

    /// Japanese phrases are joined with an ideographic space.
    const fn separator(self) -> &'static str {
        match self {
            Self::Japanese => "\u{3000}",
            _ => " ",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = CredentialsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.code() == s)
            .ok_or_else(|| CredentialsError::UnknownLanguage(s.to_owned()))
    }
}

impl TryFrom<String> for Language {
    type Error = CredentialsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Language> for String {
    fn from(lang: Language) -> Self {
        lang.code().to_owned()
    }
}

/// Generates a fresh 12-word phrase in `language`.
pub(crate) fn generate<R: RngCore + CryptoRng>(
    rng: &mut R,
    language: Language,
) -> Result<Zeroizing<String>, CredentialsError> {
    let mut entropy = Zeroizing::new([0u8; MNEMONIC_ENTROPY_BYTES]);
    rng.fill_bytes(&mut entropy[..]);

    let mnemonic = Mnemonic::from_entropy_in(language.wordlist(), &entropy[..])?;
    let words: Vec<&str> = mnemonic.words().collect();
    Ok(Zeroizing::new(words.join(language.separator())))
}

/// Validates `words`, detecting the language from the wordlists.
pub(crate) fn parse(words: &str) -> Result<Mnemonic, CredentialsError> {
    match Mnemonic::parse(words) {
        Ok(mnemonic) => Ok(mnemonic),
        // Words shared between wordlists; the checksum settles it.
        Err(bip39::Error::AmbiguousLanguages(candidates)) => {
            let found = candidates
                .iter()
                .find_map(|lang| Mnemonic::parse_in(lang, words).ok());
            found.ok_or(CredentialsError::InvalidMnemonic(
                bip39::Error::AmbiguousLanguages(candidates),
            ))
        }
        Err(err) => Err(err.into()),
    }
}

/// Whether `words` is a valid phrase in the given language.
pub fn words_are_valid(words: &str, language: Language) -> bool {
    Mnemonic::parse_in(language.wordlist(), words).is_ok()
}

/// Stretches a validated mnemonic and passphrase into a 64-byte seed.
pub(crate) fn to_seed(mnemonic: &Mnemonic, passphrase: &str) -> Zeroizing<[u8; 64]> {
    Zeroizing::new(mnemonic.to_seed(passphrase))
}
