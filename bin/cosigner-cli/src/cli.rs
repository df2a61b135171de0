use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use cosigner_credentials::{DerivationStrategy, Language, Network};

#[derive(Parser, Debug)]
#[command(
    name = "cosigner-cli",
    about = "Create, import and manage multisig co-signer credentials",
    version
)]
pub(crate) struct Cli {
    #[arg(
        long,
        short = 'c',
        global = true,
        help = "TOML configuration file [default: cosigner.toml, if present]"
    )]
    pub(crate) config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = "COSIGNER_CREDENTIALS",
        help = "credentials file, overrides the configuration"
    )]
    pub(crate) credentials: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Commands {
    /// Create new credentials from fresh randomness.
    Create(CreateArgs),

    /// Import credentials from an extended private key.
    ImportXpriv(ImportXprivArgs),

    /// Import credentials from a mnemonic phrase.
    ImportMnemonic(ImportMnemonicArgs),

    /// Print the public identity of the stored credentials.
    Show,

    /// Print the private key at the base address derivation path.
    Derive(PasswordArgs),

    /// Print the root secrets.
    Keys(PasswordArgs),

    /// Encrypt the stored root secrets.
    Encrypt(PasswordArgs),

    /// Decrypt the stored root secrets.
    Decrypt(PasswordArgs),

    /// Discard the stored mnemonic.
    ClearMnemonic,

    /// Attach wallet information.
    Join(JoinArgs),
}

#[derive(Args, Debug, Clone)]
pub(crate) struct PasswordArgs {
    #[arg(
        long,
        env = "COSIGNER_PASSWORD",
        hide_env_values = true,
        help = "password protecting the root secrets"
    )]
    pub(crate) password: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct KeyOptions {
    #[arg(long, default_value_t = 0, help = "account index")]
    pub(crate) account: u32,

    #[arg(
        long,
        default_value_t = DerivationStrategy::Bip44,
        help = "derivation strategy: BIP44, BIP45 or BIP48"
    )]
    pub(crate) strategy: DerivationStrategy,

    #[arg(long, help = "recover a wallet created with the legacy derivation")]
    pub(crate) non_compliant_derivation: bool,

    #[arg(long, help = "overwrite an existing credentials file")]
    pub(crate) force: bool,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct CreateArgs {
    #[arg(long, help = "livenet or testnet, overrides the configuration")]
    pub(crate) network: Option<Network>,

    #[arg(long, help = "back the new key with a mnemonic phrase")]
    pub(crate) mnemonic: bool,

    #[arg(
        long,
        default_value_t = Language::English,
        help = "mnemonic language: en, es, ja, zh, fr or it"
    )]
    pub(crate) language: Language,

    #[arg(
        long,
        env = "COSIGNER_SEED_PASSPHRASE",
        hide_env_values = true,
        default_value = "",
        help = "seed passphrase combined with the mnemonic"
    )]
    pub(crate) passphrase: String,

    #[arg(long, default_value_t = 0, help = "account index")]
    pub(crate) account: u32,

    #[arg(long, help = "overwrite an existing credentials file")]
    pub(crate) force: bool,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ImportXprivArgs {
    #[arg(long, env = "COSIGNER_XPRIV", hide_env_values = true, help = "master extended private key")]
    pub(crate) xpriv: String,

    #[command(flatten)]
    pub(crate) options: KeyOptions,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ImportMnemonicArgs {
    #[arg(long, env = "COSIGNER_MNEMONIC", hide_env_values = true, help = "mnemonic phrase")]
    pub(crate) words: String,

    #[arg(long, help = "livenet or testnet, overrides the configuration")]
    pub(crate) network: Option<Network>,

    #[arg(
        long,
        env = "COSIGNER_SEED_PASSPHRASE",
        hide_env_values = true,
        default_value = "",
        help = "seed passphrase used when the mnemonic was created"
    )]
    pub(crate) passphrase: String,

    #[command(flatten)]
    pub(crate) options: KeyOptions,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct JoinArgs {
    #[arg(long, help = "wallet identifier")]
    pub(crate) wallet_id: String,

    #[arg(long, help = "wallet name")]
    pub(crate) wallet_name: String,

    #[arg(short, help = "required signatures")]
    pub(crate) m: u32,

    #[arg(short, help = "total co-signers")]
    pub(crate) n: u32,

    #[arg(long, hide_env_values = true, env = "COSIGNER_WALLET_PRIV_KEY", help = "hex wallet private key")]
    pub(crate) wallet_priv_key: Option<String>,

    #[arg(long, help = "display name of this co-signer")]
    pub(crate) copayer_name: Option<String>,
}
