//! Establishing new credentials: random, mnemonic-backed, or imported.

use std::path::Path;

use anyhow::{Context, Result};
use cosigner_credentials::{Account, Credentials, DerivationStrategy, ImportOptions};
use tracing::info;

use super::{inspect::Summary, print_json};
use crate::{
    cli::{CreateArgs, ImportMnemonicArgs, ImportXprivArgs, KeyOptions},
    config::Config,
    store,
};

/// Handles the `create` command.
pub(crate) fn handle_create(args: CreateArgs, config: &Config, path: &Path) -> Result<()> {
    let network = config.network(args.network);
    let account = Account::new(args.account)?;

    let credentials = if args.mnemonic {
        Credentials::create_with_mnemonic(network, &args.passphrase, args.language, account)?
    } else {
        // Re-import so the shared public key follows the requested account.
        let fresh = Credentials::create(network)?;
        let keys = fresh.keys(None)?;
        Credentials::from_extended_private_key(
            &keys.x_priv_key().to_string(),
            account,
            DerivationStrategy::Bip44,
            ImportOptions::default(),
        )?
    };
    info!(%network, mnemonic = args.mnemonic, "created credentials");

    store::create(path, &credentials, args.force)?;
    print_json(&Summary::from(&credentials))
}

/// Handles the `import-xpriv` command.
pub(crate) fn handle_import_xpriv(args: ImportXprivArgs, path: &Path) -> Result<()> {
    let (account, options) = key_options(&args.options)?;
    let credentials = Credentials::from_extended_private_key(
        &args.xpriv,
        account,
        args.options.strategy,
        options,
    )
    .context("failed to import extended private key")?;

    store::create(path, &credentials, args.options.force)?;
    print_json(&Summary::from(&credentials))
}

/// Handles the `import-mnemonic` command.
pub(crate) fn handle_import_mnemonic(
    args: ImportMnemonicArgs,
    config: &Config,
    path: &Path,
) -> Result<()> {
    let (account, options) = key_options(&args.options)?;
    let credentials = Credentials::from_mnemonic(
        config.network(args.network),
        &args.words,
        &args.passphrase,
        account,
        args.options.strategy,
        options,
    )
    .context("failed to import mnemonic")?;

    store::create(path, &credentials, args.options.force)?;
    print_json(&Summary::from(&credentials))
}

fn key_options(options: &KeyOptions) -> Result<(Account, ImportOptions)> {
    Ok((
        Account::new(options.account)?,
        ImportOptions {
            non_compliant_derivation: options.non_compliant_derivation,
        },
    ))
}
