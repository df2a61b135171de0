//! Commands that change how the root secrets are stored.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::{cli::PasswordArgs, config::Config, store};

/// Handles the `encrypt` command.
pub(crate) fn handle_encrypt(args: PasswordArgs, config: &Config, path: &Path) -> Result<()> {
    let password = required_password(args)?;
    let mut credentials = store::load(path)?;

    credentials.encrypt_private_key_with(&password, &config.kdf)?;
    store::save(path, &credentials)?;
    info!(path = %path.display(), "root secrets encrypted");
    Ok(())
}

/// Handles the `decrypt` command.
pub(crate) fn handle_decrypt(args: PasswordArgs, path: &Path) -> Result<()> {
    let password = required_password(args)?;
    let mut credentials = store::load(path)?;

    credentials.decrypt_private_key(&password)?;
    store::save(path, &credentials)?;
    info!(path = %path.display(), "root secrets decrypted");
    Ok(())
}

/// Handles the `clear-mnemonic` command.
pub(crate) fn handle_clear_mnemonic(path: &Path) -> Result<()> {
    let mut credentials = store::load(path)?;
    credentials.clear_mnemonic();
    store::save(path, &credentials)
}

fn required_password(args: PasswordArgs) -> Result<String> {
    args.password
        .context("a password is required, pass --password or set COSIGNER_PASSWORD")
}
