//! Wallet association.

use std::path::Path;

use anyhow::Result;
use cosigner_credentials::WalletInfo;

use super::{inspect::Summary, print_json};
use crate::{cli::JoinArgs, store};

/// Handles the `join` command.
pub(crate) fn handle_join(args: JoinArgs, path: &Path) -> Result<()> {
    let mut credentials = store::load(path)?;

    let mut info = WalletInfo::new(args.wallet_id, args.wallet_name, args.m, args.n);
    if let Some(key) = args.wallet_priv_key {
        info = info.with_wallet_priv_key(key);
    }
    if let Some(name) = args.copayer_name {
        info = info.with_copayer_name(name);
    }

    credentials.add_wallet_info(info)?;
    store::save(path, &credentials)?;
    print_json(&Summary::from(&credentials))
}
