//! CLI for creating and managing multisig co-signer credentials.

mod cli;
mod config;
mod handlers;
mod store;

use anyhow::Result;
use clap::Parser;
use cosigner_common::logging::{self, LoggerConfig};

use crate::{
    cli::{Cli, Commands},
    config::Config,
    handlers::{create, inspect, secrets, wallet},
};

fn main() -> Result<()> {
    logging::init(LoggerConfig::with_base_name("cosigner-cli"));

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let path = config.credentials_path(cli.credentials);

    match cli.command {
        Commands::Create(args) => create::handle_create(args, &config, &path),
        Commands::ImportXpriv(args) => create::handle_import_xpriv(args, &path),
        Commands::ImportMnemonic(args) => create::handle_import_mnemonic(args, &config, &path),
        Commands::Show => inspect::handle_show(&path),
        Commands::Derive(args) => inspect::handle_derive(args, &path),
        Commands::Keys(args) => inspect::handle_keys(args, &path),
        Commands::Encrypt(args) => secrets::handle_encrypt(args, &config, &path),
        Commands::Decrypt(args) => secrets::handle_decrypt(args, &path),
        Commands::ClearMnemonic => secrets::handle_clear_mnemonic(&path),
        Commands::Join(args) => wallet::handle_join(args, &path),
    }
}
