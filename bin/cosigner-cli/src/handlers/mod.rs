//! Subcommand handlers.

pub(crate) mod create;
pub(crate) mod inspect;
pub(crate) mod secrets;
pub(crate) mod wallet;

use anyhow::{Context, Result};
use serde::Serialize;

/// Prints `value` as pretty JSON on stdout.
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}
