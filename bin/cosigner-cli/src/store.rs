//! Credentials file on disk.
//!
//! The file holds the JSON form of [`CredentialsRecord`]. Writes go to a temporary file in the
//! same directory which is then renamed over the target, so a crash never leaves a truncated
//! file behind.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use cosigner_credentials::{Credentials, CredentialsRecord};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Reads and validates the credentials file at `path`.
pub(crate) fn load(path: &Path) -> Result<Credentials> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read credentials file {}", path.display()))?;
    let record = serde_json::from_str::<CredentialsRecord>(&text)
        .with_context(|| format!("failed to parse credentials file {}", path.display()))?;
    debug!(?record, "loaded credentials record");

    Credentials::from_record(record)
        .with_context(|| format!("invalid credentials in {}", path.display()))
}

/// Writes `credentials` to `path`, replacing any previous file.
pub(crate) fn save(path: &Path, credentials: &Credentials) -> Result<()> {
    let json = serde_json::to_string_pretty(&credentials.to_record())
        .context("failed to serialize credentials")?;

    let mut file = NamedTempFile::new_in(parent_dir(path))
        .context("failed to create temporary credentials file")?;
    file.write_all(json.as_bytes())?;
    file.write_all(b"\n")?;
    file.as_file().sync_all()?;
    file.persist(path)
        .with_context(|| format!("failed to write credentials file {}", path.display()))?;

    info!(path = %path.display(), "saved credentials");
    Ok(())
}

/// Like [`save`], but refuses to replace an existing file unless `force` is set.
pub(crate) fn create(path: &Path, credentials: &Credentials, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists, pass --force to overwrite it",
            path.display()
        );
    }
    save(path, credentials)
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use cosigner_credentials::{cipher::KdfParams, Account, DerivationStrategy, ImportOptions};

    use super::*;

    const MASTER: &str = "xprv9s21ZrQH143K2TjT3rF4m5AJcMvCetfQbVjFEx1Rped8qzcMJwbqxv21k3ftL69z7n3gqvvHthkdzbW14gxEFDYQdrRQMub3XdkJyt3GGGc";

    fn credentials() -> Credentials {
        Credentials::from_extended_private_key(
            MASTER,
            Account::default(),
            DerivationStrategy::Bip44,
            ImportOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");

        let creds = credentials();
        save(&path, &creds).unwrap();
        assert_eq!(load(&path).unwrap(), creds);

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"xPubKey\""));
    }

    #[test]
    fn save_replaces_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");

        let mut creds = credentials();
        save(&path, &creds).unwrap();
        creds
            .encrypt_private_key_with(
                "pw",
                &KdfParams {
                    memory_kib: 64,
                    iterations: 1,
                    parallelism: 1,
                },
            )
            .unwrap();
        save(&path, &creds).unwrap();

        let loaded = load(&path).unwrap();
        assert!(loaded.is_priv_key_encrypted());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn create_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("creds.json");

        create(&path, &credentials(), false).unwrap();
        assert!(create(&path, &credentials(), false).is_err());
        create(&path, &credentials(), true).unwrap();
    }

    #[test]
    fn load_reports_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(load(&missing).is_err());

        let garbage = dir.path().join("garbage.json");
        fs::write(&garbage, "{\"version\": 1}").unwrap();
        assert!(load(&garbage).is_err());
    }

    #[test]
    fn parent_of_bare_file_name() {
        assert_eq!(parent_dir(Path::new("creds.json")), PathBuf::from("."));
        assert_eq!(parent_dir(Path::new("a/creds.json")), PathBuf::from("a"));
    }
}
