//! PDF change detection.
//!
//! The SHA-256 digest of the downloaded PDF is kept in a plain-text file.
//! On each run the fresh digest is compared against the stored one; a
//! missing record counts as a first run and therefore as a change.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, info};

pub struct ChangeDetector {
    hash_path: PathBuf,
}

impl ChangeDetector {
    pub fn new(hash_path: PathBuf) -> Self {
        Self { hash_path }
    }

    /// True when `pdf_path` differs from the last recorded digest.
    ///
    /// Persists the fresh digest whenever it reports a change, so the next
    /// run compares against the current document.
    pub async fn has_changed(&self, pdf_path: &Path) -> Result<bool> {
        let new_hash = compute_hash(pdf_path).await?;

        match self.read_stored_hash().await? {
            None => {
                info!("First run detected - treating as changed.");
                self.save_hash(&new_hash).await?;
                Ok(true)
            }
            Some(stored) if stored != new_hash => {
                info!(
                    "📄 PDF has changed (old={}…, new={}…)",
                    prefix(&stored),
                    prefix(&new_hash)
                );
                self.save_hash(&new_hash).await?;
                Ok(true)
            }
            Some(_) => {
                info!("PDF is unchanged - skipping update.");
                Ok(false)
            }
        }
    }

    async fn read_stored_hash(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.hash_path).await {
            Ok(content) => {
                let stored = content.trim().to_string();
                debug!("Stored hash: {}", stored);
                Ok(Some(stored))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No stored hash found - treating as first run.");
                Ok(None)
            }
            Err(err) => {
                Err(err).with_context(|| format!("Failed to read hash file {:?}", self.hash_path))
            }
        }
    }

    async fn save_hash(&self, digest: &str) -> Result<()> {
        if let Some(parent) = self.hash_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create hash file directory")?;
            }
        }
        fs::write(&self.hash_path, digest)
            .await
            .with_context(|| format!("Failed to write hash file {:?}", self.hash_path))?;
        debug!("Saved new hash: {}", digest);
        Ok(())
    }
}

/// SHA-256 hex digest of the file at `path`.
async fn compute_hash(path: &Path) -> Result<String> {
    let bytes = fs::read(path)
        .await
        .with_context(|| format!("Failed to read PDF for hashing: {path:?}"))?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hex::encode(hasher.finalize());
    debug!("Hash of {} (sha256): {}", path.display(), digest);
    Ok(digest)
}

fn prefix(digest: &str) -> &str {
    digest.get(..12).unwrap_or(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn digest_matches_the_known_sha256_vector() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("sample.pdf");
        fs::write(&file, b"abc").await.unwrap();

        let digest = compute_hash(&file).await.unwrap();
        assert_eq!(
            digest,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn first_run_is_a_change_and_records_the_digest() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("schedule.pdf");
        fs::write(&pdf, b"%PDF-1.7 fake").await.unwrap();

        let detector = ChangeDetector::new(dir.path().join("last_hash.txt"));
        assert!(detector.has_changed(&pdf).await.unwrap());
        // The second run sees the recorded digest and stays quiet.
        assert!(!detector.has_changed(&pdf).await.unwrap());
    }

    #[tokio::test]
    async fn modified_pdf_is_reported_as_changed() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("schedule.pdf");
        let detector = ChangeDetector::new(dir.path().join("last_hash.txt"));

        fs::write(&pdf, b"version one").await.unwrap();
        detector.has_changed(&pdf).await.unwrap();

        fs::write(&pdf, b"version two").await.unwrap();
        assert!(detector.has_changed(&pdf).await.unwrap());
    }

    #[tokio::test]
    async fn corrupt_hash_record_still_compares_safely() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("schedule.pdf");
        fs::write(&pdf, b"content").await.unwrap();

        let hash_path = dir.path().join("last_hash.txt");
        fs::write(&hash_path, "garbage\n").await.unwrap();

        let detector = ChangeDetector::new(hash_path);
        assert!(detector.has_changed(&pdf).await.unwrap());
    }

    #[tokio::test]
    async fn missing_pdf_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let detector = ChangeDetector::new(dir.path().join("last_hash.txt"));
        assert!(detector
            .has_changed(&dir.path().join("nope.pdf"))
            .await
            .is_err());
    }
}
