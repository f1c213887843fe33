//! Schedule PDF download with retry.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::fs;
use tracing::{error, info, warn};
use url::Url;

use super::http_client::HttpClient;

const FALLBACK_FILE_NAME: &str = "schedule.pdf";

/// Downloads the located PDF into the configured directory.
///
/// Transient network failures are retried with exponential backoff:
/// `base^attempt` seconds between tries, so the defaults wait 2 s and then
/// 4 s before the final attempt.
pub struct PdfDownloader {
    max_retries: u32,
    backoff_base_secs: u64,
}

impl PdfDownloader {
    pub fn new(max_retries: u32, backoff_base_secs: u64) -> Self {
        Self {
            max_retries,
            backoff_base_secs,
        }
    }

    /// Fetch `pdf_url` into `dest_dir`, returning the saved file path.
    ///
    /// The file name is the last URL path segment.
    pub async fn download(
        &self,
        http: &HttpClient,
        pdf_url: &Url,
        dest_dir: &Path,
    ) -> Result<PathBuf> {
        fs::create_dir_all(dest_dir)
            .await
            .with_context(|| format!("Failed to create download directory {dest_dir:?}"))?;
        let dest = dest_dir.join(file_name(pdf_url));

        for attempt in 1..=self.max_retries {
            info!(
                "⬇️  Downloading PDF (attempt {}/{}): {}",
                attempt, self.max_retries, pdf_url
            );
            match http.get_bytes(pdf_url.as_str()).await {
                Ok(bytes) => {
                    fs::write(&dest, &bytes)
                        .await
                        .with_context(|| format!("Failed to write {dest:?}"))?;
                    info!("PDF saved to {} ({} bytes)", dest.display(), bytes.len());
                    return Ok(dest);
                }
                Err(err) => {
                    warn!("Download attempt {} failed: {:#}", attempt, err);
                    if attempt == self.max_retries {
                        error!("All {} download attempts failed.", self.max_retries);
                        return Err(err.context(format!("Downloading {pdf_url}")));
                    }
                    let wait = self.backoff_base_secs.pow(attempt);
                    info!("Retrying in {} second(s)", wait);
                    tokio::time::sleep(Duration::from_secs(wait)).await;
                }
            }
        }

        bail!("max_download_retries must be at least 1")
    }
}

/// Last path segment of the URL, or a fixed fallback for pathless URLs.
fn file_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .unwrap_or(FALLBACK_FILE_NAME)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_comes_from_the_last_path_segment() {
        let url = Url::parse("https://san.edu.pl/plany/dzienne205.pdf").unwrap();
        assert_eq!(file_name(&url), "dzienne205.pdf");
    }

    #[test]
    fn query_string_does_not_leak_into_the_file_name() {
        let url = Url::parse("https://san.edu.pl/plany/dzienne205.pdf?v=3").unwrap();
        assert_eq!(file_name(&url), "dzienne205.pdf");
    }

    #[test]
    fn pathless_url_falls_back_to_default_name() {
        let url = Url::parse("https://san.edu.pl/").unwrap();
        assert_eq!(file_name(&url), FALLBACK_FILE_NAME);
    }

    #[test]
    fn backoff_grows_exponentially() {
        let downloader = PdfDownloader::new(3, 2);
        assert_eq!(downloader.backoff_base_secs.pow(1), 2);
        assert_eq!(downloader.backoff_base_secs.pow(2), 4);
    }
}
