//! One full update cycle, end to end.
//!
//! Workflow:
//! 1. Fetch the faculty page and find the schedule PDF link.
//! 2. Download the PDF with retries.
//! 3. Compare its SHA-256 digest with the stored one.
//! 4. When changed (or forced): parse, refresh the database, flag changed
//!    rows and regenerate the HTML page.
//! 5. When unchanged: log and stop cleanly.
//!
//! A parse that yields zero entries leaves the database and page untouched:
//! wiping published data over a source format hiccup is worse than serving
//! one stale week.

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{info, warn};

use crate::infrastructure::change_detector::ChangeDetector;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::document::ScheduleDocument;
use crate::infrastructure::html_renderer::HtmlRenderer;
use crate::infrastructure::http_client::{HttpClient, HttpClientConfig};
use crate::infrastructure::parsing::PageMatcher;
use crate::infrastructure::pdf_downloader::PdfDownloader;
use crate::infrastructure::pdf_locator::PdfLocator;
use crate::infrastructure::repository::ScheduleRepository;

/// How a run ended. `Published` is the only outcome that wrote anything
/// besides the hash record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The PDF digest matched the previous run.
    Unchanged,
    /// Parsing found nothing; database and page were left as they were.
    NoEntries,
    /// Entries were parsed and logged only.
    DryRun { parsed: usize },
    /// Full refresh went through.
    Published {
        cleared: u64,
        inserted: u64,
        changed: u64,
    },
}

pub struct UpdateRunner {
    config: AppConfig,
    force: bool,
    dry_run: bool,
}

impl UpdateRunner {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            force: false,
            dry_run: false,
        }
    }

    /// Process the PDF even when its digest matches the stored one.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Parse and log entries but do not persist anything.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn run(&self) -> Result<UpdateOutcome> {
        info!("{}", "=".repeat(60));
        info!(
            "SAN schedule updater started at {}",
            Local::now().to_rfc3339()
        );
        if self.dry_run {
            info!("DRY-RUN mode - database and HTML will NOT be modified.");
        }
        self.config.ensure_directories().await?;

        // Step 1: find and download the PDF
        let http = HttpClient::new(HttpClientConfig {
            timeout_seconds: self.config.scrape.request_timeout_secs,
            ..HttpClientConfig::default()
        })
        .context("Failed to build HTTP client")?;

        info!(
            "Fetching schedule page: {}",
            self.config.scrape.source_page_url
        );
        let page_html = http
            .get_text(&self.config.scrape.source_page_url)
            .await
            .context("Failed to fetch the schedule page")?;

        let locator = PdfLocator::new(&self.config.scrape.pdf_keyword)?;
        let pdf_url = locator.find_pdf_link(&page_html, &self.config.scrape.source_page_url)?;

        let downloader = PdfDownloader::new(
            self.config.scrape.max_download_retries,
            self.config.scrape.retry_backoff_base_secs,
        );
        let pdf_path = downloader
            .download(&http, &pdf_url, &self.config.paths.pdf_dir)
            .await
            .context("Failed to acquire PDF")?;

        // Step 2: change detection. A forced run skips the digest entirely,
        // leaving the stored hash as the last organic baseline.
        let detector = ChangeDetector::new(self.config.paths.hash_path.clone());
        let changed = self.force || detector.has_changed(&pdf_path).await?;
        if !changed {
            info!("No changes detected - nothing to do.");
            return Ok(UpdateOutcome::Unchanged);
        }

        // Step 3: parse
        info!("Parsing PDF: {}", pdf_path.display());
        let document = ScheduleDocument::open(&pdf_path).context("PDF parsing failed")?;
        let matcher = PageMatcher::new(self.config.scrape.target_groups.clone())?;
        let entries = matcher
            .collect_entries(document.pages())
            .context("PDF parsing failed")?;

        if entries.is_empty() {
            warn!(
                "Parser returned 0 entries for groups {:?}. \
                 The PDF format may have changed - manual review required.",
                self.config.scrape.target_groups
            );
            return Ok(UpdateOutcome::NoEntries);
        }
        info!("Parsed {} schedule entr(ies).", entries.len());

        if self.dry_run {
            for entry in &entries {
                info!(
                    "  [DRY-RUN] {} | {} | {} | {}-{} | {}",
                    entry.group_name,
                    entry.subject,
                    entry.day,
                    entry.time_start,
                    entry.time_end,
                    entry.room
                );
            }
            return Ok(UpdateOutcome::DryRun {
                parsed: entries.len(),
            });
        }

        // Step 4: refresh the database
        let repository = ScheduleRepository::connect(&self.config.paths.database_url())
            .await
            .context("Database update failed")?;
        repository.migrate().await?;

        let previous = repository.fetch_fingerprints().await?;
        let cleared = repository.clear_schedule().await?;
        let inserted = repository.insert_entries(&entries).await?;
        let changed_count = repository.mark_changed_entries(&previous).await?;

        repository
            .set_meta("last_update", &Local::now().to_rfc3339())
            .await?;
        let source_name = pdf_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        repository.set_meta("source_pdf", &source_name).await?;
        info!(
            "Database updated: removed {} old rows, inserted {} new rows, {} changed.",
            cleared, inserted, changed_count
        );

        // Step 5: regenerate the page
        let renderer = HtmlRenderer::new(self.config.scrape.target_groups.clone());
        let stored = repository.fetch_all().await?;
        renderer
            .write_to(&stored, &self.config.paths.output_html)
            .await
            .context("HTML generation failed")?;
        info!(
            "Schedule page regenerated: {}",
            self.config.paths.output_html.display()
        );

        info!("Update complete.");
        Ok(UpdateOutcome::Published {
            cleared,
            inserted,
            changed: changed_count,
        })
    }
}
