//! Schedule PDF link discovery.
//!
//! The faculty page lists many timetable PDFs. The locator scans every
//! anchor, keeps those whose href ends in `.pdf`, and returns the first one
//! whose link text or href contains the configured keyword. Relative hrefs
//! are resolved against the page URL.

use anyhow::{anyhow, bail, Context, Result};
use scraper::{Html, Selector};
use tracing::info;
use url::Url;

/// Finds the right PDF link inside the schedule listing page.
pub struct PdfLocator {
    keyword: String,
    anchor_selector: Selector,
}

impl PdfLocator {
    pub fn new(keyword: &str) -> Result<Self> {
        let anchor_selector = Selector::parse("a[href]")
            .map_err(|e| anyhow!("Failed to compile anchor selector: {e}"))?;
        Ok(Self {
            keyword: keyword.trim().to_lowercase(),
            anchor_selector,
        })
    }

    /// Scan `html` and return the absolute URL of the first matching PDF link.
    pub fn find_pdf_link(&self, html: &str, page_url: &str) -> Result<Url> {
        let base = Url::parse(page_url)
            .with_context(|| format!("Invalid schedule page URL: {page_url}"))?;
        let document = Html::parse_document(html);

        for anchor in document.select(&self.anchor_selector) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let href_lower = href.to_lowercase();
            if !href_lower.ends_with(".pdf") {
                continue;
            }

            let text = anchor.text().collect::<Vec<_>>().join(" ");
            if text.to_lowercase().contains(&self.keyword) || href_lower.contains(&self.keyword) {
                let resolved = base
                    .join(href)
                    .with_context(|| format!("Cannot resolve PDF href: {href}"))?;
                info!(
                    "🔗 Found matching PDF link: {} (text: {:?})",
                    resolved,
                    text.trim()
                );
                return Ok(resolved);
            }
        }

        bail!(
            "No PDF link containing '{}' found on {}. The page structure may have changed.",
            self.keyword,
            page_url
        )
    }
}
