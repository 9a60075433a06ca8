//! Scrape pagination and throttle controls.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use url::Url;

/// Placeholder substituted with the page number in a URL template.
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Default listing URL for the public course catalog.
pub const DEFAULT_URL_TEMPLATE: &str = "https://courses.analyticsvidhya.com/collections?page={page}";

/// Knobs that bound a scrape run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrapeControls {
    url_template: String,
    start_page: u32,
    max_pages: u32,
    politeness_delay: Duration,
}

impl ScrapeControls {
    /// Constructs a new set of scrape controls.
    pub fn new(
        url_template: impl Into<String>,
        start_page: u32,
        max_pages: u32,
        politeness_delay: Duration,
    ) -> Result<Self> {
        let url_template = url_template.into();
        anyhow::ensure!(
            url_template.contains(PAGE_PLACEHOLDER),
            "url template must contain {PAGE_PLACEHOLDER}"
        );
        anyhow::ensure!(max_pages > 0, "max pages must be at least 1");
        Ok(Self {
            url_template,
            start_page,
            max_pages,
            politeness_delay,
        })
    }

    /// First page number requested.
    pub fn start_page(&self) -> u32 {
        self.start_page
    }

    /// Upper bound on the number of pages fetched in one run.
    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Time to wait between successive page fetches.
    pub fn politeness_delay(&self) -> Duration {
        self.politeness_delay
    }

    /// Page numbers this run may visit, in order.
    pub fn pages(&self) -> impl Iterator<Item = u32> {
        let start = self.start_page;
        (0..self.max_pages).map_while(move |offset| start.checked_add(offset))
    }

    /// Resolves the listing URL for `page`.
    pub fn page_url(&self, page: u32) -> Result<Url> {
        let raw = self
            .url_template
            .replace(PAGE_PLACEHOLDER, &page.to_string());
        Url::parse(&raw).with_context(|| format!("invalid listing url {raw}"))
    }
}

impl Default for ScrapeControls {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            start_page: 1,
            max_pages: 9,
            politeness_delay: Duration::ZERO,
        }
    }
}

/// Command-line interface for the scraper binary.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "coursefinder-scrape",
    about = "Scrape the course catalog into a CSV file"
)]
pub struct ScrapeCli {
    /// Listing URL with a {page} placeholder
    #[arg(long, env = "COURSEFINDER_URL_TEMPLATE", default_value = DEFAULT_URL_TEMPLATE)]
    pub url_template: String,

    /// First page number to fetch
    #[arg(long, env = "COURSEFINDER_START_PAGE", default_value_t = 1)]
    pub start_page: u32,

    /// Maximum number of pages to fetch; the run also stops at the first empty page
    #[arg(long, env = "COURSEFINDER_MAX_PAGES", default_value_t = 9)]
    pub max_pages: u32,

    /// Milliseconds to wait between page fetches
    #[arg(long, env = "COURSEFINDER_POLITENESS_MS", default_value_t = 0)]
    pub politeness_ms: u64,

    /// Seconds before a page request times out
    #[arg(long, env = "COURSEFINDER_HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// CSV file to write (overwritten if present)
    #[arg(
        long,
        env = "COURSEFINDER_CSV",
        default_value = "analytics_vidhya_courses.csv"
    )]
    pub output: PathBuf,
}

impl ScrapeCli {
    /// Converts the parsed CLI into `ScrapeControls`.
    pub fn build_controls(&self) -> Result<ScrapeControls> {
        ScrapeControls::new(
            self.url_template.clone(),
            self.start_page,
            self.max_pages,
            Duration::from_millis(self.politeness_ms),
        )
    }

    /// Per-request HTTP timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_page_number() {
        let controls = ScrapeControls::default();
        let url = controls.page_url(3).expect("url");
        assert_eq!(
            url.as_str(),
            "https://courses.analyticsvidhya.com/collections?page=3"
        );
    }

    #[test]
    fn rejects_template_without_placeholder() {
        let err = ScrapeControls::new("https://example.com/list", 1, 3, Duration::ZERO)
            .expect_err("missing placeholder");
        assert!(err.to_string().contains("{page}"));
    }

    #[test]
    fn pages_are_bounded_by_max_pages() {
        let controls =
            ScrapeControls::new("https://example.com/?p={page}", 4, 3, Duration::ZERO).unwrap();
        assert_eq!(controls.pages().collect::<Vec<_>>(), vec![4, 5, 6]);
    }
}
