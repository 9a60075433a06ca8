//! Course catalog scraper: listing-page parsing plus the sequential page walk.

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};
use url::Url;

use crate::controls::ScrapeControls;
use crate::course::CourseRecord;

const USER_AGENT: &str = "coursefinder/0.1 (+https://github.com/coursefinder/coursefinder)";

/// CSS selectors for the fields captured from each course card.
#[derive(Clone)]
struct CardSelectors {
    item: Selector,
    title: Selector,
    lessons: Selector,
    rating: Selector,
    link: Selector,
}

impl CardSelectors {
    fn new() -> Self {
        Self {
            item: Selector::parse("li.products__list-item").expect("item selector"),
            title: Selector::parse("h3").expect("title selector"),
            lessons: Selector::parse("span.course-card__lesson-count").expect("lessons selector"),
            rating: Selector::parse("span.stars__rating").expect("rating selector"),
            link: Selector::parse("a.course-card").expect("link selector"),
        }
    }

    fn extract(&self, item: ElementRef<'_>) -> CourseRecord {
        CourseRecord {
            title: first_text(item, &self.title),
            lessons: first_text(item, &self.lessons),
            rating: first_text(item, &self.rating),
            link: item
                .select(&self.link)
                .next()
                .and_then(|anchor| anchor.value().attr("href"))
                .map(str::to_string),
        }
    }
}

fn first_text(item: ElementRef<'_>, selector: &Selector) -> Option<String> {
    item.select(selector).next().map(|el| {
        let mut raw = String::new();
        for piece in el.text() {
            raw.push_str(piece);
        }
        raw.trim().to_string()
    })
}

/// Extracts every course card found in a listing page.
///
/// Cards missing a sub-element keep the corresponding field as `None`.
pub fn parse_listing(html: &str) -> Vec<CourseRecord> {
    let selectors = CardSelectors::new();
    let document = Html::parse_document(html);
    document
        .select(&selectors.item)
        .map(|item| selectors.extract(item))
        .collect()
}

/// Summary of a completed scrape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeReport {
    /// All extracted records, in page order.
    pub courses: Vec<CourseRecord>,
    /// Number of pages requested, including a trailing empty page.
    pub pages_fetched: u32,
    /// True when the walk ended on a page with no course cards.
    pub stopped_on_empty_page: bool,
}

/// Walks listing pages in order, stopping at the first page without course
/// cards or after `controls.max_pages()` pages.
///
/// `fetch` returns the HTML body for a page URL; any error aborts the walk.
pub fn collect_pages<F>(controls: &ScrapeControls, mut fetch: F) -> Result<ScrapeReport>
where
    F: FnMut(&Url) -> Result<String>,
{
    let mut report = ScrapeReport::default();
    for page in controls.pages() {
        if report.pages_fetched > 0 && !controls.politeness_delay().is_zero() {
            thread::sleep(controls.politeness_delay());
        }
        let url = controls.page_url(page)?;
        let body = fetch(&url).with_context(|| format!("failed to fetch page {page}"))?;
        report.pages_fetched += 1;
        let courses = parse_listing(&body);
        info!(page, url = %url, found = courses.len(), "scraped listing page");
        if courses.is_empty() {
            report.stopped_on_empty_page = true;
            break;
        }
        report.courses.extend(courses);
    }
    Ok(report)
}

/// Blocking HTTP scraper for the course catalog.
pub struct CatalogScraper {
    client: Client,
    controls: ScrapeControls,
}

impl CatalogScraper {
    /// Builds a scraper with its own HTTP client.
    pub fn new(controls: ScrapeControls, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("failed to build catalog HTTP client")?;
        Ok(Self { client, controls })
    }

    /// Fetches the raw HTML for one listing page.
    pub fn fetch_page(&self, url: &Url) -> Result<String> {
        debug!(url = %url, "requesting listing page");
        let resp = self
            .client
            .get(url.clone())
            .send()
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("catalog returned an error for {url}"))?;
        resp.text()
            .with_context(|| format!("failed to read body from {url}"))
    }

    /// Scrapes every page allowed by the controls.
    pub fn scrape(&self) -> Result<ScrapeReport> {
        collect_pages(&self.controls, |url| self.fetch_page(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    const LISTING: &str = r#"
        <html><body>
          <ul class="products__list">
            <li class="products__list-item">
              <a class="course-card" href="/courses/intro-to-python">
                <h3> Intro to Python </h3>
                <span class="course-card__lesson-count">12 Lessons</span>
                <span class="stars__rating">4.8</span>
              </a>
            </li>
            <li class="products__list-item">
              <a class="course-card" href="/courses/advanced-sql">
                <h3>Advanced SQL</h3>
                <span class="course-card__lesson-count">8 Lessons</span>
              </a>
            </li>
            <li class="products__list-item">
              <div>
                <h3>Deep Learning Basics</h3>
              </div>
            </li>
          </ul>
          <li class="other-item"><h3>Not a course</h3></li>
        </body></html>
    "#;

    fn controls(max_pages: u32) -> ScrapeControls {
        ScrapeControls::new(
            "https://catalog.test/collections?page={page}",
            1,
            max_pages,
            Duration::ZERO,
        )
        .unwrap()
    }

    #[test]
    fn extracts_every_card_with_absent_fields() {
        let courses = parse_listing(LISTING);

        assert_eq!(courses.len(), 3);
        assert_eq!(
            courses[0],
            CourseRecord {
                title: Some("Intro to Python".into()),
                lessons: Some("12 Lessons".into()),
                rating: Some("4.8".into()),
                link: Some("/courses/intro-to-python".into()),
            }
        );
        assert_eq!(courses[1].title.as_deref(), Some("Advanced SQL"));
        assert_eq!(courses[1].rating, None);
        assert_eq!(
            courses[2],
            CourseRecord {
                title: Some("Deep Learning Basics".into()),
                lessons: None,
                rating: None,
                link: None,
            }
        );
    }

    #[test]
    fn page_without_cards_yields_nothing() {
        assert!(parse_listing("<html><body><p>No courses</p></body></html>").is_empty());
    }

    #[test]
    fn stops_at_first_empty_page() {
        let mut pages = HashMap::new();
        pages.insert(1, LISTING.to_string());
        pages.insert(2, LISTING.to_string());
        let mut requested = Vec::new();

        let report = collect_pages(&controls(9), |url| {
            let page: u32 = url
                .query_pairs()
                .find(|(k, _)| k == "page")
                .map(|(_, v)| v.parse().unwrap())
                .unwrap();
            requested.push(page);
            Ok(pages.get(&page).cloned().unwrap_or_default())
        })
        .unwrap();

        assert_eq!(requested, vec![1, 2, 3]);
        assert_eq!(report.pages_fetched, 3);
        assert!(report.stopped_on_empty_page);
        assert_eq!(report.courses.len(), 6);
    }

    #[test]
    fn never_exceeds_max_pages() {
        let mut calls = 0;
        let report = collect_pages(&controls(2), |_| {
            calls += 1;
            Ok(LISTING.to_string())
        })
        .unwrap();

        assert_eq!(calls, 2);
        assert!(!report.stopped_on_empty_page);
        assert_eq!(report.courses.len(), 6);
    }

    #[test]
    fn fetch_error_aborts_the_walk() {
        let err = collect_pages(&controls(3), |_| Err(anyhow::anyhow!("connection refused")))
            .expect_err("fetch failure");
        assert!(format!("{err:#}").contains("connection refused"));
    }
}
