use anyhow::{Context, Result};
use clap::Parser;
use coursefinder::dataset::write_courses;
use coursefinder::{logging, CatalogScraper, ScrapeCli};
use tracing::info;

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    logging::init();
    let cli = ScrapeCli::parse();
    let controls = cli.build_controls()?;
    let scraper = CatalogScraper::new(controls, cli.timeout())?;

    let report = scraper.scrape()?;
    write_courses(&cli.output, &report.courses)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;

    info!(
        pages = report.pages_fetched,
        courses = report.courses.len(),
        stopped_on_empty_page = report.stopped_on_empty_page,
        "scrape complete"
    );
    println!(
        "Data scraped and saved to '{}' ({} courses from {} pages)",
        cli.output.display(),
        report.courses.len(),
        report.pages_fetched
    );
    Ok(())
}
