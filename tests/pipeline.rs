use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use coursefinder::dataset::write_courses;
use coursefinder::{
    answer_query, collect_pages, BuildOutcome, HashingEmbedder, LlmProvider, ProviderRequest,
    ScrapeControls, ScrapeReport, SearchError, SearchSession, SessionConfig,
};

const EXPECTED_CSV: &str = "\
title,lessons,rating,link
Intro to Python,34 Lessons,4.7,/courses/introduction-to-python
Advanced SQL,18 Lessons,,/courses/advanced-sql
Deep Learning Basics,22 Lessons,4.9,/courses/deep-learning-basics
";

struct CannedProvider {
    prompts: Mutex<Vec<String>>,
}

impl LlmProvider for CannedProvider {
    fn answer(&self, request: &ProviderRequest<'_>) -> anyhow::Result<String> {
        self.prompts.lock().unwrap().push(request.prompt.to_string());
        Ok("Intro to Python\nAdvanced SQL".to_string())
    }
}

fn scrape_fixtures() -> ScrapeReport {
    let controls = ScrapeControls::new(
        "https://catalog.test/collections?page={page}",
        1,
        9,
        Duration::ZERO,
    )
    .unwrap();
    collect_pages(&controls, |url| {
        let html = match url.query() {
            Some("page=1") => include_str!("fixtures/listing-page-1.html"),
            Some("page=2") => include_str!("fixtures/listing-page-2.html"),
            Some("page=3") => include_str!("fixtures/listing-empty.html"),
            other => return Err(anyhow!("unexpected page request {other:?}")),
        };
        Ok(html.to_string())
    })
    .unwrap()
}

#[test]
fn scrape_writes_expected_csv_and_reruns_identically() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("courses.csv");

    let report = scrape_fixtures();
    assert_eq!(report.pages_fetched, 3);
    assert!(report.stopped_on_empty_page);
    write_courses(&path, &report.courses).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), EXPECTED_CSV);

    write_courses(&path, &scrape_fixtures().courses).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), EXPECTED_CSV);
}

#[test]
fn scraped_courses_answer_a_python_query() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("courses.csv");
    write_courses(&path, &scrape_fixtures().courses).unwrap();

    let mut session = SearchSession::new(
        SessionConfig::new(&path),
        Arc::new(HashingEmbedder::default()),
    );
    assert_eq!(
        session.build_index().unwrap(),
        BuildOutcome::Built {
            documents: 3,
            chunks: 3
        }
    );
    assert_eq!(session.build_index().unwrap(), BuildOutcome::AlreadyBuilt);

    let llm = CannedProvider {
        prompts: Mutex::new(Vec::new()),
    };
    let result = answer_query(&session, &llm, "python programming").unwrap();

    assert_eq!(result.documents[0].document.title(), "Intro to Python");
    assert!(result.documents.len() <= 3);
    assert_eq!(result.answer, "Intro to Python\nAdvanced SQL");
    let prompts = llm.prompts.lock().unwrap();
    assert!(prompts[0].contains("Question:python programming"));
}

#[test]
fn csv_without_title_column_never_builds() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("courses.csv");
    std::fs::write(&path, "course,lessons\nIntro to Python,34 Lessons\n").unwrap();

    let mut session = SearchSession::new(
        SessionConfig::new(&path),
        Arc::new(HashingEmbedder::default()),
    );
    let err = session.build_index().unwrap_err();

    assert_eq!(err.to_string(), "CSV file must contain a 'title' column.");
    assert!(!session.is_ready());
    let llm = CannedProvider {
        prompts: Mutex::new(Vec::new()),
    };
    assert!(matches!(
        answer_query(&session, &llm, "python"),
        Err(SearchError::IndexNotReady)
    ));
}
