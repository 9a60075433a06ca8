//! Single-page HTML rendering for the search UI, plus the view builders the
//! HTTP handlers call.

use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::warn;

use crate::llm::LlmProvider;
use crate::query::{answer_query, QueryResult};
use crate::session::{BuildOutcome, SearchSession};

/// Page heading.
pub const PAGE_TITLE: &str = "Smart Course Search System";

/// Severity of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Neutral status.
    Info,
    /// Something failed.
    Error,
}

/// Status line shown above the results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub kind: NoticeKind,
    /// Message text (unescaped).
    pub message: String,
}

impl Notice {
    /// Informational notice.
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    /// Error notice.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    /// Describes a build outcome.
    pub fn for_build(outcome: BuildOutcome) -> Self {
        match outcome {
            BuildOutcome::Built { documents, chunks } => Self::info(format!(
                "Vector index ready: {documents} courses embedded as {chunks} chunks."
            )),
            BuildOutcome::AlreadyBuilt => Self::info("Vector index already built."),
        }
    }
}

/// Everything needed to render the page.
#[derive(Debug, Clone, Default)]
pub struct PageView {
    /// Query echoed back into the input.
    pub query: String,
    /// Whether the index is built.
    pub index_ready: bool,
    /// Optional status line.
    pub notice: Option<Notice>,
    /// Answer to the submitted query.
    pub result: Option<QueryResult>,
}

/// Page shown on first load.
pub fn home_view(session: &SearchSession) -> PageView {
    PageView {
        index_ready: session.is_ready(),
        ..PageView::default()
    }
}

/// Builds the index and reports the outcome; failures become error notices.
pub fn build_view(session: &mut SearchSession) -> PageView {
    let notice = match session.build_index() {
        Ok(outcome) => Notice::for_build(outcome),
        Err(err) => {
            warn!(error = %err, "index build failed");
            Notice::error(err.to_string())
        }
    };
    PageView {
        index_ready: session.is_ready(),
        notice: Some(notice),
        ..PageView::default()
    }
}

/// Answers `query` for display. A blank query renders the bare page without
/// calling `llm`.
pub fn search_view(session: &SearchSession, llm: &dyn LlmProvider, query: &str) -> PageView {
    let mut view = PageView {
        query: query.to_string(),
        index_ready: session.is_ready(),
        ..PageView::default()
    };
    if query.trim().is_empty() {
        return view;
    }
    match answer_query(session, llm, query) {
        Ok(result) => view.result = Some(result),
        Err(err) => {
            warn!(error = %err, "query failed");
            view.notice = Some(Notice::error(err.to_string()));
        }
    }
    view
}

/// Renders the full HTML document.
pub fn render_page(view: &PageView) -> String {
    let mut html = String::with_capacity(2048);
    html.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{PAGE_TITLE}</title>\n"));
    html.push_str(STYLE);
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("<h1>{PAGE_TITLE}</h1>\n"));

    html.push_str("<form method=\"post\" action=\"/search\">\n");
    html.push_str("<label for=\"query\">Enter your query to search for courses:</label>\n");
    html.push_str(&format!(
        "<input id=\"query\" name=\"query\" type=\"text\" value=\"{}\" autofocus>\n",
        encode_double_quoted_attribute(&view.query)
    ));
    html.push_str("<button type=\"submit\">Search</button>\n</form>\n");

    html.push_str("<form method=\"post\" action=\"/build\">\n");
    html.push_str("<button type=\"submit\">|Click Here|</button>\n");
    let status = if view.index_ready {
        "index ready"
    } else {
        "index not built"
    };
    html.push_str(&format!("<span class=\"status\">{status}</span>\n</form>\n"));

    if let Some(notice) = &view.notice {
        let class = match notice.kind {
            NoticeKind::Info => "notice",
            NoticeKind::Error => "notice error",
        };
        html.push_str(&format!(
            "<p class=\"{class}\">{}</p>\n",
            encode_text(&notice.message)
        ));
    }

    if let Some(result) = &view.result {
        html.push_str(&format!(
            "<p class=\"timing\">Response time: {:.3} seconds</p>\n",
            result.elapsed.as_secs_f64()
        ));
        html.push_str("<h2>Response:</h2>\n");
        html.push_str(&format!(
            "<pre class=\"answer\">{}</pre>\n",
            encode_text(&result.answer)
        ));
        html.push_str("<details open>\n<summary>Relevant Courses</summary>\n<ul>\n");
        for scored in &result.documents {
            html.push_str(&format!(
                "<li><strong>{}</strong> <span class=\"score\">{:.3}</span></li>\n",
                encode_text(scored.document.title()),
                scored.score
            ));
        }
        html.push_str("</ul>\n</details>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}

const STYLE: &str = "<style>\
body{font-family:sans-serif;max-width:48rem;margin:2rem auto;padding:0 1rem}\
form{margin:.5rem 0}input[type=text]{width:70%}\
.status,.score{margin-left:.5rem;color:#666}.notice.error{color:#b00}\
pre.answer{white-space:pre-wrap;background:#f6f6f6;padding:.75rem}\
</style>\n";
