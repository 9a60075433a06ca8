//! CSV persistence for scraped courses.
//!
//! The file always carries the `title,lessons,rating,link` header; absent
//! fields are written as empty cells.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use tracing::{info, warn};

use crate::course::CourseRecord;
use crate::error::{Result, SearchError};

/// Column holding the course title.
pub const TITLE_COLUMN: &str = "title";

/// Column order used when writing course rows.
pub const COLUMNS: [&str; 4] = [TITLE_COLUMN, "lessons", "rating", "link"];

/// Writes `courses` to `path`, replacing any existing file.
pub fn write_courses<P: AsRef<Path>>(path: P, courses: &[CourseRecord]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_courses_to(file, courses)?;
    info!(path = %path.display(), rows = courses.len(), "wrote course csv");
    Ok(())
}

/// Writes `courses` as CSV into any writer.
pub fn write_courses_to<W: Write>(writer: W, courses: &[CourseRecord]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    // Header is written explicitly so an empty course list still yields it.
    writer.write_record(COLUMNS)?;
    for course in courses {
        writer.serialize(course)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads every non-empty title from the CSV at `path`.
pub fn load_titles<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let titles = load_titles_from(file)?;
    info!(path = %path.display(), titles = titles.len(), "loaded course titles");
    Ok(titles)
}

/// Reads every non-empty title from CSV data.
///
/// Fails with [`SearchError::MissingColumn`] when the header has no `title`.
pub fn load_titles_from<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers()?.clone();
    let column = headers
        .iter()
        .position(|name| name.trim() == TITLE_COLUMN)
        .ok_or_else(|| SearchError::MissingColumn {
            column: TITLE_COLUMN.to_string(),
        })?;

    let mut titles = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        match record.get(column).map(str::trim) {
            Some(title) if !title.is_empty() => titles.push(title.to_string()),
            _ => warn!(row = row + 1, "skipping course row without a title"),
        }
    }
    Ok(titles)
}
