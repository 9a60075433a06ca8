//! Scraped course listing rows.

use serde::{Deserialize, Serialize};

/// One catalog entry as extracted from a listing page.
///
/// Every field is optional: a missing sub-element in the markup leaves the
/// field absent rather than failing the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRecord {
    /// Course title (text of the card heading).
    pub title: Option<String>,
    /// Lesson count label, e.g. `"12 Lessons"`.
    pub lessons: Option<String>,
    /// Star rating label.
    pub rating: Option<String>,
    /// Link to the course page, as found in the card anchor.
    pub link: Option<String>,
}
