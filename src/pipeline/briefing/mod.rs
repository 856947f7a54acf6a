//! Meeting brief generation: model path with an offline fallback that
//! always produces a brief.

pub mod generator;
pub mod offline;
pub mod parse;
pub mod prompt;

pub use generator::*;
pub use offline::*;
pub use parse::*;
pub use prompt::*;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MEETING_TYPE: &str = "Annual Review";

/// What the brief is being prepared for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingContext {
    pub meeting_type: String,
    pub date: NaiveDate,
}

impl MeetingContext {
    pub fn new(meeting_type: Option<&str>, date: NaiveDate) -> Self {
        let meeting_type = meeting_type
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_MEETING_TYPE);
        Self {
            meeting_type: meeting_type.to_string(),
            date,
        }
    }

    /// `D Mon YYYY`, e.g. `7 Mar 2025`.
    pub fn display_date(&self) -> String {
        self.date.format("%-d %b %Y").to_string()
    }
}
