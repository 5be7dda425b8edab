//! tms-find library - transcript search front end
//!
//! Searches a transcript, lays the matches over each block as highlight
//! segments and renders the result for a terminal or as JSON. Matches can be
//! replaced in place, and follow mode re-renders a file as it is edited,
//! debounced by edit size.

pub mod follow;
pub mod render;
pub mod replace;

use tms_common::SearchOptions;

/// What to look for and which match is current
#[derive(Debug, Clone, Default)]
pub struct FindRequest {
    pub query: String,
    pub options: SearchOptions,
    /// 0-based index of the current match (wraps past the last match)
    pub current: usize,
}

impl FindRequest {
    pub fn new(query: impl Into<String>, options: SearchOptions) -> Self {
        Self {
            query: query.into(),
            options,
            current: 0,
        }
    }
}
