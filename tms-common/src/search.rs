//! Transcript search and replace
//!
//! Finds every occurrence of a query across the speaker and text fields of a
//! transcript's blocks. Matches are reported in UTF-16 offsets so they can be
//! fed straight into [`crate::highlight::segment`].
//!
//! Match order is block order, speaker before text within a block, left to
//! right within a field. A [`SearchSession`] keeps a "current" match that
//! wraps around in both directions.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Range;
use tracing::debug;

use crate::highlight::Highlight;
use crate::transcript::{Block, Field, Transcript};
use crate::utf16::{utf16_len, utf16_to_byte};
use crate::{Error, Result};

/// Query interpretation flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    #[serde(alias = "caseSensitive")]
    pub case_sensitive: bool,
    /// Only match whole words (literal queries only)
    #[serde(alias = "wholeWord")]
    pub whole_word: bool,
    /// Treat the query as a regular expression
    #[serde(alias = "useRegex")]
    pub use_regex: bool,
}

/// One occurrence of the query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMatch {
    pub block_id: String,
    pub field: Field,
    /// UTF-16 offset, inclusive
    pub start_index: usize,
    /// UTF-16 offset, exclusive
    pub end_index: usize,
    pub match_text: String,
}

impl SearchMatch {
    pub fn highlight(&self, is_current: bool) -> Highlight {
        Highlight {
            start_index: self.start_index,
            end_index: self.end_index,
            is_current,
        }
    }
}

/// Compile a query into a pattern
///
/// Literal queries are escaped; `whole_word` wraps them in word boundaries.
/// A regex query is used as-is.
///
/// # Errors
/// [`Error::InvalidInput`] if the resulting pattern does not compile.
pub fn build_pattern(query: &str, options: &SearchOptions) -> Result<Regex> {
    let pattern = if options.use_regex {
        query.to_string()
    } else if options.whole_word {
        format!(r"\b{}\b", regex::escape(query))
    } else {
        regex::escape(query)
    };

    RegexBuilder::new(&pattern)
        .case_insensitive(!options.case_sensitive)
        .build()
        .map_err(|e| Error::InvalidInput(format!("Invalid search pattern '{}': {}", query, e)))
}

/// Non-empty matches of `pattern` in `text` as (UTF-16 range, byte range)
fn find_in_text(pattern: &Regex, text: &str) -> Vec<(Range<usize>, Range<usize>)> {
    let mut hits = Vec::new();
    let mut last_byte = 0;
    let mut last_unit = 0;

    for m in pattern.find_iter(text) {
        // Zero-width matches (`x*`, `^`) cannot be highlighted
        if m.is_empty() {
            continue;
        }
        let start = last_unit + utf16_len(&text[last_byte..m.start()]);
        let end = start + utf16_len(m.as_str());
        hits.push((start..end, m.range()));
        last_byte = m.end();
        last_unit = end;
    }

    hits
}

/// Matches paired with the index of the block they came from
fn collect_matches(
    blocks: &[Block],
    query: &str,
    options: &SearchOptions,
) -> Result<Vec<(usize, SearchMatch)>> {
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let pattern = build_pattern(query, options)?;
    let mut results = Vec::new();

    for (index, block) in blocks.iter().enumerate() {
        for field in Field::ALL {
            let text = block.field(field);
            for (units, bytes) in find_in_text(&pattern, text) {
                results.push((
                    index,
                    SearchMatch {
                        block_id: block.id.clone(),
                        field,
                        start_index: units.start,
                        end_index: units.end,
                        match_text: text[bytes].to_string(),
                    },
                ));
            }
        }
    }

    debug!(
        "Search '{}' ({:?}) found {} matches in {} blocks",
        query,
        options,
        results.len(),
        blocks.len()
    );

    Ok(results)
}

/// Find every occurrence of `query` in `blocks`
///
/// An empty query matches nothing.
pub fn find_matches(
    blocks: &[Block],
    query: &str,
    options: &SearchOptions,
) -> Result<Vec<SearchMatch>> {
    Ok(collect_matches(blocks, query, options)?
        .into_iter()
        .map(|(_, m)| m)
        .collect())
}

fn splice(text: &mut String, m: &SearchMatch, replacement: &str) -> Result<()> {
    let invalid = || Error::InvalidSpan {
        start: m.start_index,
        end: m.end_index,
        reason: "match no longer fits the text",
    };
    let start = utf16_to_byte(text, m.start_index).ok_or_else(invalid)?;
    let end = utf16_to_byte(text, m.end_index).ok_or_else(invalid)?;
    text.replace_range(start..end, replacement);
    Ok(())
}

/// Replace the first occurrence of `query` with the literal `replacement`
///
/// Returns whether anything was replaced.
pub fn replace_first(
    blocks: &mut [Block],
    query: &str,
    replacement: &str,
    options: &SearchOptions,
) -> Result<bool> {
    let matches = collect_matches(blocks, query, options)?;
    let Some((index, first)) = matches.first() else {
        return Ok(false);
    };

    splice(blocks[*index].field_mut(first.field), first, replacement)?;
    debug!("Replaced match in {} {}", first.block_id, first.field);
    Ok(true)
}

/// Replace every occurrence of `query` with the literal `replacement`
///
/// Each field is rewritten from its last match backwards so earlier offsets
/// stay valid. Returns the number of replacements.
pub fn replace_all(
    blocks: &mut [Block],
    query: &str,
    replacement: &str,
    options: &SearchOptions,
) -> Result<usize> {
    let matches = collect_matches(blocks, query, options)?;

    for (index, m) in matches.iter().rev() {
        splice(blocks[*index].field_mut(m.field), m, replacement)?;
    }

    debug!("Replaced {} matches of '{}'", matches.len(), query);
    Ok(matches.len())
}

/// Replace matches directly in transcript source text
///
/// `source` is parsed with [`Transcript::parse`] and the chosen matches (the
/// first, or all when `all` is set) are spliced into `source` at their
/// original byte offsets. Everything outside the replaced matches is left
/// byte-for-byte as it was. Returns the new text and the replacement count.
pub fn replace_in_source(
    source: &str,
    query: &str,
    replacement: &str,
    options: &SearchOptions,
    all: bool,
) -> Result<(String, usize)> {
    let transcript = Transcript::parse(source);
    let mut matches = collect_matches(&transcript.blocks, query, options)?;
    if !all {
        matches.truncate(1);
    }

    let mut edits = Vec::with_capacity(matches.len());
    for (index, m) in &matches {
        let block = &transcript.blocks[*index];
        let span = block.source.as_ref().ok_or_else(|| {
            Error::InvalidInput(format!("{} has no source position", block.id))
        })?;
        let text = block.field(m.field);
        let invalid = || Error::InvalidSpan {
            start: m.start_index,
            end: m.end_index,
            reason: "match does not fit its field",
        };
        let base = span.field(m.field).start;
        let start = utf16_to_byte(text, m.start_index).ok_or_else(invalid)?;
        let end = utf16_to_byte(text, m.end_index).ok_or_else(invalid)?;
        edits.push(base + start..base + end);
    }

    // Back to front so earlier offsets stay valid
    let mut out = source.to_string();
    for range in edits.iter().rev() {
        out.replace_range(range.clone(), replacement);
    }

    debug!("Replaced {} of '{}' in source text", edits.len(), query);
    Ok((out, edits.len()))
}

/// Search results with a navigable current match
#[derive(Debug, Clone, Default)]
pub struct SearchSession {
    matches: Vec<SearchMatch>,
    /// Match indices grouped by (block id, field), in match order
    by_field: HashMap<(String, Field), Vec<usize>>,
    current: usize,
}

impl SearchSession {
    pub fn new(matches: Vec<SearchMatch>) -> Self {
        let mut by_field: HashMap<(String, Field), Vec<usize>> = HashMap::new();
        for (i, m) in matches.iter().enumerate() {
            by_field
                .entry((m.block_id.clone(), m.field))
                .or_default()
                .push(i);
        }

        Self {
            matches,
            by_field,
            current: 0,
        }
    }

    /// Run a search; the first match becomes current
    pub fn search(blocks: &[Block], query: &str, options: &SearchOptions) -> Result<Self> {
        Ok(Self::new(find_matches(blocks, query, options)?))
    }

    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        (!self.matches.is_empty()).then_some(self.current)
    }

    pub fn current(&self) -> Option<&SearchMatch> {
        self.matches.get(self.current)
    }

    /// Make match `index` current, wrapping past the end
    pub fn select(&mut self, index: usize) -> Option<&SearchMatch> {
        if self.matches.is_empty() {
            return None;
        }
        self.current = index % self.matches.len();
        self.current()
    }

    /// Advance to the next match, wrapping to the first
    pub fn next(&mut self) -> Option<&SearchMatch> {
        self.select(self.current + 1)
    }

    /// Step back to the previous match, wrapping to the last
    pub fn previous(&mut self) -> Option<&SearchMatch> {
        if self.matches.is_empty() {
            return None;
        }
        let index = self
            .current
            .checked_sub(1)
            .unwrap_or(self.matches.len() - 1);
        self.select(index)
    }

    /// Highlight spans for one field of one block
    pub fn highlights_for(&self, block_id: &str, field: Field) -> Vec<Highlight> {
        self.by_field
            .get(&(block_id.to_string(), field))
            .map(|indices| {
                indices
                    .iter()
                    .map(|&i| self.matches[i].highlight(i == self.current))
                    .collect()
            })
            .unwrap_or_default()
    }
}
