//! Transcript block model
//!
//! A transcript is an ordered list of blocks, each a speaker label plus the
//! spoken text. On disk a transcript is one block per line:
//!
//! ```text
//! Dana: so where do we start
//! Avi: from the top
//! an unattributed line
//! ```
//!
//! The speaker is everything before the first `": "`, trimmed; a line
//! without one is text with an empty speaker. Blank lines are skipped.
//!
//! Parsed blocks remember where their fields sit in the source text
//! ([`SourceSpan`]), so edits can be written back into the original bytes
//! without touching blank lines, spacing or line endings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

const SPEAKER_SEPARATOR: &str = ": ";

/// Searchable field of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Speaker,
    Text,
}

impl Field {
    /// Fields in search order
    pub const ALL: [Field; 2] = [Field::Speaker, Field::Text];
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Speaker => f.write_str("speaker"),
            Field::Text => f.write_str("text"),
        }
    }
}

/// Byte ranges of a block's fields in the text it was parsed from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceSpan {
    pub speaker: Range<usize>,
    pub text: Range<usize>,
}

impl SourceSpan {
    pub fn field(&self, field: Field) -> &Range<usize> {
        match field {
            Field::Speaker => &self.speaker,
            Field::Text => &self.text,
        }
    }
}

/// One speaker turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub speaker: String,
    pub text: String,
    /// Set by [`Transcript::parse`]; `None` for blocks built in code
    #[serde(skip)]
    pub source: Option<SourceSpan>,
}

impl Block {
    pub fn new(id: impl Into<String>, speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            speaker: speaker.into(),
            text: text.into(),
            source: None,
        }
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Speaker => &self.speaker,
            Field::Text => &self.text,
        }
    }

    pub fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Speaker => &mut self.speaker,
            Field::Text => &mut self.text,
        }
    }
}

/// Ordered list of blocks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub blocks: Vec<Block>,
}

impl Transcript {
    /// Parse the line-per-block text format
    ///
    /// Block ids are assigned as `block-1`, `block-2`, … in order.
    pub fn parse(source: &str) -> Self {
        let mut blocks = Vec::new();
        let mut offset = 0;

        for raw in source.split_inclusive('\n') {
            let line_start = offset;
            offset += raw.len();

            let line = raw.trim_end_matches('\n').trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }

            let id = format!("block-{}", blocks.len() + 1);
            let line_end = line_start + line.len();

            let block = match line.split_once(SPEAKER_SEPARATOR) {
                Some((raw_speaker, text)) => {
                    let speaker = raw_speaker.trim();
                    let lead = raw_speaker.len() - raw_speaker.trim_start().len();
                    let speaker_start = line_start + lead;
                    let text_start = line_start + raw_speaker.len() + SPEAKER_SEPARATOR.len();
                    Block {
                        source: Some(SourceSpan {
                            speaker: speaker_start..speaker_start + speaker.len(),
                            text: text_start..line_end,
                        }),
                        ..Block::new(id, speaker, text)
                    }
                }
                None => Block {
                    source: Some(SourceSpan {
                        speaker: line_start..line_start,
                        text: line_start..line_end,
                    }),
                    ..Block::new(id, "", line)
                },
            };
            blocks.push(block);
        }

        Self { blocks }
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
