//! Rendering of highlighted transcripts
//!
//! Text output prints one line per block (`speaker: text`) with search hits
//! styled by ANSI escapes, or with bracket markers when color is off:
//! `[hit]` for a match and `{hit}` for the current match. JSON output carries
//! the segment ranges (UTF-16) alongside each segment's text.

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use std::fmt::Write;
use tms_common::highlight::{segment, Segment, SegmentKind};
use tms_common::{Field, SearchSession, Transcript};

use crate::FindRequest;

const HIT_STYLE: &str = "\x1b[30;43m";
const CURRENT_STYLE: &str = "\x1b[30;42;1m";
const RESET: &str = "\x1b[0m";

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Segments for both fields of one block
#[derive(Debug, Clone)]
pub struct BlockSegments {
    pub id: String,
    pub speaker: Vec<Segment>,
    pub text: Vec<Segment>,
}

/// Search results laid over a transcript
#[derive(Debug)]
pub struct HighlightedTranscript {
    pub session: SearchSession,
    pub blocks: Vec<BlockSegments>,
}

/// Search `transcript` and segment every block field
pub fn highlight_transcript(
    transcript: &Transcript,
    request: &FindRequest,
) -> tms_common::Result<HighlightedTranscript> {
    let mut session =
        SearchSession::search(&transcript.blocks, &request.query, &request.options)?;
    session.select(request.current);

    let blocks = transcript
        .blocks
        .iter()
        .map(|block| {
            Ok(BlockSegments {
                id: block.id.clone(),
                speaker: segment(
                    &block.speaker,
                    &session.highlights_for(&block.id, Field::Speaker),
                )?,
                text: segment(&block.text, &session.highlights_for(&block.id, Field::Text))?,
            })
        })
        .collect::<tms_common::Result<Vec<_>>>()?;

    Ok(HighlightedTranscript { session, blocks })
}

/// Search and render in one step
pub fn render(
    transcript: &Transcript,
    request: &FindRequest,
    format: OutputFormat,
    color: bool,
) -> Result<String> {
    let highlighted = highlight_transcript(transcript, request)?;
    match format {
        OutputFormat::Text => Ok(render_text(transcript, request, &highlighted, color)),
        OutputFormat::Json => render_json(transcript, request, &highlighted),
    }
}

fn paint(out: &mut String, source: &str, segments: &[Segment], color: bool) {
    for s in segments {
        let text = s.text(source);
        match (s.kind, color) {
            (SegmentKind::Plain, _) => out.push_str(text),
            (SegmentKind::Highlighted { is_current: false }, true) => {
                let _ = write!(out, "{}{}{}", HIT_STYLE, text, RESET);
            }
            (SegmentKind::Highlighted { is_current: true }, true) => {
                let _ = write!(out, "{}{}{}", CURRENT_STYLE, text, RESET);
            }
            (SegmentKind::Highlighted { is_current: false }, false) => {
                let _ = write!(out, "[{}]", text);
            }
            (SegmentKind::Highlighted { is_current: true }, false) => {
                let _ = write!(out, "{{{}}}", text);
            }
        }
    }
}

/// Terminal rendering: one line per block plus a summary line
pub fn render_text(
    transcript: &Transcript,
    request: &FindRequest,
    highlighted: &HighlightedTranscript,
    color: bool,
) -> String {
    let mut out = String::new();

    for (block, segments) in transcript.blocks.iter().zip(&highlighted.blocks) {
        if !block.speaker.is_empty() {
            paint(&mut out, &block.speaker, &segments.speaker, color);
            out.push_str(": ");
        }
        paint(&mut out, &block.text, &segments.text, color);
        out.push('\n');
    }

    let session = &highlighted.session;
    match session.current_index() {
        None => {
            let _ = writeln!(out, "-- no matches for '{}' --", request.query);
        }
        Some(current) => {
            let _ = writeln!(
                out,
                "-- {} match{} for '{}', current {} of {} --",
                session.len(),
                if session.len() == 1 { "" } else { "es" },
                request.query,
                current + 1,
                session.len()
            );
        }
    }

    out
}

#[derive(Serialize)]
struct JsonSegment<'a> {
    #[serde(flatten)]
    segment: &'a Segment,
    text: &'a str,
}

#[derive(Serialize)]
struct JsonBlock<'a> {
    id: &'a str,
    speaker: Vec<JsonSegment<'a>>,
    text: Vec<JsonSegment<'a>>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    query: &'a str,
    matches: usize,
    current: Option<usize>,
    blocks: Vec<JsonBlock<'a>>,
}

fn json_segments<'a>(source: &'a str, segments: &'a [Segment]) -> Vec<JsonSegment<'a>> {
    segments
        .iter()
        .map(|segment| JsonSegment {
            segment,
            text: segment.text(source),
        })
        .collect()
}

/// JSON rendering (pretty-printed)
pub fn render_json(
    transcript: &Transcript,
    request: &FindRequest,
    highlighted: &HighlightedTranscript,
) -> Result<String> {
    let report = JsonReport {
        query: &request.query,
        matches: highlighted.session.len(),
        current: highlighted.session.current_index(),
        blocks: transcript
            .blocks
            .iter()
            .zip(&highlighted.blocks)
            .map(|(block, segments)| JsonBlock {
                id: &block.id,
                speaker: json_segments(&block.speaker, &segments.speaker),
                text: json_segments(&block.text, &segments.text),
            })
            .collect(),
    };

    Ok(serde_json::to_string_pretty(&report)?)
}
