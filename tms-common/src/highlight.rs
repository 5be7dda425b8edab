//! Highlight segmentation for transcript text
//!
//! Splits a text into an ordered run of display segments, plain or
//! highlighted, that together cover the whole text exactly once. The
//! presentation layer maps each segment kind to its own style (normal text,
//! search hit, current search hit).
//!
//! # Offsets
//!
//! Span offsets are UTF-16 code units, matching what the editor reports.
//! Every [`Segment`] carries both the UTF-16 range and the equivalent UTF-8
//! byte range so it can be sliced out of the source `&str` directly.
//!
//! # Malformed spans
//!
//! Spans are validated up front and rejected with [`Error::InvalidSpan`]
//! rather than clamped:
//! - `start_index >= end_index`
//! - `end_index` past the end of the text
//! - a span starting before the previous (sorted) span ends
//! - a boundary that splits a surrogate pair

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::utf16::{utf16_len, utf16_to_byte};
use crate::{Error, Result};

/// A highlighted range of text, as reported by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    /// Start offset (UTF-16 units, inclusive)
    pub start_index: usize,
    /// End offset (UTF-16 units, exclusive)
    pub end_index: usize,
    /// Emphasis flag for the current search hit
    #[serde(default)]
    pub is_current: bool,
}

impl Highlight {
    pub fn new(start_index: usize, end_index: usize) -> Self {
        Self {
            start_index,
            end_index,
            is_current: false,
        }
    }

    /// Same span, marked as the current hit
    pub fn current(self) -> Self {
        Self {
            is_current: true,
            ..self
        }
    }
}

/// Presentation kind of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SegmentKind {
    Plain,
    #[serde(rename_all = "camelCase")]
    Highlighted { is_current: bool },
}

/// A contiguous slice of the text tagged with its presentation kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    /// Boundary in UTF-16 units
    pub range: Range<usize>,
    /// Same boundary in UTF-8 bytes
    #[serde(skip)]
    pub bytes: Range<usize>,
    #[serde(flatten)]
    pub kind: SegmentKind,
}

impl Segment {
    /// Slice this segment out of the text it was computed from
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.bytes.clone()]
    }

    pub fn is_highlighted(&self) -> bool {
        matches!(self.kind, SegmentKind::Highlighted { .. })
    }

    pub fn is_current(&self) -> bool {
        matches!(self.kind, SegmentKind::Highlighted { is_current: true })
    }
}

/// Partition `text` into plain and highlighted segments
///
/// Highlights may be given in any order; they are stable-sorted by start
/// offset, so spans with equal starts keep their input order. The result
/// covers `[0, utf16_len(text))` with no gaps and no overlaps. An empty
/// highlight list yields a single plain segment, or nothing for an empty
/// text.
///
/// # Errors
///
/// [`Error::InvalidSpan`] for any span that is empty, inverted, out of
/// range, overlapping its predecessor, or splitting a surrogate pair.
///
/// # Examples
///
/// ```
/// use tms_common::highlight::{segment, Highlight, SegmentKind};
///
/// let text = "hello world";
/// let segments = segment(text, &[Highlight::new(6, 11).current()]).unwrap();
///
/// assert_eq!(segments.len(), 2);
/// assert_eq!(segments[0].range, 0..6);
/// assert_eq!(segments[0].kind, SegmentKind::Plain);
/// assert_eq!(segments[1].text(text), "world");
/// assert!(segments[1].is_current());
/// ```
pub fn segment(text: &str, highlights: &[Highlight]) -> Result<Vec<Segment>> {
    let len = utf16_len(text);

    let mut sorted: Vec<&Highlight> = highlights.iter().collect();
    sorted.sort_by_key(|h| h.start_index);

    let mut segments = Vec::with_capacity(sorted.len() * 2 + 1);
    let mut cursor = 0;
    let mut cursor_byte = 0;

    for highlight in sorted {
        let Highlight {
            start_index: start,
            end_index: end,
            is_current,
        } = *highlight;

        if start >= end {
            return Err(invalid(start, end, "start must be before end"));
        }
        if end > len {
            return Err(invalid(start, end, "end is past the end of the text"));
        }
        if start < cursor {
            return Err(invalid(start, end, "overlaps the previous span"));
        }

        let start_byte = boundary(text, start, (start, end))?;
        let end_byte = boundary(text, end, (start, end))?;

        if start > cursor {
            segments.push(Segment {
                range: cursor..start,
                bytes: cursor_byte..start_byte,
                kind: SegmentKind::Plain,
            });
        }

        segments.push(Segment {
            range: start..end,
            bytes: start_byte..end_byte,
            kind: SegmentKind::Highlighted { is_current },
        });

        cursor = end;
        cursor_byte = end_byte;
    }

    if cursor < len {
        segments.push(Segment {
            range: cursor..len,
            bytes: cursor_byte..text.len(),
            kind: SegmentKind::Plain,
        });
    }

    Ok(segments)
}

fn boundary(text: &str, unit: usize, (start, end): (usize, usize)) -> Result<usize> {
    utf16_to_byte(text, unit).ok_or_else(|| invalid(start, end, "boundary splits a surrogate pair"))
}

fn invalid(start: usize, end: usize, reason: &'static str) -> Error {
    Error::InvalidSpan { start, end, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(range: Range<usize>) -> (Range<usize>, SegmentKind) {
        (range, SegmentKind::Plain)
    }

    fn hit(range: Range<usize>, is_current: bool) -> (Range<usize>, SegmentKind) {
        (range, SegmentKind::Highlighted { is_current })
    }

    fn shape(segments: &[Segment]) -> Vec<(Range<usize>, SegmentKind)> {
        segments.iter().map(|s| (s.range.clone(), s.kind)).collect()
    }

    #[test]
    fn test_highlight_at_end_has_no_trailing_plain() {
        let segments = segment("hello world", &[Highlight::new(6, 11).current()]).unwrap();
        assert_eq!(shape(&segments), vec![plain(0..6), hit(6..11, true)]);
    }

    #[test]
    fn test_empty_highlights_single_plain_segment() {
        let segments = segment("abc", &[]).unwrap();
        assert_eq!(shape(&segments), vec![plain(0..3)]);
    }

    #[test]
    fn test_empty_text_no_segments() {
        assert!(segment("", &[]).unwrap().is_empty());
    }

    #[test]
    fn test_highlight_at_start_has_no_leading_plain() {
        let segments = segment("hello world", &[Highlight::new(0, 5)]).unwrap();
        assert_eq!(shape(&segments), vec![hit(0..5, false), plain(5..11)]);
    }

    #[test]
    fn test_adjacent_highlights_have_no_plain_between() {
        let segments =
            segment("abcdef", &[Highlight::new(1, 3), Highlight::new(3, 5)]).unwrap();
        assert_eq!(
            shape(&segments),
            vec![plain(0..1), hit(1..3, false), hit(3..5, false), plain(5..6)]
        );
    }

    #[test]
    fn test_unsorted_input_matches_sorted_input() {
        let text = "the cat sat on the mat";
        let sorted = [
            Highlight::new(4, 7),
            Highlight::new(8, 11).current(),
            Highlight::new(19, 22),
        ];
        let unsorted = [sorted[2], sorted[0], sorted[1]];

        assert_eq!(
            segment(text, &sorted).unwrap(),
            segment(text, &unsorted).unwrap()
        );
    }

    #[test]
    fn test_segments_cover_text_exactly() {
        let text = "one two three four five";
        let highlights = [
            Highlight::new(14, 18),
            Highlight::new(0, 3),
            Highlight::new(8, 13).current(),
        ];
        let segments = segment(text, &highlights).unwrap();

        let mut cursor = 0;
        for s in &segments {
            assert_eq!(s.range.start, cursor, "gap or overlap at {}", cursor);
            assert!(s.range.end > s.range.start);
            cursor = s.range.end;
        }
        assert_eq!(cursor, text.len());

        let rebuilt: String = segments.iter().map(|s| s.text(text)).collect();
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_utf16_offsets_slice_correctly() {
        // "😀" is two UTF-16 units, so "big" starts at unit 3
        let text = "😀 big day";
        let segments = segment(text, &[Highlight::new(3, 6)]).unwrap();

        assert_eq!(segments[1].range, 3..6);
        assert_eq!(segments[1].text(text), "big");
        assert_eq!(segments[2].text(text), " day");
    }

    #[test]
    fn test_rejects_empty_span() {
        let err = segment("abc", &[Highlight::new(1, 1)]).unwrap_err();
        assert!(matches!(err, Error::InvalidSpan { start: 1, end: 1, .. }));
    }

    #[test]
    fn test_rejects_inverted_span() {
        let err = segment("abc", &[Highlight::new(2, 1)]).unwrap_err();
        assert!(matches!(err, Error::InvalidSpan { start: 2, end: 1, .. }));
    }

    #[test]
    fn test_rejects_out_of_range_end() {
        let err = segment("abc", &[Highlight::new(1, 4)]).unwrap_err();
        assert!(matches!(err, Error::InvalidSpan { start: 1, end: 4, .. }));
    }

    #[test]
    fn test_rejects_overlap() {
        let err = segment("abcdef", &[Highlight::new(3, 5), Highlight::new(1, 4)]).unwrap_err();
        assert!(matches!(err, Error::InvalidSpan { start: 3, end: 5, .. }));
    }

    #[test]
    fn test_rejects_surrogate_split() {
        let err = segment("a😀b", &[Highlight::new(2, 4)]).unwrap_err();
        assert!(matches!(err, Error::InvalidSpan { start: 2, end: 4, .. }));
    }

    #[test]
    fn test_highlight_deserializes_from_editor_shape() {
        let h: Highlight =
            serde_json::from_str(r#"{"startIndex":6,"endIndex":11,"isCurrent":true}"#).unwrap();
        assert_eq!(h, Highlight::new(6, 11).current());

        let h: Highlight = serde_json::from_str(r#"{"startIndex":0,"endIndex":2}"#).unwrap();
        assert!(!h.is_current);
    }

    #[test]
    fn test_segment_serializes_kind_and_range() {
        let segments = segment("hello world", &[Highlight::new(6, 11).current()]).unwrap();
        let json = serde_json::to_value(&segments).unwrap();

        assert_eq!(json[0]["kind"], "plain");
        assert_eq!(json[0]["range"]["start"], 0);
        assert_eq!(json[1]["kind"], "highlighted");
        assert_eq!(json[1]["isCurrent"], true);
        assert_eq!(json[1]["range"]["end"], 11);
    }
}
