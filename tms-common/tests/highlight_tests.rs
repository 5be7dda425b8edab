//! Coverage tests for highlight segmentation
//!
//! Generates mixed-script texts (ASCII, Hebrew, astral emoji) with random
//! non-overlapping spans and checks that segmentation:
//! - covers [0, N) contiguously with no overlaps
//! - reproduces the text when the segments are concatenated
//! - emits exactly the requested spans as highlighted segments
//! - does not depend on input order

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tms_common::highlight::{segment, Highlight, SegmentKind};
use tms_common::utf16::utf16_len;

const ALPHABET: [char; 8] = ['a', 'b', ' ', 'ש', 'ל', 'ו', '😀', '🎧'];

/// Test helper: random text plus the UTF-16 offset of every char boundary
fn random_text(rng: &mut StdRng) -> (String, Vec<usize>) {
    let len = rng.gen_range(0..40);
    let mut text = String::new();
    let mut boundaries = vec![0];
    let mut units = 0;

    for _ in 0..len {
        let ch = ALPHABET[rng.gen_range(0..ALPHABET.len())];
        text.push(ch);
        units += ch.len_utf16();
        boundaries.push(units);
    }

    (text, boundaries)
}

/// Test helper: sorted non-overlapping spans on char boundaries
fn random_spans(rng: &mut StdRng, boundaries: &[usize]) -> Vec<Highlight> {
    let mut spans = Vec::new();
    let mut i = 0;

    while i + 1 < boundaries.len() {
        i += rng.gen_range(0..4);
        if i + 1 >= boundaries.len() {
            break;
        }
        let end = (i + rng.gen_range(1..4)).min(boundaries.len() - 1);
        spans.push(Highlight {
            start_index: boundaries[i],
            end_index: boundaries[end],
            is_current: rng.gen_bool(0.2),
        });
        i = end;
    }

    spans
}

#[test]
fn test_random_segmentations_cover_text() {
    let mut rng = StdRng::seed_from_u64(0x7e57);

    for _ in 0..500 {
        let (text, boundaries) = random_text(&mut rng);
        let spans = random_spans(&mut rng, &boundaries);

        let mut shuffled = spans.clone();
        shuffled.shuffle(&mut rng);

        let segments = segment(&text, &shuffled).unwrap();

        // Contiguous, non-overlapping, exactly [0, N)
        let mut cursor = 0;
        for s in &segments {
            assert_eq!(s.range.start, cursor, "text={:?} spans={:?}", text, spans);
            assert!(s.range.end > s.range.start);
            cursor = s.range.end;
        }
        assert_eq!(cursor, utf16_len(&text));

        // Byte ranges slice the same text back
        let rebuilt: String = segments.iter().map(|s| s.text(&text)).collect();
        assert_eq!(rebuilt, text);

        // Highlighted segments are exactly the input spans, in start order
        let highlighted: Vec<Highlight> = segments
            .iter()
            .filter_map(|s| match s.kind {
                SegmentKind::Highlighted { is_current } => Some(Highlight {
                    start_index: s.range.start,
                    end_index: s.range.end,
                    is_current,
                }),
                SegmentKind::Plain => None,
            })
            .collect();
        assert_eq!(highlighted, spans);

        // No two plain segments in a row
        for pair in segments.windows(2) {
            assert!(pair[0].is_highlighted() || pair[1].is_highlighted());
        }

        // Order independence
        assert_eq!(segments, segment(&text, &spans).unwrap());
    }
}

#[test]
fn test_segmentation_is_deterministic() {
    let text = "Dana: שלום 😀 world";
    let spans = [Highlight::new(6, 10), Highlight::new(14, 19).current()];

    let first = segment(text, &spans).unwrap();
    for _ in 0..10 {
        assert_eq!(segment(text, &spans).unwrap(), first);
    }
}
