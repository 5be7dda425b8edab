//! # TMS Common Library
//!
//! Shared code for the transcription tools including:
//! - Adaptive debouncing of editor updates (typing / paste / idle delays)
//! - Highlight segmentation of transcript text
//! - Transcript block model and search/replace
//! - Configuration loading
//! - UTF-16 offset helpers (editor offsets are UTF-16 code units)

pub mod config;
pub mod debounce;
pub mod error;
pub mod highlight;
pub mod search;
pub mod transcript;
pub mod utf16;

pub use debounce::{DebounceMode, Debouncer, DelayProfile};
pub use error::{Error, Result};
pub use highlight::{segment, Highlight, Segment, SegmentKind};
pub use search::{SearchMatch, SearchOptions, SearchSession};
pub use transcript::{Block, Field, SourceSpan, Transcript};
