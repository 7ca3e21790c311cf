//! Subtitle parsing and dialogue selection.
//!
//! Everything in this crate is pure and synchronous: decode bytes, parse
//! SubRip blocks, score and filter cues, and stretch the surviving time
//! ranges to something worth cutting. Media work lives in the `app` crate.

pub mod complexity;
pub mod decode;
pub mod filter;
pub mod range;
pub mod subtitle;
pub mod timecode;

pub use complexity::{ComplexityScorer, FleschReadingEase};
pub use filter::{filter_dialogues, DialogueFilter, ScoredDialogue};
pub use range::{adjust_times, ClipRange, MIN_CLIP_DURATION};
pub use subtitle::{load_cues, parse_cues, SubtitleCue, SubtitleError};
pub use timecode::{Timecode, TimecodeError};
