use std::{
    num::NonZeroU32,
    path::{Path, PathBuf},
};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::{decode, timecode::Timecode};

static TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d{2}:\d{2}:\d{2}[,.]\d{3})\s*-->\s*(\d{2}:\d{2}:\d{2}[,.]\d{3})\s*$")
        .unwrap()
});

#[derive(Debug, thiserror::Error)]
pub enum SubtitleError {
    #[error("could not read subtitle file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read subtitle file {0:?}: no candidate text encoding could decode it")]
    UnreadableFile(PathBuf),
}

/// One timed entry of a subtitle file.
///
/// `start <= end` is not checked, files in the wild get this wrong.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtitleCue {
    pub index: u32,
    pub start: Timecode,
    pub end: Timecode,
    /// All text lines of the block joined with single spaces.
    pub text: String,
}

/// Why a block was not turned into a cue. Only used for logging.
#[derive(Debug, PartialEq)]
enum BlockRejection {
    MissingIndex,
    BadIndex,
    MissingTiming,
    BadTiming,
    NoText,
}

/// Parse every well formed block of a SubRip document.
///
/// Blocks that don't look like `index / timing / text...` are skipped,
/// the rest are returned in the order they appear.
pub fn parse_cues(content: &str) -> Vec<SubtitleCue> {
    let normalized = normalize_newlines(content);
    let mut cues = Vec::new();
    for (block_number, block) in blocks(&normalized).enumerate() {
        match parse_block(&block) {
            Ok(cue) => cues.push(cue),
            Err(reason) => {
                log::debug!(
                    "skipping subtitle block #{} ({:?}): {:?}",
                    block_number,
                    reason,
                    block.first()
                );
            }
        }
    }
    cues
}

/// Read and decode a subtitle file.
pub fn read_subtitle_file<P: AsRef<Path>>(path: P) -> Result<String, SubtitleError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| SubtitleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let (text, encoding) = decode::decode_bytes(&bytes)
        .ok_or_else(|| SubtitleError::UnreadableFile(path.to_path_buf()))?;
    log::debug!("read {:?} as {}", path, encoding.name());
    Ok(text)
}

/// Read, decode and parse a subtitle file.
pub fn load_cues<P: AsRef<Path>>(path: P) -> Result<Vec<SubtitleCue>, SubtitleError> {
    let content = read_subtitle_file(path.as_ref())?;
    let cues = parse_cues(&content);
    log::info!("parsed {} subtitles from {:?}", cues.len(), path.as_ref());
    Ok(cues)
}

fn normalize_newlines(content: &str) -> String {
    content
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n")
}

/// Group lines into blocks, a whitespace-only line ends a block.
fn blocks(content: &str) -> impl Iterator<Item = Vec<&str>> {
    let mut all = Vec::new();
    let mut current = Vec::new();
    for line in content.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                all.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        all.push(current);
    }
    all.into_iter()
}

fn parse_block(lines: &[&str]) -> Result<SubtitleCue, BlockRejection> {
    let mut lines = lines.iter();

    let index = lines.next().ok_or(BlockRejection::MissingIndex)?.trim();
    // positive, digits only: `u32::from_str` would also take `+1`
    if !index.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BlockRejection::BadIndex);
    }
    let index = index
        .parse::<NonZeroU32>()
        .map_err(|_| BlockRejection::BadIndex)?
        .get();

    let timing = lines.next().ok_or(BlockRejection::MissingTiming)?;
    let caps = TIMING_REGEX
        .captures(timing)
        .ok_or(BlockRejection::BadTiming)?;
    let start = Timecode::parse(&caps[1]).map_err(|_| BlockRejection::BadTiming)?;
    let end = Timecode::parse(&caps[2]).map_err(|_| BlockRejection::BadTiming)?;

    let text = lines
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if text.is_empty() {
        return Err(BlockRejection::NoText);
    }

    Ok(SubtitleCue {
        index,
        start,
        end,
        text,
    })
}
