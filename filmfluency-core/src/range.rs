use std::{fmt, time::Duration};

use crate::timecode::Timecode;

/// Clips shorter than this are stretched, a learner needs some context.
pub const MIN_CLIP_DURATION: Duration = Duration::from_secs(5);

/// The span of the movie cut for one dialogue, at whole-second precision.
///
/// `end - start >= MIN_CLIP_DURATION` for every value built by [`ClipRange::adjust`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRange {
    pub start: Timecode,
    pub end: Timecode,
}

impl ClipRange {
    /// Extend `end` to `start + MIN_CLIP_DURATION` when the cue is too short,
    /// then drop milliseconds.
    ///
    /// Inverted cues (`end < start`) count as too short and get the minimum.
    pub fn adjust(start: Timecode, end: Timecode) -> ClipRange {
        let start_d = start.as_duration();
        let end_d = end.as_duration();
        let end = match end_d.checked_sub(start_d) {
            Some(length) if length >= MIN_CLIP_DURATION => end,
            _ => {
                if end < start {
                    log::debug!("cue ends before it starts: {} --> {}", start, end);
                }
                Timecode::from_duration(start_d + MIN_CLIP_DURATION)
            }
        };

        // floor(end) >= floor(start + 5s) == floor(start) + 5s, so the
        // minimum survives dropping the millis
        ClipRange {
            start: start.truncate_millis(),
            end: end.truncate_millis(),
        }
    }

    pub fn duration(&self) -> Duration {
        self.end
            .as_duration()
            .saturating_sub(self.start.as_duration())
    }
}

impl fmt::Display for ClipRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} --> {}",
            self.start.whole_seconds(),
            self.end.whole_seconds()
        )
    }
}

/// Adjust a pair of timecode strings, rendering the result as `HH:MM:SS`.
///
/// If either side does not parse, both inputs are returned untouched.
pub fn adjust_times(start: &str, end: &str) -> (String, String) {
    match (Timecode::parse(start), Timecode::parse(end)) {
        (Ok(s), Ok(e)) => {
            let range = ClipRange::adjust(s, e);
            (
                range.start.whole_seconds().to_string(),
                range.end.whole_seconds().to_string(),
            )
        }
        (s, e) => {
            log::debug!(
                "leaving range unadjusted: {:?} {:?}",
                s.err(),
                e.err()
            );
            (start.to_owned(), end.to_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tc(s: &str) -> Timecode {
        Timecode::parse(s).unwrap()
    }

    #[test]
    fn short_cue_is_extended_from_start() {
        let r = ClipRange::adjust(tc("00:00:01,000"), tc("00:00:02,000"));
        assert_eq!(r.to_string(), "00:00:01 --> 00:00:06");
        assert_eq!(r.duration(), MIN_CLIP_DURATION);
    }

    #[test]
    fn long_cue_is_unchanged() {
        let r = ClipRange::adjust(tc("00:10:00,000"), tc("00:10:12,000"));
        assert_eq!(r.start, tc("00:10:00,000"));
        assert_eq!(r.end, tc("00:10:12,000"));
    }

    #[test]
    fn exactly_minimum_is_unchanged() {
        let r = ClipRange::adjust(tc("00:00:03,250"), tc("00:00:08,250"));
        assert_eq!(r.to_string(), "00:00:03 --> 00:00:08");
    }

    #[test]
    fn milliseconds_are_dropped() {
        let r = ClipRange::adjust(tc("00:00:01,999"), tc("00:00:07,000"));
        assert_eq!(r.to_string(), "00:00:01 --> 00:00:07");
    }

    #[test]
    fn minimum_survives_truncation() {
        let cases = [
            ("00:00:01,900", "00:00:02,000"),
            ("00:00:01,900", "00:00:06,950"),
            ("00:59:59,999", "01:00:00,001"),
            ("00:00:00,000", "00:00:00,000"),
            ("01:00:00,500", "01:00:05,499"),
        ];
        for (s, e) in cases {
            let r = ClipRange::adjust(tc(s), tc(e));
            assert!(r.duration() >= MIN_CLIP_DURATION, "{} {} -> {}", s, e, r);
        }
    }

    #[test]
    fn adjusting_twice_is_a_no_op() {
        let once = ClipRange::adjust(tc("00:00:01,400"), tc("00:00:03,100"));
        let twice = ClipRange::adjust(once.start, once.end);
        assert_eq!(once, twice);
    }

    #[test]
    fn inverted_cue_is_clamped() {
        let r = ClipRange::adjust(tc("00:00:10,000"), tc("00:00:04,000"));
        assert_eq!(r.to_string(), "00:00:10 --> 00:00:15");
    }

    #[test]
    fn string_adjust() {
        assert_eq!(
            adjust_times("00:00:01.000", "00:00:02.000"),
            ("00:00:01".to_owned(), "00:00:06".to_owned())
        );
        assert_eq!(
            adjust_times("00:00:01,000", "00:00:30,000"),
            ("00:00:01".to_owned(), "00:00:30".to_owned())
        );
    }

    #[test]
    fn string_adjust_falls_back_on_malformed() {
        assert_eq!(
            adjust_times("garbage", "00:00:02.000"),
            ("garbage".to_owned(), "00:00:02.000".to_owned())
        );
        assert_eq!(
            adjust_times("00:00:01.000", "00:99:00.000"),
            ("00:00:01.000".to_owned(), "00:99:00.000".to_owned())
        );
    }
}
