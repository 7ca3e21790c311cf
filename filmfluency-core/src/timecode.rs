use std::{fmt, str::FromStr, time::Duration};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};

static TIMECODE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2}):(\d{2}):(\d{2})[,.](\d{3})$").unwrap());

const MILLIS_PER_SECOND: u64 = 1_000;
const MILLIS_PER_MINUTE: u64 = 60 * MILLIS_PER_SECOND;
const MILLIS_PER_HOUR: u64 = 60 * MILLIS_PER_MINUTE;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimecodeError {
    #[error("malformed timecode: {0:?}")]
    MalformedTimecode(String),
}

/// A point in a media stream with millisecond precision.
///
/// Ordering is by the total duration, so `01:00:00.000` sorts after
/// `00:59:59.999`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Timecode {
    pub hours: u32,
    pub minutes: u8,
    pub seconds: u8,
    pub millis: u16,
}

impl Timecode {
    pub fn new(hours: u32, minutes: u8, seconds: u8, millis: u16) -> Timecode {
        Timecode {
            hours,
            minutes,
            seconds,
            millis,
        }
    }

    /// Parse `HH:MM:SS,mmm` or `HH:MM:SS.mmm`.
    pub fn parse(s: &str) -> Result<Timecode, TimecodeError> {
        let malformed = || TimecodeError::MalformedTimecode(s.to_owned());
        let caps = TIMECODE_REGEX.captures(s.trim()).ok_or_else(malformed)?;

        // the regex guarantees every group is a run of ascii digits
        let field = |idx: usize| caps[idx].parse::<u32>().map_err(|_| malformed());
        let hours = field(1)?;
        let minutes = field(2)?;
        let seconds = field(3)?;
        let millis = field(4)?;

        if minutes > 59 || seconds > 59 {
            return Err(malformed());
        }

        Ok(Timecode {
            hours,
            minutes: minutes as u8,
            seconds: seconds as u8,
            millis: millis as u16,
        })
    }

    pub fn from_duration(d: Duration) -> Timecode {
        let total = d.as_millis() as u64;
        Timecode {
            hours: (total / MILLIS_PER_HOUR) as u32,
            minutes: ((total % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE) as u8,
            seconds: ((total % MILLIS_PER_MINUTE) / MILLIS_PER_SECOND) as u8,
            millis: (total % MILLIS_PER_SECOND) as u16,
        }
    }

    pub fn as_millis(&self) -> u64 {
        self.hours as u64 * MILLIS_PER_HOUR
            + self.minutes as u64 * MILLIS_PER_MINUTE
            + self.seconds as u64 * MILLIS_PER_SECOND
            + self.millis as u64
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_millis(self.as_millis())
    }

    /// Render in the SubRip convention, `HH:MM:SS,mmm`.
    pub fn srt(&self) -> SrtFormat<'_> {
        SrtFormat(self)
    }

    /// Render as `HH:MM:SS`, dropping the milliseconds.
    pub fn whole_seconds(&self) -> WholeSeconds<'_> {
        WholeSeconds(self)
    }

    /// Drop the millisecond component.
    pub fn truncate_millis(self) -> Timecode {
        Timecode { millis: 0, ..self }
    }
}

impl Ord for Timecode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_millis().cmp(&other.as_millis())
    }
}

impl PartialOrd for Timecode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Timecode {
    type Err = TimecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timecode::parse(s)
    }
}

impl From<Duration> for Timecode {
    fn from(d: Duration) -> Self {
        Timecode::from_duration(d)
    }
}

/// Dot-decimal is the canonical rendering, it is what ffmpeg accepts.
impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}.{:03}",
            self.hours, self.minutes, self.seconds, self.millis
        )
    }
}

impl Serialize for Timecode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub struct SrtFormat<'a>(&'a Timecode);

impl<'a> fmt::Display for SrtFormat<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.0;
        write!(
            f,
            "{:02}:{:02}:{:02},{:03}",
            t.hours, t.minutes, t.seconds, t.millis
        )
    }
}

pub struct WholeSeconds<'a>(&'a Timecode);

impl<'a> fmt::Display for WholeSeconds<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.0;
        write!(f, "{:02}:{:02}:{:02}", t.hours, t.minutes, t.seconds)
    }
}

/// `00:00:01,500` -> `00:00:01.500`. Only the separator changes.
pub fn to_dot_decimal(s: &str) -> String {
    s.replace(',', ".")
}

/// `00:00:01.500` -> `00:00:01,500`. Only the separator changes.
pub fn to_comma_decimal(s: &str) -> String {
    s.replace('.', ",")
}
