use serde::Serialize;

use crate::{
    complexity::{word_count, ComplexityScorer, FleschReadingEase},
    subtitle::SubtitleCue,
    timecode::Timecode,
};

pub const DEFAULT_MIN_WORDS: usize = 5;
pub const DEFAULT_MAX_SCORE: f64 = 50.0;

/// A cue that passed the filter, with the score that got it there.
///
/// `score` is reading ease, so lower means harder text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDialogue {
    pub index: u32,
    pub start: Timecode,
    pub end: Timecode,
    pub text: String,
    pub score: f64,
}

/// Keeps cues that are long enough and hard enough to be worth studying.
///
/// A cue is kept when it has at least `min_words` words and its score is
/// strictly below `max_score`.
#[derive(Debug, Clone)]
pub struct DialogueFilter<S = FleschReadingEase> {
    pub min_words: usize,
    pub max_score: f64,
    scorer: S,
}

impl Default for DialogueFilter {
    fn default() -> Self {
        DialogueFilter {
            min_words: DEFAULT_MIN_WORDS,
            max_score: DEFAULT_MAX_SCORE,
            scorer: FleschReadingEase,
        }
    }
}

impl DialogueFilter {
    pub fn new(min_words: usize, max_score: f64) -> Self {
        DialogueFilter {
            min_words,
            max_score,
            scorer: FleschReadingEase,
        }
    }
}

impl<S: ComplexityScorer> DialogueFilter<S> {
    pub fn with_scorer(min_words: usize, max_score: f64, scorer: S) -> Self {
        DialogueFilter {
            min_words,
            max_score,
            scorer,
        }
    }

    /// Score a single cue, `None` if it is rejected.
    pub fn select(&self, cue: &SubtitleCue) -> Option<ScoredDialogue> {
        let words = word_count(&cue.text);
        if words < self.min_words {
            log::trace!("cue {} rejected: {} words", cue.index, words);
            return None;
        }
        let score = self.scorer.score(&cue.text);
        if score >= self.max_score {
            log::trace!("cue {} rejected: score {:.2}", cue.index, score);
            return None;
        }
        Some(ScoredDialogue {
            index: cue.index,
            start: cue.start,
            end: cue.end,
            text: cue.text.clone(),
            score,
        })
    }

    /// Stable filter over `cues`, survivors keep their relative order.
    pub fn filter(&self, cues: &[SubtitleCue]) -> Vec<ScoredDialogue> {
        let selected = cues
            .iter()
            .filter_map(|cue| self.select(cue))
            .collect::<Vec<_>>();
        log::debug!("selected {} of {} subtitles", selected.len(), cues.len());
        selected
    }
}

/// Filter with the default thresholds and Flesch scoring.
pub fn filter_dialogues(cues: &[SubtitleCue]) -> Vec<ScoredDialogue> {
    DialogueFilter::default().filter(cues)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HARD: &str =
        "Institutional considerations necessitate comprehensive organizational restructuring.";

    fn cue(index: u32, text: &str) -> SubtitleCue {
        SubtitleCue {
            index,
            start: Timecode::new(0, 0, index as u8, 0),
            end: Timecode::new(0, 0, index as u8 + 1, 0),
            text: text.to_owned(),
        }
    }

    #[test]
    fn short_cues_are_dropped_regardless_of_score() {
        let always_hard = DialogueFilter::with_scorer(5, 50.0, |_: &str| -100.0);
        assert_eq!(always_hard.select(&cue(2, "No.")), None);
        assert_eq!(always_hard.select(&cue(3, "one two three four")), None);
        assert!(always_hard.select(&cue(4, "one two three four five")).is_some());
    }

    #[test]
    fn easy_cues_are_dropped_regardless_of_length() {
        let long = "word ".repeat(40);
        let at_threshold = DialogueFilter::with_scorer(5, 50.0, |_: &str| 50.0);
        assert_eq!(at_threshold.select(&cue(1, &long)), None);
        let just_below = DialogueFilter::with_scorer(5, 50.0, |_: &str| 49.99);
        assert!(just_below.select(&cue(1, &long)).is_some());
    }

    #[test]
    fn score_is_attached() {
        let f = DialogueFilter::with_scorer(1, 50.0, |t: &str| t.len() as f64);
        let d = f.select(&cue(7, "hello")).unwrap();
        assert_eq!(d.score, 5.0);
        assert_eq!(d.index, 7);
        assert_eq!(d.text, "hello");
        assert_eq!(d.start, Timecode::new(0, 0, 7, 0));
    }

    #[test]
    fn default_filter_with_flesch() {
        let cues = vec![
            cue(1, "Hi there, how are you doing today?"),
            cue(2, "No."),
            cue(3, HARD),
        ];
        let selected = filter_dialogues(&cues);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].index, 3);
        assert!(selected[0].score < DEFAULT_MAX_SCORE);
    }

    #[test]
    fn order_is_stable() {
        let cues = vec![cue(9, HARD), cue(1, "short"), cue(4, HARD), cue(2, HARD)];
        let indexes = filter_dialogues(&cues)
            .into_iter()
            .map(|d| d.index)
            .collect::<Vec<_>>();
        assert_eq!(indexes, vec![9, 4, 2]);
    }

    #[test]
    fn empty_input() {
        assert!(filter_dialogues(&[]).is_empty());
    }

    #[test]
    fn configurable_thresholds() {
        let lenient = DialogueFilter::new(1, 200.0);
        assert_eq!(lenient.filter(&[cue(1, "No.")]).len(), 1);
    }
}
