//! Readability scoring.
//!
//! Scores follow Flesch reading ease: higher is easier. Plain conversational
//! English lands around 60 to 100, dense technical prose goes below 30 and
//! can run negative.

use once_cell::sync::Lazy;
use regex::Regex;

static WORD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+(?:['\u{2019}]\w+)*").unwrap());
static SENTENCE_END_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

const FLESCH_BASE: f64 = 206.835;
const FLESCH_SENTENCE_WEIGHT: f64 = 1.015;
const FLESCH_SYLLABLE_WEIGHT: f64 = 84.6;

pub trait ComplexityScorer {
    fn score(&self, text: &str) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FleschReadingEase;

impl ComplexityScorer for FleschReadingEase {
    fn score(&self, text: &str) -> f64 {
        flesch_reading_ease(text)
    }
}

impl<F: Fn(&str) -> f64> ComplexityScorer for F {
    fn score(&self, text: &str) -> f64 {
        self(text)
    }
}

/// Words of `text`, punctuation is not a word. `don't` is one word.
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    WORD_REGEX.find_iter(text).map(|m| m.as_str())
}

pub fn word_count(text: &str) -> usize {
    words(text).count()
}

fn sentence_count(text: &str) -> usize {
    SENTENCE_END_REGEX.find_iter(text).count().max(1)
}

/// Vowel-group estimate of the syllables in one word.
pub fn syllable_count(word: &str) -> usize {
    let letters = word
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect::<Vec<_>>();
    if letters.is_empty() {
        return 0;
    }
    if letters.len() <= 3 {
        return 1;
    }

    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
    let mut groups = 0;
    let mut in_group = false;
    for &c in &letters {
        let v = is_vowel(c);
        if v && !in_group {
            groups += 1;
        }
        in_group = v;
    }

    // silent trailing e, but "-le" keeps its syllable (table, little)
    let n = letters.len();
    if groups > 1 && letters[n - 1] == 'e' && letters[n - 2] != 'l' && !is_vowel(letters[n - 2])
    {
        groups -= 1;
    }

    groups.max(1)
}

/// Flesch reading ease of `text`. Text without words scores the formula base.
pub fn flesch_reading_ease(text: &str) -> f64 {
    let (word_total, syllable_total) = words(text).fold((0usize, 0usize), |(w, s), word| {
        (w + 1, s + syllable_count(word))
    });
    if word_total == 0 {
        return FLESCH_BASE;
    }
    let words_per_sentence = word_total as f64 / sentence_count(text) as f64;
    let syllables_per_word = syllable_total as f64 / word_total as f64;
    FLESCH_BASE
        - FLESCH_SENTENCE_WEIGHT * words_per_sentence
        - FLESCH_SYLLABLE_WEIGHT * syllables_per_word
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_tokens() {
        assert_eq!(word_count("Hi there, how are you doing today?"), 7);
        assert_eq!(word_count("No."), 1);
        assert_eq!(word_count("I don't know!"), 3);
        assert_eq!(word_count("  ...  "), 0);
        assert_eq!(
            words("l'été, c'est ça").collect::<Vec<_>>(),
            vec!["l'été", "c'est", "ça"]
        );
    }

    #[test]
    fn syllables() {
        assert_eq!(syllable_count("cat"), 1);
        assert_eq!(syllable_count("window"), 2);
        assert_eq!(syllable_count("today"), 2);
        assert_eq!(syllable_count("table"), 2);
        assert_eq!(syllable_count("make"), 1);
        assert_eq!(syllable_count("organizational"), 6);
        assert_eq!(syllable_count("42"), 0);
    }

    #[test]
    fn simple_text_scores_higher() {
        let easy = flesch_reading_ease("The cat sat on the mat.");
        let hard = flesch_reading_ease(
            "Institutional considerations necessitate comprehensive organizational restructuring.",
        );
        assert!(easy > 100.0, "easy {}", easy);
        assert!(hard < 0.0, "hard {}", hard);
        assert!(easy > hard);
    }

    #[test]
    fn longer_sentences_score_lower() {
        let short = flesch_reading_ease("We go. We sit. We eat.");
        let long = flesch_reading_ease("We go and we sit and we eat.");
        assert!(short > long);
    }

    #[test]
    fn wordless_text() {
        assert_eq!(flesch_reading_ease(""), FLESCH_BASE);
        assert_eq!(flesch_reading_ease("?!"), FLESCH_BASE);
    }

    #[test]
    fn closures_are_scorers() {
        let fixed = |_: &str| 12.5;
        assert_eq!(fixed.score("anything"), 12.5);
        assert_eq!(FleschReadingEase.score(""), FLESCH_BASE);
    }
}
