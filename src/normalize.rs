//! Text normalization for catalog/video matching.
//!
//! The `Normalizer` owns its vocabularies (noise words, channel brand
//! suffixes) as immutable data, so one instance can be shared freely across
//! threads. Separator heuristics are compiled once as statics.

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashSet;
use std::cmp::Reverse;
use unicode_normalization::UnicodeNormalization;

// ============================================================================
// VOCABULARIES
// ============================================================================

/// Release/production qualifiers that carry no identity information.
pub const DEFAULT_NOISE_WORDS: &[&str] = &[
    "official",
    "video",
    "music",
    "lyrics",
    "lyric",
    "hd",
    "hq",
    "4k",
    "remastered",
    "remaster",
    "radio",
    "edit",
    "audio",
    "live",
    "acoustic",
    "instrumental",
    "cover",
    "remix",
    "extended",
    "explicit",
    "clean",
    "censored",
    "uncensored",
    "deluxe",
    "version",
    "karaoke",
    "visualizer",
    "visualiser",
    "mv",
    "feat",
    "ft",
];

/// Brand suffixes video platforms append to artist channel names
/// ("AdeleVEVO", "Queen Official", "Muse - Topic").
pub const DEFAULT_CHANNEL_SUFFIXES: &[&str] = &[
    "official channel",
    "officialchannel",
    "official",
    "vevo",
    "topic",
    "channel",
    "music",
    "tv",
];

// ============================================================================
// REGEX PATTERNS
// ============================================================================

/// Anything that is neither a word character nor whitespace
pub static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

pub static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Compound-title separators, tried in order. Each captures two halves.
pub static ARTIST_SEPARATOR_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // "Artist - Title", "Artist – Title", "Artist—Title"
        Regex::new(r"^(.+?)(?:\s*[–—]\s*|\s+-\s+)(.+)$").unwrap(),
        // "Artist: Title"
        Regex::new(r"^(.+?)\s*:\s+(.+)$").unwrap(),
        // "Title by Artist"
        Regex::new(r"(?i)^(.+?)\s+by\s+(.+)$").unwrap(),
        // "Title (Artist)", "Title [Artist]"
        Regex::new(r"^(.+?)\s*[\(\[]([^\)\]]+)[\)\]]\s*$").unwrap(),
    ]
});

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// Check if a character is a Unicode combining mark (diacritical mark).
pub fn is_combining_mark(c: char) -> bool {
    matches!(c as u32, 0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0xFE20..=0xFE2F)
}

/// Lowercase and strip Latin diacritics: "Beyoncé" → "beyonce".
/// Lowercasing runs on both sides of the NFKD pass since each can produce
/// input the other would still change ("İ" lowercases to "i" + U+0307).
pub fn fold_diacritics(s: &str) -> String {
    let lowered = s.to_lowercase();
    let stripped: String = lowered.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    stripped.to_lowercase()
}

/// Remove all whitespace, for comparing "ladygaga" against "lady gaga".
pub fn compact(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

// ============================================================================
// NORMALIZER
// ============================================================================

#[derive(Debug, Clone)]
pub struct Normalizer {
    noise_words: FxHashSet<String>,
    /// Longest first, so "official channel" wins over "channel"
    channel_suffixes: Vec<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::with_vocabulary(DEFAULT_NOISE_WORDS, DEFAULT_CHANNEL_SUFFIXES)
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a normalizer with custom vocabularies. Entries are normalized on
    /// the way in so callers can pass display-cased terms.
    pub fn with_vocabulary<S: AsRef<str>>(noise_words: &[S], channel_suffixes: &[S]) -> Self {
        let noise_words = noise_words
            .iter()
            .map(|w| normalize(w.as_ref()))
            .filter(|w| !w.is_empty())
            .collect();

        let mut suffixes: Vec<String> = channel_suffixes
            .iter()
            .map(|s| normalize(s.as_ref()))
            .filter(|s| !s.is_empty())
            .collect();
        suffixes.sort_by(|a, b| (Reverse(a.len()), a).cmp(&(Reverse(b.len()), b)));
        suffixes.dedup();

        Self {
            noise_words,
            channel_suffixes: suffixes,
        }
    }

    pub fn is_noise_word(&self, token: &str) -> bool {
        self.noise_words.contains(token)
    }

    /// Lowercase, fold diacritics, turn punctuation into spaces, collapse
    /// whitespace and trim. Idempotent.
    pub fn normalize(&self, text: &str) -> String {
        normalize(text)
    }

    /// Normalize and drop every noise-word token.
    pub fn remove_noise_words(&self, text: &str) -> String {
        normalize(text)
            .split_whitespace()
            .filter(|token| !self.is_noise_word(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Both normalized halves of every separator pattern that fires on a
    /// compound title, in pattern order. Pairs with an empty half are dropped.
    pub fn split_compound_title(&self, title: &str) -> Vec<(String, String)> {
        let title = title.trim();
        ARTIST_SEPARATOR_PATTERNS
            .iter()
            .filter_map(|pattern| pattern.captures(title))
            .filter_map(|caps| {
                let first = normalize(caps.get(1)?.as_str());
                let second = normalize(caps.get(2)?.as_str());
                (!first.is_empty() && !second.is_empty()).then_some((first, second))
            })
            .collect()
    }

    /// Candidate artist (or title) substrings from a compound title such as
    /// "Artist - Title" or "Title (Artist)". Both halves of every firing
    /// separator pattern are returned normalized, without duplicates.
    pub fn extract_artist_candidates(&self, title: &str) -> Vec<String> {
        let mut candidates: Vec<String> = Vec::new();
        for (first, second) in self.split_compound_title(title) {
            for candidate in [first, second] {
                if !candidates.contains(&candidate) {
                    candidates.push(candidate);
                }
            }
        }
        candidates
    }

    /// Strip one trailing brand suffix from an already-normalized channel
    /// name, whether glued on ("adelevevo") or a separate token
    /// ("queen official"). The whole name is never stripped.
    pub fn strip_channel_suffix<'a>(&self, channel_norm: &'a str) -> &'a str {
        for suffix in &self.channel_suffixes {
            if let Some(rest) = channel_norm.strip_suffix(suffix.as_str()) {
                let rest = rest.trim_end();
                if !rest.is_empty() {
                    return rest;
                }
            }
        }
        channel_norm
    }
}

/// Vocabulary-free normalization (see `Normalizer::normalize`).
pub fn normalize(text: &str) -> String {
    let folded = fold_diacritics(text);
    let spaced = NON_WORD.replace_all(&folded, " ");
    MULTI_SPACE.replace_all(&spaced, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize("Hello, World!!"), "hello world");
        assert_eq!(normalize("  AC/DC  "), "ac dc");
        assert_eq!(normalize("Don't Stop   Me-Now"), "don t stop me now");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_case_insensitive() {
        assert_eq!(normalize("Hello!!"), normalize("hello"));
    }

    #[test]
    fn test_normalize_idempotent() {
        for s in [
            "Lady Gaga - Bad Romance (Official Music Video)",
            "Beyoncé — Halo [HD]",
            "İstanbul",
            "  ...  ",
            "snake_case_title",
        ] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "not idempotent for {s:?}");
        }
    }

    #[test]
    fn test_fold_diacritics() {
        assert_eq!(fold_diacritics("Björk"), "bjork");
        assert_eq!(fold_diacritics("Motörhead"), "motorhead");
        assert_eq!(fold_diacritics("Beyoncé"), "beyonce");
    }

    #[test]
    fn test_remove_noise_words() {
        let n = Normalizer::default();
        assert_eq!(
            n.remove_noise_words("Bad Romance (Official Music Video)"),
            "bad romance"
        );
        assert_eq!(n.remove_noise_words("Yesterday - Karaoke Version"), "yesterday");
        assert_eq!(n.remove_noise_words("Official Video"), "");
    }

    #[test]
    fn test_remove_noise_words_never_adds_tokens() {
        let n = Normalizer::default();
        for s in [
            "Song Title (Live at Wembley) [Remastered 2011]",
            "plain title",
            "",
            "HD HQ 4K",
        ] {
            let normalized = normalize(s);
            let cleaned = n.remove_noise_words(s);
            assert!(cleaned.split_whitespace().count() <= normalized.split_whitespace().count());
            assert!(cleaned.len() <= normalized.len());
        }
    }

    #[test]
    fn test_custom_vocabulary() {
        let n = Normalizer::with_vocabulary(&["Bonus"], &["Records"]);
        assert_eq!(n.remove_noise_words("Song (Bonus Track)"), "song track");
        assert_eq!(n.strip_channel_suffix("warp records"), "warp");
        assert!(!n.is_noise_word("official"));
    }

    #[test]
    fn test_extract_candidates_dash() {
        let n = Normalizer::default();
        let candidates = n.extract_artist_candidates("Lady Gaga - Bad Romance (Official Music Video)");
        assert_eq!(candidates[0], "lady gaga");
        assert_eq!(candidates[1], "bad romance official music video");
        // Trailing bracket also fires
        assert!(candidates.contains(&"official music video".to_string()));
    }

    #[test]
    fn test_extract_candidates_colon_and_by() {
        let n = Normalizer::default();
        assert_eq!(
            n.extract_artist_candidates("Queen: Bohemian Rhapsody"),
            vec!["queen", "bohemian rhapsody"]
        );
        assert_eq!(
            n.extract_artist_candidates("Hurt by Johnny Cash"),
            vec!["hurt", "johnny cash"]
        );
    }

    #[test]
    fn test_extract_candidates_trailing_bracket() {
        let n = Normalizer::default();
        assert_eq!(
            n.extract_artist_candidates("Hallelujah [Jeff Buckley]"),
            vec!["hallelujah", "jeff buckley"]
        );
    }

    #[test]
    fn test_extract_candidates_hyphenated_name_not_split() {
        let n = Normalizer::default();
        assert!(n.extract_artist_candidates("Jay-Z").is_empty());
        assert!(n.extract_artist_candidates("").is_empty());
    }

    #[test]
    fn test_split_compound_title_keeps_pairs() {
        let n = Normalizer::default();
        assert_eq!(
            n.split_compound_title("Queen - Bohemian Rhapsody (Live)"),
            vec![
                ("queen".to_string(), "bohemian rhapsody live".to_string()),
                ("queen bohemian rhapsody".to_string(), "live".to_string()),
            ]
        );
        assert!(n.split_compound_title("Plain Title").is_empty());
    }

    #[test]
    fn test_channel_suffixes_deduplicated() {
        let n = Normalizer::with_vocabulary(&["x"], &["tv", "fm", "tv", "FM", "vevo"]);
        assert_eq!(n.channel_suffixes, vec!["vevo", "fm", "tv"]);
    }

    #[test]
    fn test_strip_channel_suffix() {
        let n = Normalizer::default();
        assert_eq!(n.strip_channel_suffix("ladygagavevo"), "ladygaga");
        assert_eq!(n.strip_channel_suffix("queen official"), "queen");
        assert_eq!(n.strip_channel_suffix("muse topic"), "muse");
        assert_eq!(n.strip_channel_suffix("adele official channel"), "adele");
        assert_eq!(n.strip_channel_suffix("karaokechannel"), "karaoke");
        // Never strips the whole name
        assert_eq!(n.strip_channel_suffix("vevo"), "vevo");
        assert_eq!(n.strip_channel_suffix("radiohead"), "radiohead");
    }
}
