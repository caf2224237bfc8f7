//! Scoring functions for catalog/video matching.
//!
//! Four independent sub-scorers (title, artist, duration, quality) each
//! return a value in 0..=100. `Scorer::score_pair` folds them into a single
//! confidence with a penalty for jointly weak title+artist evidence.

use serde::Serialize;

use crate::models::{CatalogRecord, VideoRecord};
use crate::normalize::{compact, normalize, Normalizer};

// ============================================================================
// Sub-score Constants
// ============================================================================

pub const TITLE_EXACT: f64 = 100.0;
pub const TITLE_WORDS_CONTAINED: f64 = 80.0;

pub const ARTIST_EXACT: f64 = 100.0;
pub const ARTIST_CHANNEL_SUFFIX: f64 = 90.0;
pub const ARTIST_CONTAINED: f64 = 85.0;
pub const ARTIST_CANDIDATE: f64 = 75.0;

pub const OFFICIAL_ARTIST_BADGE: &str = "official artist channel";
pub const VERIFIED_BADGE: &str = "verified";

/// Video titles containing any of these lose quality points (once).
pub const ALTERNATE_VERSION_TERMS: &[&str] =
    &["cover", "remix", "live", "acoustic", "instrumental", "karaoke"];

// ============================================================================
// Weights & Penalty
// ============================================================================

/// Relative weight of each sub-score in the base confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreWeights {
    pub title: f64,
    pub artist: f64,
    pub duration: f64,
    pub quality: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            title: 0.4,
            artist: 0.3,
            duration: 0.2,
            quality: 0.1,
        }
    }
}

/// Multiplier applied when title and artist evidence is weak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidencePenalty {
    None,
    /// Title or artist under 20
    Moderate,
    /// Mean of title and artist under 30
    Heavy,
}

impl EvidencePenalty {
    pub fn from_scores(title: f64, artist: f64) -> Self {
        if (title + artist) / 2.0 < 30.0 {
            EvidencePenalty::Heavy
        } else if title < 20.0 || artist < 20.0 {
            EvidencePenalty::Moderate
        } else {
            EvidencePenalty::None
        }
    }

    pub fn multiplier(self) -> f64 {
        match self {
            EvidencePenalty::None => 1.0,
            EvidencePenalty::Moderate => 0.7,
            EvidencePenalty::Heavy => 0.3,
        }
    }
}

/// Breakdown of one catalog/video pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchScore {
    pub title: f64,
    pub artist: f64,
    pub duration: f64,
    pub quality: f64,
    pub base: f64,
    pub penalty: EvidencePenalty,
    /// 0.0..=100.0
    pub confidence: f64,
}

// ============================================================================
// String Similarity
// ============================================================================

/// Edit-distance similarity on a 0-100 scale. Lengths are counted in chars.
pub fn levenshtein_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 0.0;
    }
    let distance = strsim::levenshtein(a, b);
    let similarity = max_len.saturating_sub(distance) as f64 / max_len as f64 * 100.0;
    similarity.max(0.0)
}

/// True if every word of `needle` occurs somewhere in `haystack`.
fn words_contained(needle: &str, haystack: &str) -> bool {
    needle.split_whitespace().all(|word| haystack.contains(word))
}

// ============================================================================
// Duration Scoring
// ============================================================================

/// Banded duration score on the absolute difference in seconds. Symmetric.
pub fn duration_similarity(a_sec: u32, b_sec: u32) -> f64 {
    match a_sec.abs_diff(b_sec) {
        0..=5 => 100.0,
        6..=15 => 80.0,
        16..=30 => 60.0,
        31..=60 => 40.0,
        _ => 0.0,
    }
}

// ============================================================================
// Scorer
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Scorer {
    normalizer: Normalizer,
    weights: ScoreWeights,
}

impl Scorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parts(normalizer: Normalizer, weights: ScoreWeights) -> Self {
        Self {
            normalizer,
            weights,
        }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn weights(&self) -> ScoreWeights {
        self.weights
    }

    /// Title similarity after noise-word removal.
    ///
    /// If noise removal empties both titles ("Official Video" vs "Official
    /// Video"), the plain normalized titles are compared instead. An empty
    /// title scores 0.
    pub fn title_similarity(&self, a: &str, b: &str) -> f64 {
        let mut clean_a = self.normalizer.remove_noise_words(a);
        let mut clean_b = self.normalizer.remove_noise_words(b);
        if clean_a.is_empty() && clean_b.is_empty() {
            clean_a = normalize(a);
            clean_b = normalize(b);
        }
        if clean_a.is_empty() || clean_b.is_empty() {
            return 0.0;
        }

        if clean_a == clean_b {
            return TITLE_EXACT;
        }
        if words_contained(&clean_a, &clean_b) || words_contained(&clean_b, &clean_a) {
            return TITLE_WORDS_CONTAINED;
        }
        levenshtein_similarity(&clean_a, &clean_b)
    }

    /// Artist similarity between a catalog artist and a video's channel,
    /// using the video title as a secondary source of artist candidates.
    pub fn artist_similarity(&self, artist: &str, channel: &str, video_title: &str) -> f64 {
        let artist_norm = normalize(artist);
        let channel_norm = normalize(channel);
        if artist_norm.is_empty() || channel_norm.is_empty() {
            return 0.0;
        }

        if artist_norm == channel_norm {
            return ARTIST_EXACT;
        }
        if channel_norm.contains(&artist_norm) || artist_norm.contains(&channel_norm) {
            return ARTIST_CONTAINED;
        }

        let channel_core = self.normalizer.strip_channel_suffix(&channel_norm);
        if compact(channel_core) == compact(&artist_norm) {
            return ARTIST_CHANNEL_SUFFIX;
        }

        let candidate_hit = self
            .normalizer
            .extract_artist_candidates(channel)
            .into_iter()
            .chain(self.normalizer.extract_artist_candidates(video_title))
            .any(|candidate| candidate == artist_norm);
        if candidate_hit {
            return ARTIST_CANDIDATE;
        }

        levenshtein_similarity(&artist_norm, channel_core)
    }

    /// Popularity/authority heuristic for a video. Floored at 0.
    pub fn quality_score(&self, video: &VideoRecord) -> f64 {
        let mut score = 0.0;

        let has_badge = |name: &str| video.badges.iter().any(|b| normalize(b) == name);
        if has_badge(OFFICIAL_ARTIST_BADGE) {
            score += 20.0;
        }
        if has_badge(VERIFIED_BADGE) {
            score += 10.0;
        }

        if video.view_count > 10_000_000 {
            score += 10.0;
        } else if video.view_count > 1_000_000 {
            score += 5.0;
        }

        let title_norm = normalize(&video.title);
        if ALTERNATE_VERSION_TERMS.iter().any(|term| title_norm.contains(term)) {
            score -= 15.0;
        }

        f64::max(score, 0.0)
    }

    /// Best title similarity against the full video title and against the
    /// title side of a compound video title ("Artist - Title"). A half only
    /// counts when the other half is the catalog artist or the channel.
    fn best_title_similarity(&self, catalog: &CatalogRecord, video: &VideoRecord) -> f64 {
        let artist_key = compact(&normalize(&catalog.artist));
        let channel_norm = normalize(&video.channel);
        let channel_keys = [
            compact(&channel_norm),
            compact(self.normalizer.strip_channel_suffix(&channel_norm)),
        ];
        let is_artist_side = |half: &str| {
            let key = compact(half);
            !key.is_empty() && (key == artist_key || channel_keys.contains(&key))
        };

        self.normalizer
            .split_compound_title(&video.title)
            .iter()
            .filter_map(|(first, second)| {
                if is_artist_side(first) {
                    Some(second)
                } else if is_artist_side(second) {
                    Some(first)
                } else {
                    None
                }
            })
            .map(|title_side| self.title_similarity(&catalog.title, title_side))
            .fold(self.title_similarity(&catalog.title, &video.title), f64::max)
    }

    /// Score one catalog/video pair with the full breakdown.
    pub fn score_pair(&self, catalog: &CatalogRecord, video: &VideoRecord) -> MatchScore {
        let title = self.best_title_similarity(catalog, video);
        let artist = self.artist_similarity(&catalog.artist, &video.channel, &video.title);
        let duration = duration_similarity(catalog.duration_sec, video.duration_sec);
        let quality = self.quality_score(video);

        let w = self.weights;
        let base = w.title * title + w.artist * artist + w.duration * duration + w.quality * quality;
        let penalty = EvidencePenalty::from_scores(title, artist);
        let confidence = (base * penalty.multiplier()).clamp(0.0, 100.0);

        tracing::trace!(
            catalog_id = %catalog.id,
            video_id = %video.id,
            title,
            artist,
            duration,
            quality,
            base,
            penalty = ?penalty,
            confidence,
            "scored pair"
        );

        MatchScore {
            title,
            artist,
            duration,
            quality,
            base,
            penalty,
            confidence,
        }
    }

    /// Confidence (0-100) that `catalog` and `video` are the same track.
    pub fn calculate_match_score(&self, catalog: &CatalogRecord, video: &VideoRecord) -> f64 {
        self.score_pair(catalog, video).confidence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(title: &str, artist: &str, duration_sec: u32) -> CatalogRecord {
        CatalogRecord {
            id: "c1".into(),
            title: title.into(),
            artist: artist.into(),
            album: None,
            duration_sec,
            artwork_url: None,
            explicit: false,
            share_url: None,
        }
    }

    fn video(title: &str, channel: &str, duration_sec: u32) -> VideoRecord {
        VideoRecord {
            id: "v1".into(),
            title: title.into(),
            channel: channel.into(),
            duration_sec,
            thumbnail_url: None,
            view_count: 0,
            published_at: None,
            badges: Vec::new(),
            is_live: false,
        }
    }

    #[test]
    fn test_levenshtein_similarity() {
        assert_eq!(levenshtein_similarity("", ""), 0.0);
        assert_eq!(levenshtein_similarity("abc", "abc"), 100.0);
        assert_eq!(levenshtein_similarity("abcd", "abcx"), 75.0);
        assert_eq!(levenshtein_similarity("abc", ""), 0.0);
    }

    #[test]
    fn test_title_similarity_self_is_100() {
        let scorer = Scorer::new();
        for t in ["Bad Romance", "Official Video", "Yesterday (Remastered 2009)", "ÉTÉ"] {
            assert_eq!(scorer.title_similarity(t, t), 100.0, "{t}");
        }
    }

    #[test]
    fn test_title_similarity_noise_removed() {
        let scorer = Scorer::new();
        assert_eq!(
            scorer.title_similarity("Bad Romance", "Bad Romance (Official Music Video)"),
            100.0
        );
    }

    #[test]
    fn test_title_similarity_word_containment() {
        let scorer = Scorer::new();
        assert_eq!(
            scorer.title_similarity("Bad Romance", "Lady Gaga - Bad Romance (Official Music Video)"),
            80.0
        );
    }

    #[test]
    fn test_title_similarity_levenshtein_fallback() {
        let scorer = Scorer::new();
        // 1 edit over 9 chars
        let score = scorer.title_similarity("Yesterday", "Yesturday");
        assert!((score - 800.0 / 9.0).abs() < 1e-9);
        assert!(scorer.title_similarity("Bad Romance", "Yesterday") < 20.0);
    }

    #[test]
    fn test_title_similarity_empty() {
        let scorer = Scorer::new();
        assert_eq!(scorer.title_similarity("", "Song"), 0.0);
        assert_eq!(scorer.title_similarity("", ""), 0.0);
    }

    #[test]
    fn test_artist_similarity_ladder() {
        let scorer = Scorer::new();
        assert_eq!(scorer.artist_similarity("Adele", "ADELE", ""), 100.0);
        assert_eq!(scorer.artist_similarity("Adele", "AdeleVEVO", ""), 85.0);
        assert_eq!(scorer.artist_similarity("Lady Gaga", "LadyGagaVEVO", ""), 90.0);
        assert_eq!(
            scorer.artist_similarity("Johnny Cash", "Classic Hits", "Hurt by Johnny Cash"),
            75.0
        );
    }

    #[test]
    fn test_artist_similarity_levenshtein_uses_channel_core() {
        let scorer = Scorer::new();
        // "the beatles" vs "karaoke": 9 edits over 11 chars
        let score = scorer.artist_similarity("The Beatles", "KaraokeChannel", "Yesterday - Karaoke Version");
        assert!((score - 200.0 / 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_artist_similarity_empty() {
        let scorer = Scorer::new();
        assert_eq!(scorer.artist_similarity("", "Some Channel", ""), 0.0);
        assert_eq!(scorer.artist_similarity("Adele", "", ""), 0.0);
    }

    #[test]
    fn test_duration_similarity_bands() {
        assert_eq!(duration_similarity(200, 205), 100.0);
        assert_eq!(duration_similarity(200, 215), 80.0);
        assert_eq!(duration_similarity(200, 230), 60.0);
        assert_eq!(duration_similarity(200, 260), 40.0);
        assert_eq!(duration_similarity(200, 261), 0.0);
    }

    #[test]
    fn test_duration_similarity_symmetric() {
        for (a, b) in [(0, 7), (125, 130), (300, 10), (60, 121)] {
            assert_eq!(duration_similarity(a, b), duration_similarity(b, a));
        }
    }

    #[test]
    fn test_quality_badges_and_views() {
        let scorer = Scorer::new();
        let mut v = video("Song", "Artist", 200);
        v.badges = vec!["Official Artist Channel".into(), "Verified".into()];
        v.view_count = 20_000_000;
        assert_eq!(scorer.quality_score(&v), 40.0);

        v.view_count = 2_000_000;
        assert_eq!(scorer.quality_score(&v), 35.0);

        v.view_count = 1_000_000;
        assert_eq!(scorer.quality_score(&v), 30.0);
    }

    #[test]
    fn test_quality_penalty_applied_once_and_floored() {
        let scorer = Scorer::new();
        let mut v = video("Song (Live Acoustic Cover)", "Artist", 200);
        assert_eq!(scorer.quality_score(&v), 0.0);

        v.badges = vec!["Official Artist Channel".into()];
        assert_eq!(scorer.quality_score(&v), 5.0);

    }

    #[test]
    fn test_quality_penalty_matches_inside_words() {
        let scorer = Scorer::new();
        for title in ["Song (Remixed)", "Instrumentals", "Greatest Covers", "Live-Session"] {
            let mut v = video(title, "Artist", 200);
            v.view_count = 5_000_000;
            assert_eq!(scorer.quality_score(&v), 0.0, "{title}");
        }
    }

    #[test]
    fn test_evidence_penalty_branches() {
        assert_eq!(EvidencePenalty::from_scores(10.0, 20.0), EvidencePenalty::Heavy);
        assert_eq!(EvidencePenalty::from_scores(100.0, 18.0), EvidencePenalty::Moderate);
        assert_eq!(EvidencePenalty::from_scores(15.0, 90.0), EvidencePenalty::Moderate);
        assert_eq!(EvidencePenalty::from_scores(30.0, 30.0), EvidencePenalty::None);
    }

    #[test]
    fn test_score_pair_official_video() {
        let scorer = Scorer::new();
        let c = catalog("Bad Romance", "Lady Gaga", 294);
        let mut v = video("Lady Gaga - Bad Romance (Official Music Video)", "LadyGagaVEVO", 296);
        v.badges = vec!["Official Artist Channel".into()];

        let score = scorer.score_pair(&c, &v);
        assert_eq!(score.title, 100.0);
        assert_eq!(score.artist, 90.0);
        assert_eq!(score.duration, 100.0);
        assert_eq!(score.quality, 20.0);
        assert_eq!(score.penalty, EvidencePenalty::None);
        assert!((score.confidence - 89.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_pair_karaoke_moderate_penalty() {
        let scorer = Scorer::new();
        let c = catalog("Yesterday", "The Beatles", 125);
        let v = video("Yesterday - Karaoke Version", "KaraokeChannel", 130);

        let score = scorer.score_pair(&c, &v);
        assert_eq!(score.title, 100.0);
        assert!(score.artist < 20.0);
        assert_eq!(score.quality, 0.0);
        assert_eq!(score.penalty, EvidencePenalty::Moderate);
        assert!(score.confidence < score.base);
        assert!((score.confidence - score.base * 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_title_named_after_artist_not_boosted() {
        let scorer = Scorer::new();
        let c = catalog("Queen", "Freddie Fan Band", 354);
        for channel in ["Queen Official", "Classic Rock Archive"] {
            let v = video("Queen - Bohemian Rhapsody", channel, 354);
            let score = scorer.score_pair(&c, &v);
            assert_eq!(score.title, 80.0, "{channel}");
        }
    }

    #[test]
    fn test_title_side_used_when_other_half_is_channel() {
        let scorer = Scorer::new();
        let c = catalog("Bohemian Rhapsody", "Queen", 354);
        let v = video("QUEEN – Bohemian Rhapsody (Official Video)", "Queen Official", 359);
        assert_eq!(scorer.score_pair(&c, &v).title, 100.0);
    }

    #[test]
    fn test_score_pair_unrelated_heavy_penalty() {
        let scorer = Scorer::new();
        let c = catalog("Bad Romance", "Lady Gaga", 294);
        let v = video("Yesterday", "The Beatles", 294);

        let score = scorer.score_pair(&c, &v);
        assert_eq!(score.penalty, EvidencePenalty::Heavy);
        // Matching duration alone must not rescue the pair
        assert!(score.confidence < 25.0);
    }

    #[test]
    fn test_confidence_bounds() {
        let scorer = Scorer::with_parts(
            Normalizer::default(),
            ScoreWeights {
                title: 1.0,
                artist: 1.0,
                duration: 1.0,
                quality: 1.0,
            },
        );
        let c = catalog("Song", "Artist", 200);
        let mut v = video("Song", "Artist", 200);
        v.badges = vec!["Official Artist Channel".into(), "Verified".into()];
        v.view_count = 50_000_000;
        assert_eq!(scorer.calculate_match_score(&c, &v), 100.0);

        let c = catalog("", "", 0);
        let v = video("", "", 10_000);
        assert_eq!(scorer.calculate_match_score(&c, &v), 0.0);
    }
}
