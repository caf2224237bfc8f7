//! Core data models for catalog/video record linkage.
//!
//! Input records are read-only; every matching run produces a fresh
//! `MatchReport` and holds no state between calls.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// Input Models
// ============================================================================

/// Track entry from the catalog (canonical metadata) source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub album: Option<String>,
    pub duration_sec: u32,
    #[serde(default)]
    pub artwork_url: Option<String>,
    #[serde(default)]
    pub explicit: bool,
    #[serde(default)]
    pub share_url: Option<String>,
}

/// Candidate playable entry from the video source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub channel: String,
    pub duration_sec: u32,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub badges: Vec<String>,
    #[serde(default)]
    pub is_live: bool,
}

// ============================================================================
// Output Models
// ============================================================================

/// Which side's metadata is authoritative for title/artist/album/duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimarySource {
    Catalog,
    Video,
}

/// A linked catalog/video pair.
///
/// Display fields (`title`, `artist`, `album`, `duration_sec`) always come from
/// the catalog record; the `video_*` fields and popularity signals come from
/// the matched video.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    // Catalog side
    pub catalog_id: String,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub duration_sec: u32,
    pub artwork_url: Option<String>,
    pub explicit: bool,
    pub share_url: Option<String>,

    // Video side
    pub video_id: String,
    pub thumbnail_url: Option<String>,
    pub channel: String,
    pub view_count: u64,
    pub published_at: Option<String>,
    pub badges: Vec<String>,
    pub is_live: bool,

    /// 0.0..=100.0
    pub confidence: f64,
    pub primary_source: PrimarySource,
}

impl MatchResult {
    pub fn new(catalog: &CatalogRecord, video: &VideoRecord, confidence: f64) -> Self {
        Self {
            catalog_id: catalog.id.clone(),
            title: catalog.title.clone(),
            artist: catalog.artist.clone(),
            album: catalog.album.clone(),
            duration_sec: catalog.duration_sec,
            artwork_url: catalog.artwork_url.clone(),
            explicit: catalog.explicit,
            share_url: catalog.share_url.clone(),
            video_id: video.id.clone(),
            thumbnail_url: video.thumbnail_url.clone(),
            channel: video.channel.clone(),
            view_count: video.view_count,
            published_at: video.published_at.clone(),
            badges: video.badges.clone(),
            is_live: video.is_live,
            confidence: confidence.clamp(0.0, 100.0),
            primary_source: PrimarySource::Catalog,
        }
    }
}

// ============================================================================
// Failure Tracking
// ============================================================================

/// Why a catalog record produced no match.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// Every video was already claimed (or there were none)
    NoVideoCandidates,
    /// Best available candidate scored under the threshold
    BelowThreshold {
        candidate_count: usize,
        best_score: f64,
        threshold: f64,
    },
    /// Another catalog record with the same identifier was already matched
    DuplicateIdentifier,
    /// A usable candidate existed but the optimal assignment gave it to another record
    Outbid { best_score: f64 },
}

impl FailureReason {
    /// Short label used for logs and stats
    pub fn label(&self) -> &'static str {
        match self {
            FailureReason::NoVideoCandidates => "no_candidates",
            FailureReason::BelowThreshold { .. } => "below_threshold",
            FailureReason::DuplicateIdentifier => "duplicate_id",
            FailureReason::Outbid { .. } => "outbid",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UnmatchedRecord {
    pub catalog_id: String,
    pub reason: FailureReason,
}

/// Full outcome of one matching run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct MatchReport {
    /// Sorted by confidence, highest first
    pub matches: Vec<MatchResult>,
    /// In catalog input order
    pub unmatched: Vec<UnmatchedRecord>,
    pub stats: MatchingStats,
}

// ============================================================================
// Statistics (Instrumentation)
// ============================================================================

#[derive(Default, Debug, Clone, Serialize)]
pub struct MatchingStats {
    pub catalog_records: usize,
    pub video_records: usize,
    pub pairs_scored: usize,

    // Joint-evidence penalty branches across all scored pairs
    pub pairs_heavy_penalty: usize,
    pub pairs_moderate_penalty: usize,

    // Outcomes
    pub matches: usize,
    pub no_candidates: usize,
    pub below_threshold: usize,
    pub duplicate_ids: usize,
    pub outbid: usize,

    // Duration difference of accepted matches (seconds)
    pub duration_matches_0_to_5: usize,
    pub duration_matches_6_to_15: usize,
    pub duration_matches_16_to_30: usize,
    pub duration_matches_31_to_60: usize,
    pub duration_matches_61_plus: usize,

    pub elapsed_seconds: f64,
}

impl MatchingStats {
    /// Calculate match rate as a percentage of catalog records
    pub fn match_rate(&self) -> f64 {
        if self.catalog_records == 0 {
            0.0
        } else {
            100.0 * self.matches as f64 / self.catalog_records as f64
        }
    }

    pub fn record_failure(&mut self, reason: &FailureReason) {
        match reason {
            FailureReason::NoVideoCandidates => self.no_candidates += 1,
            FailureReason::BelowThreshold { .. } => self.below_threshold += 1,
            FailureReason::DuplicateIdentifier => self.duplicate_ids += 1,
            FailureReason::Outbid { .. } => self.outbid += 1,
        }
    }

    /// Record duration bucket for an accepted match
    pub fn record_duration_bucket(&mut self, diff_sec: u32) {
        match diff_sec {
            0..=5 => self.duration_matches_0_to_5 += 1,
            6..=15 => self.duration_matches_6_to_15 += 1,
            16..=30 => self.duration_matches_16_to_30 += 1,
            31..=60 => self.duration_matches_31_to_60 += 1,
            _ => self.duration_matches_61_plus += 1,
        }
    }

    /// Emit stats as a structured event
    pub fn log_phase(&self, phase: &str) {
        if let Ok(json) = serde_json::to_string(self) {
            tracing::info!(phase, match_rate = self.match_rate(), stats = %json, "matching stats");
        }
    }

    /// Write stats to a JSON file
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write stats to {}", path.display()))?;
        Ok(())
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Read a JSON array of records (catalog or video) from disk.
pub fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}
