//! One-to-one assignment of catalog records to video records.
//!
//! The pairwise score matrix is computed in parallel (one rayon task per
//! catalog record); assignment itself is sequential and deterministic.
//!
//! ## Strategies
//!
//! - `Greedy` (default): catalog records are visited in input order and each
//!   takes its best still-unclaimed video. Order dependent: an early, weaker
//!   record can claim a video that a later record matches better.
//! - `Optimal`: maximum-weight bipartite matching over the score matrix,
//!   restricted to pairs at or above the threshold.

use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use crate::assignment::max_weight_assignment;
use crate::models::{
    CatalogRecord, FailureReason, MatchReport, MatchResult, MatchingStats, UnmatchedRecord,
    VideoRecord,
};
use crate::scoring::{EvidencePenalty, Scorer};

/// Minimum confidence to accept a match
pub const DEFAULT_THRESHOLD: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStrategy {
    #[default]
    Greedy,
    Optimal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatcherConfig {
    pub threshold: f64,
    pub strategy: AssignmentStrategy,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            strategy: AssignmentStrategy::Greedy,
        }
    }
}

/// Per-catalog-record outcome, in catalog input order.
#[derive(Debug, Clone, PartialEq)]
enum Decision {
    Matched { video: usize, confidence: f64 },
    Unmatched(FailureReason),
}

#[derive(Debug, Clone, Default)]
pub struct Matcher {
    scorer: Scorer,
    config: MatcherConfig,
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MatcherConfig) -> Self {
        Self {
            scorer: Scorer::default(),
            config,
        }
    }

    pub fn with_scorer(scorer: Scorer, config: MatcherConfig) -> Self {
        Self { scorer, config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Link `catalog` against `videos` and report matches, failures and stats.
    pub fn run(&self, catalog: &[CatalogRecord], videos: &[VideoRecord]) -> MatchReport {
        let start = Instant::now();
        let mut stats = MatchingStats {
            catalog_records: catalog.len(),
            video_records: videos.len(),
            ..Default::default()
        };

        let (matrix, tallies) = self.confidence_matrix(catalog, videos);
        for tally in &tallies {
            stats.pairs_scored += tally.scored;
            stats.pairs_heavy_penalty += tally.heavy;
            stats.pairs_moderate_penalty += tally.moderate;
        }

        let decisions = match self.config.strategy {
            AssignmentStrategy::Greedy => self.assign_greedy(catalog, videos, &matrix),
            AssignmentStrategy::Optimal => self.assign_optimal(catalog, videos, &matrix),
        };

        let mut matches = Vec::new();
        let mut unmatched = Vec::new();
        for (record, decision) in catalog.iter().zip(decisions) {
            match decision {
                Decision::Matched { video, confidence } => {
                    let video = &videos[video];
                    debug!(
                        catalog_id = %record.id,
                        video_id = %video.id,
                        confidence,
                        "matched"
                    );
                    stats.matches += 1;
                    stats.record_duration_bucket(record.duration_sec.abs_diff(video.duration_sec));
                    matches.push(MatchResult::new(record, video, confidence));
                }
                Decision::Unmatched(reason) => {
                    debug!(catalog_id = %record.id, reason = reason.label(), "unmatched");
                    stats.record_failure(&reason);
                    unmatched.push(UnmatchedRecord {
                        catalog_id: record.id.clone(),
                        reason,
                    });
                }
            }
        }

        // Stable: equal confidences keep emission order
        matches.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        stats.elapsed_seconds = start.elapsed().as_secs_f64();
        info!(
            strategy = ?self.config.strategy,
            threshold = self.config.threshold,
            catalog = stats.catalog_records,
            videos = stats.video_records,
            matches = stats.matches,
            "matching complete"
        );

        MatchReport {
            matches,
            unmatched,
            stats,
        }
    }

    /// `matrix[i][j]` is the confidence of catalog record `i` against video
    /// `j`. Only confidences are kept; the score breakdown is folded into a
    /// per-row penalty tally as each pair is scored.
    fn confidence_matrix(
        &self,
        catalog: &[CatalogRecord],
        videos: &[VideoRecord],
    ) -> (Vec<Vec<f64>>, Vec<PenaltyTally>) {
        catalog
            .par_iter()
            .map(|record| {
                let mut tally = PenaltyTally::default();
                let row = videos
                    .iter()
                    .map(|video| {
                        let score = self.scorer.score_pair(record, video);
                        tally.add(score.penalty);
                        score.confidence
                    })
                    .collect();
                (row, tally)
            })
            .unzip()
    }

    fn assign_greedy(
        &self,
        catalog: &[CatalogRecord],
        videos: &[VideoRecord],
        matrix: &[Vec<f64>],
    ) -> Vec<Decision> {
        let threshold = self.config.threshold;
        let mut used_catalog: FxHashSet<&str> = FxHashSet::default();
        let mut used_videos: FxHashSet<&str> = FxHashSet::default();
        let mut decisions = Vec::with_capacity(catalog.len());

        for (i, record) in catalog.iter().enumerate() {
            if used_catalog.contains(record.id.as_str()) {
                decisions.push(Decision::Unmatched(FailureReason::DuplicateIdentifier));
                continue;
            }

            let mut candidate_count = 0;
            let mut best: Option<(usize, f64)> = None;
            for (j, video) in videos.iter().enumerate() {
                if used_videos.contains(video.id.as_str()) {
                    continue;
                }
                candidate_count += 1;
                let score = matrix[i][j];
                // Strictly greater: the first maximum wins
                if best.map_or(true, |(_, best_score)| score > best_score) {
                    best = Some((j, score));
                }
            }

            let decision = match best {
                None => Decision::Unmatched(FailureReason::NoVideoCandidates),
                Some((j, score)) if score >= threshold => {
                    used_catalog.insert(record.id.as_str());
                    used_videos.insert(videos[j].id.as_str());
                    Decision::Matched {
                        video: j,
                        confidence: score,
                    }
                }
                Some((_, score)) => Decision::Unmatched(FailureReason::BelowThreshold {
                    candidate_count,
                    best_score: score,
                    threshold,
                }),
            };
            decisions.push(decision);
        }

        decisions
    }

    /// Identifiers are deduplicated up front (first occurrence wins) so the
    /// solver cannot hand the same identifier out twice.
    fn assign_optimal(
        &self,
        catalog: &[CatalogRecord],
        videos: &[VideoRecord],
        matrix: &[Vec<f64>],
    ) -> Vec<Decision> {
        let threshold = self.config.threshold;
        let rows = first_occurrences(catalog.iter().map(|c| c.id.as_str()));
        let cols = first_occurrences(videos.iter().map(|v| v.id.as_str()));

        // Below-threshold pairs carry no weight, so they never displace a valid pair
        let weights: Vec<Vec<f64>> = rows
            .iter()
            .map(|&i| {
                cols.iter()
                    .map(|&j| {
                        let score = matrix[i][j];
                        if score >= threshold {
                            score
                        } else {
                            0.0
                        }
                    })
                    .collect()
            })
            .collect();
        let assignment = max_weight_assignment(&weights);

        let mut decisions =
            vec![Decision::Unmatched(FailureReason::DuplicateIdentifier); catalog.len()];
        for (r, &i) in rows.iter().enumerate() {
            if cols.is_empty() {
                decisions[i] = Decision::Unmatched(FailureReason::NoVideoCandidates);
                continue;
            }

            if let Some(c) = assignment[r] {
                let j = cols[c];
                let score = matrix[i][j];
                if score >= threshold {
                    decisions[i] = Decision::Matched {
                        video: j,
                        confidence: score,
                    };
                    continue;
                }
            }

            let best_score = cols
                .iter()
                .map(|&j| matrix[i][j])
                .fold(f64::NEG_INFINITY, f64::max);
            decisions[i] = if best_score >= threshold {
                Decision::Unmatched(FailureReason::Outbid { best_score })
            } else {
                Decision::Unmatched(FailureReason::BelowThreshold {
                    candidate_count: cols.len(),
                    best_score,
                    threshold,
                })
            };
        }

        decisions
    }
}

/// Pair and penalty counts for one row of the confidence matrix.
#[derive(Debug, Clone, Copy, Default)]
struct PenaltyTally {
    scored: usize,
    heavy: usize,
    moderate: usize,
}

impl PenaltyTally {
    fn add(&mut self, penalty: EvidencePenalty) {
        self.scored += 1;
        match penalty {
            EvidencePenalty::Heavy => self.heavy += 1,
            EvidencePenalty::Moderate => self.moderate += 1,
            EvidencePenalty::None => {}
        }
    }
}

/// Indices of the first occurrence of each identifier, in input order.
fn first_occurrences<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<usize> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    ids.enumerate()
        .filter(|(_, id)| seen.insert(*id))
        .map(|(index, _)| index)
        .collect()
}

/// Greedy matching with the default scorer. Sorted by confidence, highest first.
pub fn find_best_matches(
    catalog: &[CatalogRecord],
    videos: &[VideoRecord],
    threshold: f64,
) -> Vec<MatchResult> {
    Matcher::with_config(MatcherConfig {
        threshold,
        strategy: AssignmentStrategy::Greedy,
    })
    .run(catalog, videos)
    .matches
}
