//! Catalog ↔ video record linkage: normalization, scoring and 1:1 matching.

pub mod assignment;
pub mod matcher;
pub mod models;
pub mod normalize;
pub mod progress;
pub mod safety;
pub mod scoring;

pub use matcher::{find_best_matches, AssignmentStrategy, Matcher, MatcherConfig, DEFAULT_THRESHOLD};
pub use models::{CatalogRecord, MatchReport, MatchResult, PrimarySource, VideoRecord};
pub use normalize::Normalizer;
pub use scoring::{ScoreWeights, Scorer};
