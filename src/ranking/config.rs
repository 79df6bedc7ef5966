// Ranking knobs. One ranker covers every recommendation flow; the flows
// differ only in these settings.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default K for tag-driven recommendation.
pub const DEFAULT_TOP_K: usize = 5;
/// Upper bound for K on broad category-wide ranking.
pub const DEFAULT_MAX_TOP_K: usize = 100;

/// How the selected hashtags' embeddings become queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryMode {
    /// Each selected tag is its own query; a place keeps its best match.
    #[default]
    PerTag,
    /// The selected tags are averaged into a single query.
    Averaged,
}

impl FromStr for QueryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "per-tag" | "pertag" | "per_tag" => Ok(QueryMode::PerTag),
            "averaged" | "average" | "mean" => Ok(QueryMode::Averaged),
            other => Err(format!("unknown query mode: {other}")),
        }
    }
}

/// What to do when a query and a candidate vector differ in length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DimensionPolicy {
    /// Compare on the shared leading dimension.
    #[default]
    TruncateToShared,
    /// Ignore the mismatched candidate row for that query.
    SkipMismatched,
}

impl FromStr for DimensionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "truncate" | "truncate-to-shared" => Ok(DimensionPolicy::TruncateToShared),
            "skip" | "skip-mismatched" => Ok(DimensionPolicy::SkipMismatched),
            other => Err(format!("unknown dimension policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankConfig {
    pub top_k: usize,
    pub query_mode: QueryMode,
    pub dimension_policy: DimensionPolicy,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            query_mode: QueryMode::PerTag,
            dimension_policy: DimensionPolicy::TruncateToShared,
        }
    }
}

impl RankConfig {
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_query_mode(mut self, query_mode: QueryMode) -> Self {
        self.query_mode = query_mode;
        self
    }

    pub fn with_dimension_policy(mut self, dimension_policy: DimensionPolicy) -> Self {
        self.dimension_policy = dimension_policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_mode_from_str() {
        assert_eq!("averaged".parse::<QueryMode>(), Ok(QueryMode::Averaged));
        assert_eq!("Per-Tag".parse::<QueryMode>(), Ok(QueryMode::PerTag));
        assert!("median".parse::<QueryMode>().is_err());
    }

    #[test]
    fn test_dimension_policy_from_str() {
        assert_eq!(
            "skip".parse::<DimensionPolicy>(),
            Ok(DimensionPolicy::SkipMismatched)
        );
        assert_eq!(
            "truncate".parse::<DimensionPolicy>(),
            Ok(DimensionPolicy::TruncateToShared)
        );
    }

    #[test]
    fn test_defaults() {
        let config = RankConfig::default();
        assert_eq!(config.top_k, 5);
        assert_eq!(config.query_mode, QueryMode::PerTag);
        assert_eq!(config.dimension_policy, DimensionPolicy::TruncateToShared);
    }
}
