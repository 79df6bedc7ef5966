use std::env;

use anyhow::{Context, Result};

use crate::ranking::config::{
    DimensionPolicy, QueryMode, RankConfig, DEFAULT_MAX_TOP_K, DEFAULT_TOP_K,
};

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every
/// setting has a default, so an empty environment is a valid config.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: String,
    /// Default K for tag-driven ranking.
    pub top_k: usize,
    /// Caller-supplied K is clamped to this.
    pub max_top_k: usize,
    pub query_mode: QueryMode,
    pub dimension_policy: DimensionPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: "./placetag.db".to_string(),
            top_k: DEFAULT_TOP_K,
            max_top_k: DEFAULT_MAX_TOP_K,
            query_mode: QueryMode::default(),
            dimension_policy: DimensionPolicy::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Unset or blank values fall back to defaults;
    /// values that are set but unparseable are errors naming the variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let top_k = match get("PLACETAG_TOP_K") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .with_context(|| format!("PLACETAG_TOP_K is not a valid number: {v}"))?,
            None => defaults.top_k,
        };

        let max_top_k = match get("PLACETAG_MAX_TOP_K") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .with_context(|| format!("PLACETAG_MAX_TOP_K is not a valid number: {v}"))?,
            None => defaults.max_top_k,
        };

        let query_mode = match get("PLACETAG_QUERY_MODE") {
            Some(v) => v
                .parse::<QueryMode>()
                .map_err(|e| anyhow::anyhow!("PLACETAG_QUERY_MODE: {e}"))?,
            None => defaults.query_mode,
        };

        let dimension_policy = match get("PLACETAG_DIMENSION_POLICY") {
            Some(v) => v
                .parse::<DimensionPolicy>()
                .map_err(|e| anyhow::anyhow!("PLACETAG_DIMENSION_POLICY: {e}"))?,
            None => defaults.dimension_policy,
        };

        Ok(Self {
            db_path: get("PLACETAG_DB_PATH").unwrap_or(defaults.db_path),
            top_k,
            max_top_k,
            query_mode,
            dimension_policy,
        })
    }

    /// Ranking defaults derived from this config. The default K never
    /// exceeds the clamp.
    pub fn rank_config(&self) -> RankConfig {
        RankConfig::default()
            .with_top_k(self.top_k.min(self.max_top_k))
            .with_query_mode(self.query_mode)
            .with_dimension_policy(self.dimension_policy)
    }
}
