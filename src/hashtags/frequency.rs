// Hashtag frequency aggregation over the places in a viewport.
//
// Two policies are kept side by side because callers genuinely want both:
// a plain unique set (chip pickers that sort client-side) and a frequency
// ranking (tag clouds). Ranking ties go to ascending text so the same
// viewport always renders the same list.
//
// Stored hashtag values come in two shapes. Most rows hold one tag each,
// but older imports packed several `#token`s into one free-text value;
// `Decomposition::HashTokens` splits those apart.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// `#` followed by word characters (Unicode-aware, so `#제주바다` matches).
static HASH_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\w+").expect("static regex"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AggregationMode {
    UniqueSet,
    #[default]
    FrequencyRanked,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Decomposition {
    /// Each stored value is one tag.
    #[default]
    WholeText,
    /// Each stored value is free text; every `#token` in it is a tag.
    HashTokens,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashtagSummary {
    /// No ordering guarantee.
    Unique(HashSet<String>),
    /// Count descending, then text ascending.
    Ranked(Vec<TagCount>),
}

impl HashtagSummary {
    /// Tag texts in the summary's own order.
    pub fn tags(&self) -> Vec<String> {
        match self {
            HashtagSummary::Unique(set) => set.iter().cloned().collect(),
            HashtagSummary::Ranked(counts) => counts.iter().map(|c| c.tag.clone()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            HashtagSummary::Unique(set) => set.len(),
            HashtagSummary::Ranked(counts) => counts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// All `#token` markers in a free-text value, in order of appearance.
pub fn extract_hash_tokens(text: &str) -> impl Iterator<Item = &str> {
    HASH_TOKEN.find_iter(text).map(|m| m.as_str())
}

/// Split one stored value into the tags it contributes.
pub fn decompose(text: &str, decomposition: Decomposition) -> Vec<&str> {
    match decomposition {
        Decomposition::WholeText => {
            let tag = text.trim();
            if tag.is_empty() {
                Vec::new()
            } else {
                vec![tag]
            }
        }
        Decomposition::HashTokens => extract_hash_tokens(text).collect(),
    }
}

/// Aggregate stored hashtag values under the chosen policy.
pub fn aggregate<'a, I>(values: I, mode: AggregationMode, decomposition: Decomposition) -> HashtagSummary
where
    I: IntoIterator<Item = &'a str>,
{
    let tags = values
        .into_iter()
        .flat_map(|value| decompose(value, decomposition));

    match mode {
        AggregationMode::UniqueSet => {
            HashtagSummary::Unique(tags.map(str::to_string).collect())
        }
        AggregationMode::FrequencyRanked => {
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for tag in tags {
                *counts.entry(tag).or_default() += 1;
            }
            let mut ranked: Vec<TagCount> = counts
                .into_iter()
                .map(|(tag, count)| TagCount {
                    tag: tag.to_string(),
                    count,
                })
                .collect();
            ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
            HashtagSummary::Ranked(ranked)
        }
    }
}
