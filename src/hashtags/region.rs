// Region hashtag resolution.
//
// Locality names map to integer region codes through a fixed table; places
// carry the code in their `region_code` column. For a region we union the
// hashtags of every place carrying its code, regardless of category.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::db::models::RegionHashtagRow;
use crate::error::{RecommendError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionCode(pub u16);

impl std::fmt::Display for RegionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lowercase aliases → region code.
const REGION_ALIASES: &[(&str, u16)] = &[
    ("서울", 1),
    ("seoul", 1),
    ("경기/인천", 2),
    ("경기", 2),
    ("인천", 2),
    ("gyeonggi", 2),
    ("incheon", 2),
    ("충청", 3),
    ("chungcheong", 3),
    ("강원", 4),
    ("gangwon", 4),
    ("경상", 5),
    ("gyeongsang", 5),
    ("전라", 6),
    ("jeolla", 6),
    ("제주", 7),
    ("제주도", 7),
    ("jeju", 7),
    ("부산", 8),
    ("busan", 8),
    ("대구", 9),
    ("daegu", 9),
    ("광주", 10),
    ("gwangju", 10),
    ("대전", 11),
    ("daejeon", 11),
    ("세종", 12),
    ("sejong", 12),
];

/// Resolve a locality name. Unknown names are bad input and echo the name.
pub fn resolve_region_code(name: &str) -> Result<RegionCode> {
    let needle = name.trim().to_lowercase();
    REGION_ALIASES
        .iter()
        .find(|(alias, _)| *alias == needle)
        .map(|(_, code)| RegionCode(*code))
        .ok_or_else(|| RecommendError::UnknownRegion(name.to_string()))
}

/// Union hashtag texts across categories, sorted and without blanks.
pub fn union_region_hashtags(rows: &[RegionHashtagRow]) -> Vec<String> {
    rows.iter()
        .map(|row| row.text.trim())
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
