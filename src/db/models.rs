// Data models: Rust structs that map to database rows.
//
// These are the types that flow through the application. They're separate
// from the database queries so other modules can use them without depending
// on rusqlite directly.

use serde::{Deserialize, Serialize};

/// Place categories. Every place belongs to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Cafe,
    Hotel,
    Restaurant,
    TourSite,
    TransportNode,
}

/// Case/language variants accepted for each category. Lookup lowercases and
/// trims the input first, so entries here are lowercase.
const CATEGORY_ALIASES: &[(&str, Category)] = &[
    ("cafe", Category::Cafe),
    ("café", Category::Cafe),
    ("coffee", Category::Cafe),
    ("카페", Category::Cafe),
    ("hotel", Category::Hotel),
    ("accommodation", Category::Hotel),
    ("lodging", Category::Hotel),
    ("숙박", Category::Hotel),
    ("호텔", Category::Hotel),
    ("restaurant", Category::Restaurant),
    ("food", Category::Restaurant),
    ("음식점", Category::Restaurant),
    ("맛집", Category::Restaurant),
    ("tour", Category::TourSite),
    ("tourist", Category::TourSite),
    ("tourism", Category::TourSite),
    ("tour-site", Category::TourSite),
    ("landmark", Category::TourSite),
    ("관광지", Category::TourSite),
    ("명소", Category::TourSite),
    ("transport", Category::TransportNode),
    ("transport-node", Category::TransportNode),
    ("transit", Category::TransportNode),
    ("교통", Category::TransportNode),
];

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Cafe,
        Category::Hotel,
        Category::Restaurant,
        Category::TourSite,
        Category::TransportNode,
    ];

    /// Resolve a user-supplied category name through the alias table.
    pub fn parse(name: &str) -> Option<Self> {
        let needle = name.trim().to_lowercase();
        CATEGORY_ALIASES
            .iter()
            .find(|(alias, _)| *alias == needle)
            .map(|(_, category)| *category)
    }

    /// Canonical name, also the value stored in the `places.category` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Cafe => "cafe",
            Category::Hotel => "hotel",
            Category::Restaurant => "restaurant",
            Category::TourSite => "tour-site",
            Category::TransportNode => "transport-node",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stored embedding before decoding. Rows may hold a JSON array, loose
/// text, an already-materialized sequence, or nothing at all.
#[derive(Debug, Clone, PartialEq)]
pub enum RawEmbedding {
    Null,
    Text(String),
    Json(serde_json::Value),
    Values(Vec<f64>),
}

/// Full place record, used for display attributes and detail lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: i64,
    pub name: String,
    pub category: Category,
    pub x: f64,
    pub y: f64,
    pub address: Option<String>,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    /// Raw image reference column (JSON list, legacy concatenation, or CSV)
    pub image_url: Option<String>,
    pub region_code: Option<u16>,
}

/// The slim projection returned by viewport queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceSummary {
    pub id: i64,
    pub name: String,
    pub x: f64,
    pub y: f64,
}

impl From<&Place> for PlaceSummary {
    fn from(place: &Place) -> Self {
        Self {
            id: place.id,
            name: place.name.clone(),
            x: place.x,
            y: place.y,
        }
    }
}

/// A hashtag with its undecoded embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct HashtagRecord {
    pub id: i64,
    pub text: String,
    pub embedding: RawEmbedding,
}

/// One place ↔ hashtag link joined to the hashtag's text and embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceHashtagRow {
    pub place_id: i64,
    pub hashtag_id: i64,
    pub text: String,
    pub embedding: RawEmbedding,
}

/// A hashtag attached to some place in a region, tagged with that place's category.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionHashtagRow {
    pub category: Category,
    pub text: String,
}

/// Row counts for the status display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub places: i64,
    pub hashtags: i64,
    pub links: i64,
}

/// Import file layout: `{ "hashtags": [...], "places": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub hashtags: Vec<HashtagSeed>,
    #[serde(default)]
    pub places: Vec<PlaceSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashtagSeed {
    pub text: String,
    /// Stored verbatim; decoding happens at query time so bad rows survive import.
    #[serde(default)]
    pub embedding: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceSeed {
    pub name: String,
    pub category: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub open_time: Option<String>,
    #[serde(default)]
    pub close_time: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub region_code: Option<u16>,
    /// Hashtag texts to link; unknown texts are created without an embedding.
    #[serde(default)]
    pub hashtags: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_aliases_are_case_insensitive() {
        assert_eq!(Category::parse("CAFE"), Some(Category::Cafe));
        assert_eq!(Category::parse("  Accommodation "), Some(Category::Hotel));
        assert_eq!(Category::parse("tourist"), Some(Category::TourSite));
        assert_eq!(Category::parse("카페"), Some(Category::Cafe));
    }

    #[test]
    fn test_category_unknown() {
        assert_eq!(Category::parse("nightclub"), None);
        assert_eq!(Category::parse(""), None);
    }

    #[test]
    fn test_canonical_names_round_trip_through_aliases() {
        for category in Category::ALL {
            assert_eq!(Category::parse(category.as_str()), Some(category));
        }
    }

    #[test]
    fn test_category_serde_matches_as_str() {
        let json = serde_json::to_string(&Category::TourSite).unwrap();
        assert_eq!(json, "\"tour-site\"");
    }

    #[test]
    fn test_alias_table_is_lowercase() {
        for (alias, _) in CATEGORY_ALIASES {
            assert_eq!(*alias, alias.to_lowercase());
        }
    }
}
