// Spatial filter: viewport parsing and the point-in-rectangle predicate.
//
// Clients send bounds either as numbers or as numeric strings (map SDKs
// serialize them both ways). A bound that isn't a finite number is rejected
// as bad input rather than quietly turned into an empty result. That
// includes nulls, booleans, arrays and missing bounds, which deserialize
// fine and fail in `parse`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::db::models::PlaceSummary;
use crate::error::{RecommendError, Result};

/// One raw viewport bound as it arrives from a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ViewportBound {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl Default for ViewportBound {
    fn default() -> Self {
        ViewportBound::Other(serde_json::Value::Null)
    }
}

impl From<f64> for ViewportBound {
    fn from(value: f64) -> Self {
        ViewportBound::Number(value)
    }
}

impl From<&str> for ViewportBound {
    fn from(value: &str) -> Self {
        ViewportBound::Text(value.to_string())
    }
}

impl ViewportBound {
    fn parse(&self, field: &'static str) -> Result<f64> {
        let value = match self {
            ViewportBound::Number(n) => Some(*n),
            ViewportBound::Text(s) => s.trim().parse::<f64>().ok(),
            ViewportBound::Other(_) => None,
        };
        match value {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(RecommendError::InvalidViewportBound {
                field,
                value: match self {
                    ViewportBound::Number(n) => n.to_string(),
                    ViewportBound::Text(s) => s.clone(),
                    ViewportBound::Other(v) => v.to_string(),
                },
            }),
        }
    }
}

/// Unvalidated viewport, straight from a request body or CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportInput {
    #[serde(default)]
    pub min_x: ViewportBound,
    #[serde(default)]
    pub min_y: ViewportBound,
    #[serde(default)]
    pub max_x: ViewportBound,
    #[serde(default)]
    pub max_y: ViewportBound,
}

impl ViewportInput {
    /// Validate every bound. The first non-numeric bound is reported.
    pub fn parse(&self) -> Result<Viewport> {
        Ok(Viewport {
            min_x: self.min_x.parse("min_x")?,
            min_y: self.min_y.parse("min_y")?,
            max_x: self.max_x.parse("max_x")?,
            max_y: self.max_y.parse("max_y")?,
        })
    }
}

/// Axis-aligned rectangle in map coordinates. Both edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Viewport {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Inverted rectangles (min > max) contain nothing.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        inside(self, x, y)
    }
}

/// `min_x ≤ x ≤ max_x && min_y ≤ y ≤ max_y`
pub fn inside(viewport: &Viewport, x: f64, y: f64) -> bool {
    viewport.min_x <= x && x <= viewport.max_x && viewport.min_y <= y && y <= viewport.max_y
}

/// Places that passed the spatial filter, keyed and ordered by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateSet {
    places: BTreeMap<i64, PlaceSummary>,
}

impl CandidateSet {
    pub fn from_places(viewport: &Viewport, places: impl IntoIterator<Item = PlaceSummary>) -> Self {
        let places = places
            .into_iter()
            .filter(|p| viewport.contains(p.x, p.y))
            .map(|p| (p.id, p))
            .collect();
        Self { places }
    }

    pub fn ids(&self) -> Vec<i64> {
        self.places.keys().copied().collect()
    }

    pub fn contains(&self, place_id: i64) -> bool {
        self.places.contains_key(&place_id)
    }

    pub fn get(&self, place_id: i64) -> Option<&PlaceSummary> {
        self.places.get(&place_id)
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn places(&self) -> impl Iterator<Item = &PlaceSummary> {
        self.places.values()
    }
}
