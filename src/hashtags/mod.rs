// Hashtag aggregation: viewport frequency counts and region unions.

pub mod frequency;
pub mod region;
