// Similarity ranking: one parametrized ranker for every recommendation flow.

pub mod config;
pub mod ranker;
