// placetag: hashtag-driven place recommendations
//
// This is the library root. The pure core (codec, spatial filter, hashtag
// aggregation, similarity ranking) sits beside the store, the service that
// wires them together, and the thin CLI/web surfaces.

pub mod config;
pub mod db;
pub mod embeddings;
pub mod error;
pub mod hashtags;
pub mod output;
pub mod pipeline;
pub mod ranking;
pub mod service;
pub mod session;
pub mod spatial;
pub mod status;

#[cfg(feature = "web")]
pub mod web;
