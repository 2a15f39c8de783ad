//! Similarity ranking for cadenza.
//!
//! Holds the precomputed similarity artifacts in memory and ranks every
//! song in the catalog against a query song.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod matrix;
pub mod ranker;

pub use matrix::{DenseSimilarity, SimilarityArtifact, SimilaritySource, TfidfMatrix};
pub use ranker::{Recommendation, Recommender};
