//! Configuration and artifact pipeline for cadenza.
//!
//! Loads layered configuration, builds the TF-IDF index and similarity
//! artifacts from the song dataset, and assembles a ready-to-query
//! [`Recommender`](cadenza_search::Recommender) from them.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod build;
pub mod config;
pub mod load;
pub mod vectorize;

pub use build::{build_artifacts, BuildOptions, BuildReport};
pub use config::{Config, RecommendationLimits};
pub use load::load_recommender;
pub use vectorize::TfidfVectorizer;
