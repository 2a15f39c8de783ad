//! Core domain model for cadenza.
//!
//! This crate defines the song model, the CSV dataset loader, the
//! title-to-row index table, and the JSON artifact I/O shared by the
//! builder and the recommender.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod artifact;
pub mod catalog;
pub mod error;
pub mod index;
pub mod model;

pub use catalog::{Catalog, ColumnNames};
pub use error::{Error, Result};
pub use index::IndexTable;
pub use model::Song;
