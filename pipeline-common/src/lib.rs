//! # Pipeline Common Library
//!
//! Shared code for the render pipeline tracker including:
//! - Database schema, migrations and per-entity queries
//! - Status enumerations and row models
//! - Combinatorial statistics and the random combo picker
//! - Auto-title/tag derivation and top-layer metadata aggregation
//! - Full-database export and import
//! - Configuration loading

pub mod aggregate;
pub mod combo;
pub mod config;
pub mod db;
pub mod derive;
pub mod error;
pub mod models;
pub mod stats;
pub mod transfer;

pub use error::{Error, Result};
