//! Storage: connection setup, schema migrations and per-entity queries

pub mod archetypes;
pub mod characters;
pub mod dock;
pub mod ingredients;
pub mod init;
pub mod jobs;
pub mod media;
pub mod migrations;
pub mod output_types;
pub mod projects;
pub mod prompts;
pub mod tables;
pub mod top_layer;

pub use init::*;
pub use migrations::{get_schema_version, run_migrations, CURRENT_SCHEMA_VERSION};
