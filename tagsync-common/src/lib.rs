//! # tagsync Common Library
//!
//! Shared code for the tagsync crates including:
//! - Catalog models and the tracked-file host record
//! - Event types (TagSyncEvent enum) and the EventBus
//! - Configuration loading (TOML bootstrap, tag write policy)
//! - Error types

pub mod config;
pub mod error;
pub mod events;
pub mod models;

pub use config::{ScrubCategory, TagConfig, WriteMode};
pub use error::{Error, Result};
pub use events::{EventBus, TagSyncEvent};
