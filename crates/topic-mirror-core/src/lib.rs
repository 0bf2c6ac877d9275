//! Core types and snapshot handling for the broker topic mirror.
//!
//! This crate provides:
//! - The topic tree model (`TopicNode`, `NodeMeta`)
//! - Raw snapshot decoding and the tree builder
//! - Payload rendering helpers (preview shortening, JSON pretty-printing)
//! - Configuration and common error types

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod model;
pub mod payload;
pub mod snapshot;
pub mod tree;

// Re-export key types for convenience
pub use config::MirrorConfig;
pub use error::{Error, Result};
pub use model::{NodeMeta, TopicNode};
pub use snapshot::{RESERVED_PREFIX, RawLevel, WRAPPER_KEY};
pub use tree::{ROOT_ID, ROOT_NAME, build_tree, build_tree_with_root};
