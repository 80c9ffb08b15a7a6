//! Core traits and types for ragserve
//!
//! This crate defines the fundamental traits and types used across the
//! ragserve system: the error taxonomy, the vector-store and embedder
//! capability interfaces, and the tool registry the agent dispatches
//! through. Everything here is implementation-agnostic so the concrete
//! backends stay swappable and test-friendly.

pub mod embedder;
pub mod error;
pub mod tool;
pub mod vector_store;

pub use embedder::Embedder;
pub use error::{Error, Result};
pub use tool::{Tool, ToolRegistry, ToolSchema};
pub use vector_store::{
    DistanceMetric, Metadata, QueryHit, VectorStore, normalize_batch,
};
