//! wordvec core
//!
//! Immutable word-vector tables and the nearest-neighbor query engine that
//! reads them.
//!
//! ## Features
//!
//! - **Immutable tables** - validated once at build time, shared via `Arc`
//! - **Similarity queries** - cosine similarity, analogy-style `most_similar`,
//!   odd-one-out detection and membership checks
//! - **Hot reload** - `SharedTable` swaps whole tables atomically
//! - **Persistence** - word2vec text format and versioned binary snapshots
//!
//! ## Example
//!
//! ```ignore
//! use wordvec_core::{provider, NeighborQuery, SharedTable};
//!
//! let table = provider::load_text(&path, &provider::LoadOptions::default())?;
//! let shared = SharedTable::new(table);
//! let engine = shared.engine();
//!
//! if engine.contains("king") {
//!     let query = NeighborQuery::positive(["king", "woman"]).negative(["man"]).top_n(5);
//!     for neighbor in engine.most_similar(&query)? {
//!         println!("{} {:.3}", neighbor.token, neighbor.score);
//!     }
//! }
//! ```

pub mod error;
pub mod provider;
pub mod query;
pub mod shared;
pub mod table;
pub mod vector;

// Re-exports for convenience
pub use error::{Result, VectorError};
pub use provider::{LoadOptions, TableProvider};
pub use query::{Neighbor, NeighborQuery, QueryEngine, DEFAULT_TOP_N};
pub use shared::SharedTable;
pub use table::{TableMetadata, VectorTable, VectorTableBuilder, VocabularyEntry};
