//! Hot-swappable table handle
//!
//! Readers take an `Arc` snapshot and keep it for the duration of a query;
//! a reload swaps in a whole new table and never touches the old one.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::query::QueryEngine;
use crate::table::VectorTable;

/// Installed table and the generation it was installed as
#[derive(Debug)]
struct Installed {
    table: Arc<VectorTable>,
    generation: u64,
}

/// Shared, atomically replaceable reference to the current table
#[derive(Debug)]
pub struct SharedTable {
    current: RwLock<Installed>,
}

impl SharedTable {
    pub fn new(table: VectorTable) -> Self {
        Self::from_arc(Arc::new(table))
    }

    pub fn from_arc(table: Arc<VectorTable>) -> Self {
        Self {
            current: RwLock::new(Installed {
                table,
                generation: 1,
            }),
        }
    }

    /// Current table; stays valid even if a reload happens afterwards
    pub fn snapshot(&self) -> Arc<VectorTable> {
        Arc::clone(&self.current.read().table)
    }

    /// Current table together with its generation, read under one lock
    pub fn versioned_snapshot(&self) -> (Arc<VectorTable>, u64) {
        let current = self.current.read();
        (Arc::clone(&current.table), current.generation)
    }

    /// Query engine bound to the current snapshot
    pub fn engine(&self) -> QueryEngine {
        QueryEngine::new(self.snapshot())
    }

    /// Swap in a new table, returning the previous one
    pub fn replace(&self, table: VectorTable) -> Arc<VectorTable> {
        let entries = table.len();
        let next = Arc::new(table);
        let (previous, generation) = {
            let mut current = self.current.write();
            current.generation += 1;
            (
                std::mem::replace(&mut current.table, next),
                current.generation,
            )
        };
        log::info!(
            "Swapped vector table (generation {}, {} -> {} entries)",
            generation,
            previous.len(),
            entries
        );
        previous
    }

    /// Number of tables installed so far, starting at 1
    pub fn generation(&self) -> u64 {
        self.current.read().generation
    }
}
