//! wordvec query server
//!
//! Command line front end and JSON-lines query server over a
//! [`wordvec_core`] vector table, with optional hot reload when the table
//! file changes.

pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod rpc;
pub mod watcher;

pub use backend::QueryBackend;
pub use cli::{Cli, Command};
pub use config::TableConfig;
pub use error::{ServerError, ServerResult};
pub use watcher::TableWatcher;
