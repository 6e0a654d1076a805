//! JSON-lines query server
//!
//! ## Usage
//!
//! ```bash
//! wordvec --table models/vectors.txt serve --watch
//! ```
//!
//! Each stdin line is a JSON-RPC 2.0 request, each stdout line a response:
//!
//! ```text
//! {"jsonrpc":"2.0","id":1,"method":"most_similar","params":{"positive":["cat"],"topN":3}}
//! ```

pub mod protocol;
pub mod server;
pub mod transport;

pub use protocol::*;
pub use server::QueryServer;
pub use transport::{Incoming, LineTransport};
