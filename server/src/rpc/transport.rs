//! Line-delimited JSON-RPC transport
//!
//! One request per input line, one response per output line. Stdio in
//! production; any async reader/writer pair in tests.

use super::protocol::{JsonRpcRequest, JsonRpcResponse};
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// What the next input line contained
#[derive(Debug)]
pub enum Incoming {
    Request(JsonRpcRequest),
    /// Blank line, skipped
    Empty,
    /// Line that is not valid JSON
    Malformed(String),
    /// Valid JSON that is not a request; carries the id when one was readable
    Invalid {
        id: Option<serde_json::Value>,
        message: String,
    },
    Eof,
}

/// Async line transport
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
}

impl LineTransport<BufReader<tokio::io::Stdin>, tokio::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Read the next request line
    pub async fn read_request(&mut self) -> io::Result<Incoming> {
        let mut line = String::new();
        let bytes_read = self.reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            return Ok(Incoming::Eof);
        }

        let line = line.trim();
        if line.is_empty() {
            return Ok(Incoming::Empty);
        }

        let value: serde_json::Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to parse JSON-RPC request: {}", e);
                return Ok(Incoming::Malformed(e.to_string()));
            }
        };

        let id = value.get("id").cloned();
        match serde_json::from_value(value) {
            Ok(request) => Ok(Incoming::Request(request)),
            Err(e) => {
                tracing::warn!("Invalid JSON-RPC request: {}", e);
                Ok(Incoming::Invalid {
                    id,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Write one response line
    pub async fn write_response(&mut self, response: &JsonRpcResponse) -> io::Result<()> {
        let json = serde_json::to_string(response)?;
        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }

    /// Give back the writer (tests inspect what was written)
    pub fn into_writer(self) -> W {
        self.writer
    }
}
