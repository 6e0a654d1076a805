//! Error types for wordvec-core

use thiserror::Error;

/// Errors that can occur while building, loading or querying a vector table
#[derive(Debug, Error)]
pub enum VectorError {
    /// One or more query tokens are not in the vocabulary
    #[error("Unknown token(s): {}", .0.join(", "))]
    UnknownToken(Vec<String>),

    /// Malformed call (empty positive list, too few tokens, zero top_n, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A table construction invariant was violated
    #[error("Invalid table: {0}")]
    InvalidTable(String),

    /// Malformed persisted table text
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Serialization error (bincode)
    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Table file not found
    #[error("Table not found: {0}")]
    NotFound(String),

    /// Invalid path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VectorError {
    /// Create an unknown-token error, dropping repeated tokens but keeping input order
    pub fn unknown_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut missing: Vec<String> = Vec::new();
        for token in tokens {
            let token = token.into();
            if !missing.contains(&token) {
                missing.push(token);
            }
        }
        Self::UnknownToken(missing)
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create an invalid table error
    pub fn invalid_table(msg: impl Into<String>) -> Self {
        Self::InvalidTable(msg.into())
    }

    /// Create a parse error for a 1-based line number
    pub fn parse(line: usize, msg: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: msg.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create an invalid path error
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    /// Tokens carried by an [`VectorError::UnknownToken`], empty otherwise
    pub fn missing_tokens(&self) -> &[String] {
        match self {
            Self::UnknownToken(tokens) => tokens,
            _ => &[],
        }
    }

    /// Whether the error is a caller-correctable query precondition failure
    pub fn is_query_error(&self) -> bool {
        matches!(self, Self::UnknownToken(_) | Self::InvalidArgument(_))
    }
}

/// Result type for table and query operations
pub type Result<T> = std::result::Result<T, VectorError>;
