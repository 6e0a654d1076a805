//! Immutable token → vector table
//!
//! A [`VectorTable`] is produced once by a [`VectorTableBuilder`] (usually
//! driven by a table provider) and never mutated afterwards. Unit-normalized
//! copies of every vector are computed at build time so queries never
//! renormalize vocabulary vectors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::{Result, VectorError};
use crate::vector::{norm, normalized};

/// One vocabulary token with its frequency count and vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    /// Case-normalized token, unique within a table
    pub token: String,
    /// Corpus frequency (>= 1), only used to decide inclusion
    pub count: u64,
    /// Raw vector, length equals the table dimension
    pub vector: Vec<f32>,
}

impl VocabularyEntry {
    pub fn new(token: impl Into<String>, count: u64, vector: Vec<f32>) -> Self {
        Self {
            token: token.into(),
            count,
            vector,
        }
    }
}

/// Provenance of a table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Minimum frequency an entry needed to be included
    pub min_count: u64,
    /// Where the table came from (file path, generator name, ...)
    pub source: Option<String>,
    /// When the table was built
    pub created_at: DateTime<Utc>,
}

/// Immutable vocabulary of fixed-dimension vectors
///
/// Entries keep insertion order; ranking ties are broken by it.
#[derive(Debug)]
pub struct VectorTable {
    entries: Vec<VocabularyEntry>,
    unit_vectors: Vec<Vec<f32>>,
    index: HashMap<String, usize>,
    dimension: usize,
    metadata: TableMetadata,
}

impl VectorTable {
    /// Start building a table
    pub fn builder() -> VectorTableBuilder {
        VectorTableBuilder::new()
    }

    /// Vector dimensionality shared by every entry
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of vocabulary entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a built table; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact-key membership check
    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    /// Insertion position of a token
    pub fn index_of(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    /// Entry for a token
    pub fn get(&self, token: &str) -> Option<&VocabularyEntry> {
        self.index_of(token).map(|i| &self.entries[i])
    }

    /// Raw vector for a token
    pub fn vector(&self, token: &str) -> Option<&[f32]> {
        self.get(token).map(|e| e.vector.as_slice())
    }

    /// Unit-normalized vector for a token
    pub fn unit_vector(&self, token: &str) -> Option<&[f32]> {
        self.index_of(token).map(|i| self.unit_vectors[i].as_slice())
    }

    /// Unit-normalized vector at an insertion position
    pub(crate) fn unit_vector_at(&self, index: usize) -> &[f32] {
        &self.unit_vectors[index]
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }

    /// Tokens in insertion order
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.token.as_str())
    }

    pub fn metadata(&self) -> &TableMetadata {
        &self.metadata
    }

    /// Sum of frequency counts over the vocabulary, saturating at `u64::MAX`
    pub fn total_count(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |total, e| total.saturating_add(e.count))
    }

    /// Get table statistics
    pub fn stats(&self) -> serde_json::Value {
        serde_json::json!({
            "vocabularySize": self.len(),
            "dimension": self.dimension,
            "minCount": self.metadata.min_count,
            "totalCount": self.total_count(),
            "createdAt": self.metadata.created_at.to_rfc3339(),
            "source": self.metadata.source,
        })
    }
}

/// Token as stored in a table: trimmed, and lowercased when `lowercase`
pub fn normalize_token(token: &str, lowercase: bool) -> String {
    let trimmed = token.trim();
    if lowercase {
        trimmed.to_lowercase()
    } else {
        trimmed.to_string()
    }
}

/// Builder for [`VectorTable`]
///
/// Validation happens in [`VectorTableBuilder::build`]:
/// - tokens are trimmed and lowercased (unless `lowercase(false)`), never empty
/// - counts are >= 1
/// - all vectors share one non-zero dimension, contain only finite values
///   and have non-zero magnitude
/// - tokens are unique after normalization
///
/// Entries whose count is below `min_count` are validated, then dropped.
#[derive(Debug)]
pub struct VectorTableBuilder {
    entries: Vec<VocabularyEntry>,
    dimension: Option<usize>,
    min_count: u64,
    lowercase: bool,
    source: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl Default for VectorTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VectorTableBuilder {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            dimension: None,
            min_count: 1,
            lowercase: true,
            source: None,
            created_at: None,
        }
    }

    /// Fix the dimension up front instead of taking it from the first entry
    pub fn dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }

    /// Minimum frequency count for inclusion (default: 1)
    pub fn min_count(mut self, min_count: u64) -> Self {
        self.min_count = min_count;
        self
    }

    /// Lowercase tokens during normalization (default: true)
    pub fn lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    /// Record where the table came from
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Keep an existing creation time (used when reloading snapshots)
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Add an entry
    pub fn entry(mut self, token: impl Into<String>, count: u64, vector: Vec<f32>) -> Self {
        self.push(token, count, vector);
        self
    }

    /// Add an entry in place (for loaders that stream entries)
    pub fn push(&mut self, token: impl Into<String>, count: u64, vector: Vec<f32>) {
        self.entries.push(VocabularyEntry::new(token, count, vector));
    }

    /// Number of entries added so far, before `min_count` filtering
    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Validate and build the immutable table
    pub fn build(self) -> Result<VectorTable> {
        let mut dimension = self.dimension;
        if dimension == Some(0) {
            return Err(VectorError::invalid_table("dimension must be at least 1"));
        }

        let mut entries = Vec::with_capacity(self.entries.len());
        let mut unit_vectors = Vec::with_capacity(self.entries.len());
        let mut index: HashMap<String, usize> = HashMap::with_capacity(self.entries.len());
        let mut seen: HashSet<String> = HashSet::new();
        let mut skipped = 0usize;

        for raw in self.entries {
            let token = normalize_token(&raw.token, self.lowercase);

            if token.is_empty() {
                return Err(VectorError::invalid_table("empty token"));
            }
            if raw.count == 0 {
                return Err(VectorError::invalid_table(format!(
                    "token '{}' has count 0",
                    token
                )));
            }

            let expected = *dimension.get_or_insert(raw.vector.len());
            if expected == 0 {
                return Err(VectorError::invalid_table(format!(
                    "token '{}' has an empty vector",
                    token
                )));
            }
            if raw.vector.len() != expected {
                return Err(VectorError::invalid_table(format!(
                    "token '{}' has dimension {}, expected {}",
                    token,
                    raw.vector.len(),
                    expected
                )));
            }
            if raw.vector.iter().any(|x| !x.is_finite()) {
                return Err(VectorError::invalid_table(format!(
                    "token '{}' has a non-finite component",
                    token
                )));
            }
            if !norm(&raw.vector).is_finite() {
                return Err(VectorError::invalid_table(format!(
                    "token '{}' has a magnitude too large for f32",
                    token
                )));
            }
            let unit = normalized(&raw.vector).ok_or_else(|| {
                VectorError::invalid_table(format!("token '{}' has a zero vector", token))
            })?;

            if !seen.insert(token.clone()) {
                return Err(VectorError::invalid_table(format!(
                    "duplicate token '{}'",
                    token
                )));
            }

            if raw.count < self.min_count {
                log::debug!(
                    "Dropping '{}' (count {} < min_count {})",
                    token,
                    raw.count,
                    self.min_count
                );
                skipped += 1;
                continue;
            }

            index.insert(token.clone(), entries.len());
            entries.push(VocabularyEntry {
                token,
                count: raw.count,
                vector: raw.vector,
            });
            unit_vectors.push(unit);
        }

        if entries.is_empty() {
            return Err(VectorError::invalid_table(format!(
                "no vocabulary entries met min_count {}",
                self.min_count
            )));
        }

        if skipped > 0 {
            log::info!(
                "Dropped {} entries below min_count {}",
                skipped,
                self.min_count
            );
        }

        let dimension = dimension.unwrap_or(0);

        Ok(VectorTable {
            entries,
            unit_vectors,
            index,
            dimension,
            metadata: TableMetadata {
                min_count: self.min_count,
                source: self.source,
                created_at: self.created_at.unwrap_or_else(Utc::now),
            },
        })
    }
}
