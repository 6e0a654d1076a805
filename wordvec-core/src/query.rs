//! Nearest-neighbor query engine
//!
//! Stateless query API over a shared, immutable [`VectorTable`]. Every
//! operation is a pure function of the table and its inputs, so one table can
//! back any number of engines across threads.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::sync::Arc;

use crate::error::{Result, VectorError};
use crate::table::VectorTable;
use crate::vector::{add_scaled, cosine_similarity, dot, normalized};

/// Default number of neighbors returned by [`QueryEngine::most_similar`]
pub const DEFAULT_TOP_N: usize = 10;

/// A ranked vocabulary token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub token: String,
    pub score: f32,
}

/// Analogy-style nearest-neighbor query
///
/// ```ignore
/// // king - man + woman
/// let query = NeighborQuery::positive(["king", "woman"]).negative(["man"]).top_n(5);
/// let neighbors = engine.most_similar(&query)?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborQuery {
    pub positive: Vec<String>,
    #[serde(default)]
    pub negative: Vec<String>,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

impl NeighborQuery {
    /// Query with the given positive tokens, no negatives and the default top_n
    pub fn positive<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            positive: tokens.into_iter().map(Into::into).collect(),
            negative: Vec::new(),
            top_n: DEFAULT_TOP_N,
        }
    }

    /// Set the negative tokens
    pub fn negative<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.negative = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// Set the number of results
    pub fn top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }
}

/// Query engine over an immutable vector table
#[derive(Debug, Clone)]
pub struct QueryEngine {
    table: Arc<VectorTable>,
}

impl QueryEngine {
    pub fn new(table: Arc<VectorTable>) -> Self {
        Self { table }
    }

    /// The table this engine reads
    pub fn table(&self) -> &Arc<VectorTable> {
        &self.table
    }

    /// Vocabulary membership check; never fails
    pub fn contains(&self, token: &str) -> bool {
        self.table.contains(token)
    }

    /// Raw vector of a token
    pub fn vector(&self, token: &str) -> Result<&[f32]> {
        self.table
            .vector(token)
            .ok_or_else(|| VectorError::unknown_tokens([token]))
    }

    /// Cosine similarity between two vocabulary tokens
    pub fn similarity(&self, a: &str, b: &str) -> Result<f32> {
        let indices = self.resolve([a, b])?;
        let score = dot(
            self.table.unit_vector_at(indices[0]),
            self.table.unit_vector_at(indices[1]),
        );
        Ok(score.clamp(-1.0, 1.0))
    }

    /// Tokens closest to `sum(positive) - sum(negative)`, inputs excluded
    ///
    /// Scores are non-increasing; equal scores keep vocabulary order. Fewer
    /// than `top_n` results come back when the vocabulary runs out.
    pub fn most_similar(&self, query: &NeighborQuery) -> Result<Vec<Neighbor>> {
        if query.positive.is_empty() {
            return Err(VectorError::invalid_argument(
                "most_similar needs at least one positive token",
            ));
        }
        if query.top_n == 0 {
            return Err(VectorError::invalid_argument("top_n must be at least 1"));
        }

        let resolved = self.resolve(
            query
                .positive
                .iter()
                .chain(query.negative.iter())
                .map(String::as_str),
        )?;
        let (positive, negative) = resolved.split_at(query.positive.len());

        let mut composite = vec![0.0_f32; self.table.dimension()];
        for &i in positive {
            add_scaled(&mut composite, self.table.unit_vector_at(i), 1.0);
        }
        for &i in negative {
            add_scaled(&mut composite, self.table.unit_vector_at(i), -1.0);
        }
        let composite = normalized(&composite).ok_or_else(|| {
            VectorError::invalid_argument("positive and negative tokens cancel out")
        })?;

        let excluded: HashSet<usize> = positive.iter().chain(negative.iter()).copied().collect();
        Ok(self.rank_against(&composite, &excluded, query.top_n))
    }

    /// Rank the whole vocabulary against a raw vector
    pub fn similar_by_vector(&self, vector: &[f32], top_n: usize) -> Result<Vec<Neighbor>> {
        if top_n == 0 {
            return Err(VectorError::invalid_argument("top_n must be at least 1"));
        }
        if vector.len() != self.table.dimension() {
            return Err(VectorError::invalid_argument(format!(
                "vector has dimension {}, table has {}",
                vector.len(),
                self.table.dimension()
            )));
        }
        if vector.iter().any(|x| !x.is_finite()) {
            return Err(VectorError::invalid_argument(
                "vector contains non-finite values",
            ));
        }
        let query = normalized(vector)
            .ok_or_else(|| VectorError::invalid_argument("vector has zero magnitude"))?;

        Ok(self.rank_against(&query, &HashSet::new(), top_n))
    }

    /// The token least similar to the centroid of the group
    ///
    /// Ties go to the earliest token in `tokens`.
    pub fn doesnt_match<S: AsRef<str>>(&self, tokens: &[S]) -> Result<String> {
        if tokens.len() < 2 {
            return Err(VectorError::invalid_argument(
                "doesnt_match needs at least two tokens",
            ));
        }
        let indices = self.resolve(tokens.iter().map(|t| t.as_ref()))?;

        let mut centroid = vec![0.0_f32; self.table.dimension()];
        let weight = 1.0 / indices.len() as f32;
        for &i in &indices {
            add_scaled(&mut centroid, self.table.unit_vector_at(i), weight);
        }

        let mut outlier = 0;
        let mut lowest = f32::INFINITY;
        for (position, &i) in indices.iter().enumerate() {
            let score = cosine_similarity(self.table.unit_vector_at(i), &centroid);
            if score < lowest {
                lowest = score;
                outlier = position;
            }
        }

        Ok(tokens[outlier].as_ref().to_string())
    }

    /// 1-based rank of `b` among the neighbors of `a`
    pub fn rank(&self, a: &str, b: &str) -> Result<usize> {
        let indices = self.resolve([a, b])?;
        if indices[0] == indices[1] {
            return Err(VectorError::invalid_argument(
                "rank needs two different tokens",
            ));
        }
        let neighbors = self.rank_against(
            self.table.unit_vector_at(indices[0]),
            &HashSet::from([indices[0]]),
            self.table.len(),
        );
        neighbors
            .iter()
            .position(|n| n.token == b)
            .map(|p| p + 1)
            .ok_or_else(|| VectorError::unknown_tokens([b]))
    }

    /// Map tokens to table positions, reporting every missing token at once
    fn resolve<'t, I>(&self, tokens: I) -> Result<Vec<usize>>
    where
        I: IntoIterator<Item = &'t str>,
    {
        let mut indices = Vec::new();
        let mut missing = Vec::new();
        for token in tokens {
            match self.table.index_of(token) {
                Some(i) => indices.push(i),
                None => missing.push(token),
            }
        }
        if missing.is_empty() {
            Ok(indices)
        } else {
            Err(VectorError::unknown_tokens(missing))
        }
    }

    /// Score every non-excluded entry against a unit query vector
    ///
    /// Keeps at most `top_n` candidates in a heap, so the scan is
    /// O(V log top_n). Equal scores keep vocabulary order.
    fn rank_against(
        &self,
        query: &[f32],
        excluded: &HashSet<usize>,
        top_n: usize,
    ) -> Vec<Neighbor> {
        let mut heap: BinaryHeap<Candidate> =
            BinaryHeap::with_capacity(top_n.min(self.table.len()) + 1);

        for index in (0..self.table.len()).filter(|i| !excluded.contains(i)) {
            let score = dot(query, self.table.unit_vector_at(index)).clamp(-1.0, 1.0);
            let candidate = Candidate { score, index };
            if heap.len() < top_n {
                heap.push(candidate);
            } else if heap.peek().is_some_and(|worst| candidate < *worst) {
                heap.pop();
                heap.push(candidate);
            }
        }

        let entries = self.table.entries();
        heap.into_sorted_vec()
            .into_iter()
            .map(|c| Neighbor {
                token: entries[c.index].token.clone(),
                score: c.score,
            })
            .collect()
    }
}

/// Scored table position, ordered worst-first so a max-heap evicts the
/// weakest candidate: lower score is greater, then later index is greater
#[derive(Debug, Clone, Copy)]
struct Candidate {
    score: f32,
    index: usize,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // scores are finite after clamping
        other
            .score
            .partial_cmp(&self.score)
            .unwrap_or(Ordering::Equal)
            .then(self.index.cmp(&other.index))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_engine() -> QueryEngine {
        let table = VectorTable::builder()
            .entry("cat", 10, vec![1.0, 0.0])
            .entry("dog", 8, vec![0.9, 0.1])
            .entry("car", 6, vec![0.0, 1.0])
            .build()
            .unwrap();
        QueryEngine::new(Arc::new(table))
    }

    #[test]
    fn test_self_similarity_is_one() {
        let engine = toy_engine();
        for token in ["cat", "dog", "car"] {
            let score = engine.similarity(token, token).unwrap();
            assert!((score - 1.0).abs() < 1e-6, "{} -> {}", token, score);
        }
    }

    #[test]
    fn test_similarity_symmetric_and_bounded() {
        let engine = toy_engine();
        let tokens = ["cat", "dog", "car"];
        for a in tokens {
            for b in tokens {
                let ab = engine.similarity(a, b).unwrap();
                let ba = engine.similarity(b, a).unwrap();
                assert_eq!(ab, ba);
                assert!((-1.0..=1.0).contains(&ab));
            }
        }
    }

    #[test]
    fn test_similarity_orders_related_words() {
        let engine = toy_engine();
        let cat_dog = engine.similarity("cat", "dog").unwrap();
        let cat_car = engine.similarity("cat", "car").unwrap();
        assert!(cat_dog > cat_car);
        assert!(cat_car.abs() < 1e-6);
    }

    #[test]
    fn test_similarity_unknown_token() {
        let engine = toy_engine();
        let err = engine.similarity("cat", "train").unwrap_err();
        assert_eq!(err.missing_tokens(), &["train".to_string()]);

        let err = engine.similarity("plane", "train").unwrap_err();
        assert_eq!(
            err.missing_tokens(),
            &["plane".to_string(), "train".to_string()]
        );
    }

    #[test]
    fn test_most_similar_top_one() {
        let engine = toy_engine();
        let result = engine
            .most_similar(&NeighborQuery::positive(["cat"]).top_n(1))
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].token, "dog");
        assert!(result[0].score > 0.0);
    }

    #[test]
    fn test_most_similar_excludes_inputs() {
        let engine = toy_engine();
        let result = engine
            .most_similar(&NeighborQuery::positive(["cat"]).negative(["car"]).top_n(5))
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].token, "dog");
    }

    #[test]
    fn test_most_similar_scores_non_increasing() {
        let engine = toy_engine();
        let result = engine
            .most_similar(&NeighborQuery::positive(["dog"]))
            .unwrap();
        assert_eq!(result.len(), 2);
        assert!(result.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(result[0].token, "cat");
    }

    #[test]
    fn test_most_similar_ties_keep_vocabulary_order() {
        let table = VectorTable::builder()
            .entry("query", 1, vec![1.0, 0.0, 0.0])
            .entry("zeta", 1, vec![0.0, 1.0, 0.0])
            .entry("alpha", 1, vec![0.0, 0.0, 1.0])
            .entry("mid", 1, vec![0.0, -1.0, 0.0])
            .build()
            .unwrap();
        let engine = QueryEngine::new(Arc::new(table));
        let result = engine
            .most_similar(&NeighborQuery::positive(["query"]))
            .unwrap();
        let tokens: Vec<&str> = result.iter().map(|n| n.token.as_str()).collect();
        assert_eq!(tokens, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_truncated_ties_keep_earliest_tokens() {
        let mut builder = VectorTable::builder().entry("query", 1, vec![1.0, 0.0]);
        for token in ["e", "d", "c", "b", "a"] {
            builder.push(token, 1, vec![1.0, 1.0]);
        }
        builder.push("far", 1, vec![-1.0, 0.5]);
        builder.push("near", 1, vec![1.0, 0.1]);
        let engine = QueryEngine::new(Arc::new(builder.build().unwrap()));

        let result = engine
            .most_similar(&NeighborQuery::positive(["query"]).top_n(3))
            .unwrap();
        let tokens: Vec<&str> = result.iter().map(|n| n.token.as_str()).collect();
        assert_eq!(tokens, vec!["near", "e", "d"]);

        let all = engine
            .most_similar(&NeighborQuery::positive(["query"]).top_n(100))
            .unwrap();
        assert_eq!(all.len(), 7);
        assert_eq!(all.last().unwrap().token, "far");
    }

    #[test]
    fn test_identical_vectors_are_fully_similar() {
        let table = VectorTable::builder()
            .entry("sofa", 1, vec![0.3, -1.7, 2.2])
            .entry("couch", 1, vec![0.3, -1.7, 2.2])
            .entry("lamp", 1, vec![1.0, 0.0, 0.0])
            .build()
            .unwrap();
        let engine = QueryEngine::new(Arc::new(table));
        let score = engine.similarity("sofa", "couch").unwrap();
        assert!((score - 1.0).abs() < 1e-6, "sofa/couch -> {}", score);
    }

    #[test]
    fn test_most_similar_argument_errors() {
        let engine = toy_engine();
        let empty = NeighborQuery::positive(Vec::<String>::new());
        assert!(matches!(
            engine.most_similar(&empty),
            Err(VectorError::InvalidArgument(_))
        ));
        assert!(matches!(
            engine.most_similar(&NeighborQuery::positive(["cat"]).top_n(0)),
            Err(VectorError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_most_similar_reports_all_unknown_tokens() {
        let engine = toy_engine();
        let err = engine
            .most_similar(&NeighborQuery::positive(["cat", "boat"]).negative(["train"]))
            .unwrap_err();
        assert_eq!(
            err.missing_tokens(),
            &["boat".to_string(), "train".to_string()]
        );
    }

    #[test]
    fn test_most_similar_cancelled_composite() {
        let engine = toy_engine();
        let err = engine
            .most_similar(&NeighborQuery::positive(["cat"]).negative(["cat"]))
            .unwrap_err();
        assert!(matches!(err, VectorError::InvalidArgument(_)));
    }

    #[test]
    fn test_doesnt_match() {
        let engine = toy_engine();
        assert_eq!(engine.doesnt_match(&["cat", "dog", "car"]).unwrap(), "car");
        assert_eq!(engine.doesnt_match(&["car", "cat", "dog"]).unwrap(), "car");
    }

    #[test]
    fn test_doesnt_match_tie_takes_first() {
        let engine = toy_engine();
        // two tokens are equally far from their centroid
        assert_eq!(engine.doesnt_match(&["cat", "car"]).unwrap(), "cat");
        assert_eq!(engine.doesnt_match(&["car", "cat"]).unwrap(), "car");
    }

    #[test]
    fn test_doesnt_match_errors() {
        let engine = toy_engine();
        assert!(matches!(
            engine.doesnt_match(&["cat"]),
            Err(VectorError::InvalidArgument(_))
        ));
        let err = engine.doesnt_match(&["cat", "train"]).unwrap_err();
        assert_eq!(err.missing_tokens(), &["train".to_string()]);
    }

    #[test]
    fn test_contains() {
        let engine = toy_engine();
        assert!(engine.contains("car"));
        assert!(!engine.contains("train"));
        assert!(!engine.contains(""));
    }

    #[test]
    fn test_similar_by_vector() {
        let engine = toy_engine();
        let result = engine.similar_by_vector(&[0.0, 2.0], 2).unwrap();
        assert_eq!(result[0].token, "car");
        assert!((result[0].score - 1.0).abs() < 1e-6);
        assert_eq!(result.len(), 2);

        assert!(engine.similar_by_vector(&[1.0], 2).is_err());
        assert!(engine.similar_by_vector(&[0.0, 0.0], 2).is_err());
        assert!(engine.similar_by_vector(&[1.0, 0.0], 0).is_err());
    }

    #[test]
    fn test_vector_lookup() {
        let engine = toy_engine();
        assert_eq!(engine.vector("dog").unwrap(), &[0.9, 0.1]);
        assert!(matches!(
            engine.vector("train"),
            Err(VectorError::UnknownToken(_))
        ));
    }

    #[test]
    fn test_rank() {
        let engine = toy_engine();
        assert_eq!(engine.rank("cat", "dog").unwrap(), 1);
        assert_eq!(engine.rank("cat", "car").unwrap(), 2);
        assert!(engine.rank("cat", "cat").is_err());
        assert!(engine.rank("cat", "train").is_err());
    }

    #[test]
    fn test_neighbor_query_deserialize_defaults() {
        let query: NeighborQuery = serde_json::from_str(r#"{"positive":["cat"]}"#).unwrap();
        assert_eq!(query.top_n, DEFAULT_TOP_N);
        assert!(query.negative.is_empty());

        let query: NeighborQuery =
            serde_json::from_str(r#"{"positive":["a"],"negative":["b"],"topN":3}"#).unwrap();
        assert_eq!(query.top_n, 3);
        assert_eq!(query.negative, vec!["b".to_string()]);
    }
}
