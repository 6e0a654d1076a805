//! Rendering of CLI results as text or JSON

use serde_json::{json, Value};
use std::path::PathBuf;
use wordvec_core::Neighbor;

/// Result of one CLI command
#[derive(Debug, Clone)]
pub enum Report {
    Similarity {
        a: String,
        b: String,
        similarity: f32,
    },
    Neighbors(Vec<Neighbor>),
    Outlier(String),
    Contains {
        token: String,
        contains: bool,
    },
    Vector {
        token: String,
        vector: Vec<f32>,
    },
    Rank {
        a: String,
        b: String,
        rank: usize,
    },
    Stats(Value),
    Converted {
        path: PathBuf,
        entries: usize,
    },
}

impl Report {
    pub fn render(&self, as_json: bool) -> String {
        if as_json {
            self.to_json().to_string()
        } else {
            self.to_text()
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Report::Similarity { a, b, similarity } => {
                json!({ "a": a, "b": b, "similarity": similarity })
            }
            Report::Neighbors(neighbors) => json!({ "neighbors": neighbors }),
            Report::Outlier(outlier) => json!({ "outlier": outlier }),
            Report::Contains { token, contains } => {
                json!({ "token": token, "contains": contains })
            }
            Report::Vector { token, vector } => json!({ "token": token, "vector": vector }),
            Report::Rank { a, b, rank } => json!({ "a": a, "b": b, "rank": rank }),
            Report::Stats(stats) => stats.clone(),
            Report::Converted { path, entries } => {
                json!({ "output": path.display().to_string(), "entries": entries })
            }
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Report::Similarity { similarity, .. } => format!("{:.4}", similarity),
            Report::Neighbors(neighbors) => {
                let width = neighbors
                    .iter()
                    .map(|n| n.token.chars().count())
                    .max()
                    .unwrap_or(0);
                neighbors
                    .iter()
                    .map(|n| format!("{:<width$}  {:.4}", n.token, n.score, width = width))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            Report::Outlier(outlier) => outlier.clone(),
            Report::Contains { contains, .. } => contains.to_string(),
            Report::Vector { vector, .. } => vector
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" "),
            Report::Rank { rank, .. } => rank.to_string(),
            Report::Stats(stats) => stats_text(stats),
            Report::Converted { path, entries } => {
                format!("Wrote {} entries to {}", entries, path.display())
            }
        }
    }
}

fn stats_text(stats: &Value) -> String {
    match stats.as_object() {
        Some(fields) => fields
            .iter()
            .map(|(key, value)| match value {
                Value::String(s) => format!("{}: {}", key, s),
                other => format!("{}: {}", key, other),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        None => stats.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neighbors() -> Vec<Neighbor> {
        vec![
            Neighbor {
                token: "queen".to_string(),
                score: 0.8125,
            },
            Neighbor {
                token: "princess".to_string(),
                score: 0.5,
            },
        ]
    }

    #[test]
    fn test_neighbors_text_is_aligned() {
        let text = Report::Neighbors(neighbors()).to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["queen     0.8125", "princess  0.5000"]);
    }

    #[test]
    fn test_neighbors_json() {
        let json = Report::Neighbors(neighbors()).render(true);
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["neighbors"][0]["token"], "queen");
        assert_eq!(value["neighbors"][1]["score"], 0.5);
    }

    #[test]
    fn test_scalar_reports() {
        let report = Report::Similarity {
            a: "cat".to_string(),
            b: "dog".to_string(),
            similarity: 0.25,
        };
        assert_eq!(report.to_text(), "0.2500");
        assert_eq!(report.to_json()["b"], "dog");

        let report = Report::Contains {
            token: "cat".to_string(),
            contains: false,
        };
        assert_eq!(report.render(false), "false");
        assert_eq!(Report::Outlier("car".to_string()).render(false), "car");
        assert_eq!(
            Report::Vector {
                token: "cat".to_string(),
                vector: vec![1.0, -0.5]
            }
            .to_text(),
            "1 -0.5"
        );
    }

    #[test]
    fn test_stats_text() {
        let stats = json!({ "vocabularySize": 3, "source": "vectors.txt" });
        let text = Report::Stats(stats).to_text();
        assert!(text.contains("vocabularySize: 3"));
        assert!(text.contains("source: vectors.txt"));
    }

    #[test]
    fn test_empty_neighbors() {
        assert_eq!(Report::Neighbors(Vec::new()).to_text(), "");
    }
}
