use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while assembling a preference table
#[derive(Debug, Error)]
pub enum TableError {
    #[error("table must have at least one row and one column")]
    Empty,

    #[error("label count ({labels}) does not match row count ({rows})")]
    LabelCount { labels: usize, rows: usize },

    #[error("row {row} has {got} entries, expected {expected}")]
    RaggedRow {
        row: usize,
        got: usize,
        expected: usize,
    },
}

/// A preference table: one row per member of a group, one column per member
/// of the other group, values are raw preference scores (lower = more
/// preferred; ties and gaps are allowed and resolved later by normalization).
///
/// Labels are always carried alongside the scores; anonymous input gets
/// synthesized labels at construction, so downstream code never branches on
/// whether identities exist.
///
/// Column identity is positional: the caller guarantees that column `k` of
/// one side's table and row `k` of the other side's table refer to the same
/// person.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceTable {
    labels: Vec<String>,
    scores: Vec<Vec<f64>>,
}

impl PreferenceTable {
    /// Build a labeled table, validating label arity and rectangularity
    pub fn new(labels: Vec<String>, scores: Vec<Vec<f64>>) -> Result<Self, TableError> {
        if scores.is_empty() || scores[0].is_empty() {
            return Err(TableError::Empty);
        }
        if labels.len() != scores.len() {
            return Err(TableError::LabelCount {
                labels: labels.len(),
                rows: scores.len(),
            });
        }
        let expected = scores[0].len();
        for (row, r) in scores.iter().enumerate() {
            if r.len() != expected {
                return Err(TableError::RaggedRow {
                    row,
                    got: r.len(),
                    expected,
                });
            }
        }
        Ok(Self { labels, scores })
    }

    /// Build a table from bare scores, synthesizing labels as
    /// `{prefix}01`, `{prefix}02`, ... (zero-padded to the group's width,
    /// no upper bound on group size)
    pub fn anonymous(scores: Vec<Vec<f64>>, prefix: &str) -> Result<Self, TableError> {
        let width = scores.len().to_string().len().max(2);
        let labels = (1..=scores.len())
            .map(|i| format!("{prefix}{i:0width$}"))
            .collect();
        Self::new(labels, scores)
    }

    /// Number of members on this side (rows)
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Number of members on the other side (columns)
    pub fn width(&self) -> usize {
        self.scores[0].len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn scores(&self) -> &[Vec<f64>] {
        &self.scores
    }
}

/// Which side keys the projected pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Proposer,
    Acceptor,
}

/// One row of a projected pairing, ready for serialization.
/// `None` marks the unmatched side of a pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairReport {
    pub proposer: Option<String>,
    pub acceptor: Option<String>,
}
