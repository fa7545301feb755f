//! Stablepair - deferred-acceptance pairing engine for mentorship matching
//!
//! This library computes a two-sided one-to-one stable matching between two
//! unevenly-sized groups, each holding ranked preferences over the other.
//! Raw, possibly-tied scores are normalized into dense unique ranks with
//! reproducible seeded tie-breaking, then the proposer-optimal deferred-
//! acceptance protocol produces a matching with no blocking pairs.

pub mod config;
pub mod core;
pub mod models;
pub mod synth;

// Re-export commonly used types
pub use crate::core::{
    log_pairs, normalize_row, normalize_rows, project, reports, Matching, NormalizeError,
    PairingError, StablePairing,
};
pub use crate::models::{Orientation, PairReport, PreferenceTable, TableError};
