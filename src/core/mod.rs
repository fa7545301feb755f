// Core algorithm exports
pub mod engine;
pub mod normalize;
pub mod projector;

pub use engine::{Matching, PairingError, StablePairing};
pub use normalize::{normalize_row, normalize_rows, NormalizeError};
pub use projector::{log_pairs, project, reports};
