// Model exports
pub mod domain;

pub use domain::{Orientation, PairReport, PreferenceTable, TableError};
