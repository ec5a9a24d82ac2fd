//! Remedy lookup: a CSV-backed condition → treatment table and a fuzzy
//! resolver over its condition keys.

pub mod resolver;
pub mod table;

pub use resolver::{
    MatchCandidate, RemedyResolver, Resolution, SelectionPolicy, DEFAULT_REMEDY_THRESHOLD,
};
pub use table::{
    RemedyColumns, RemedyRecord, RemedyTable, RemedyTableError, DEFAULT_CONDITION_COLUMN,
    DEFAULT_TREATMENT_COLUMN,
};
