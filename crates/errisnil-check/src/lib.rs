//! errisnil check - uses of error values that are already known to be nil

pub mod analysis;
pub mod facts;
pub mod guard;
pub mod rules;

pub use analysis::{AnalysisError, ErrIsNilAnalyzer};
pub use facts::{FactError, Facts, Nilness};
