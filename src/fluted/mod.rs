//! The fluted fragment pipeline: classification, definitional preprocessing,
//! and clause separation.
//!
//! The fluted fragment is a decidable sublanguage of first-order logic in
//! which predicate argument lists are suffixes of the quantifier prefix's
//! variable sequence. When an input problem lies in the fragment, the prover
//! switches to a refined calculus: definitional preprocessing keeps
//! clausification inside the fragment, activated clauses are split by the
//! separation rule, and resolution is restricted by the fluted literal
//! ordering (see `generating::fluted_resolution`).

pub mod classifier;
pub mod evar;
pub mod preprocessor;
pub mod separator;
pub mod sequence;

pub use classifier::{is_in_fluted_fragment, ClauseClassifier, FormulaClassifier};
pub use evar::EVar;
pub use preprocessor::{FlutedPreprocessor, Polarity};
pub use separator::separate;
pub use sequence::FlutedSeq;
