//! Generating inference rules

pub mod factoring;
pub mod fluted_resolution;
pub mod ordering;

#[cfg(test)]
mod proptest_tests;

pub use factoring::Factoring;
pub use fluted_resolution::FlutedResolution;
pub use ordering::{compare_literals, is_contained, superterm_relation, Comparison, Maximality, MaximalityMemo};
