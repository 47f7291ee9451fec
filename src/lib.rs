//! The `rrl` crate provides tools for working with carbon and hydrogen
//! radio recombination lines in Rust.
pub mod broadening;
pub mod constants;
pub mod error;
pub mod lineshape;
pub mod math;
pub mod models;
pub mod opacity;
pub mod transition;
