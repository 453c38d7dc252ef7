//! Property-based tests for resolution laws

mod merge_laws;
mod reference_union;
