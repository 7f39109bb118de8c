//! Deterministic JSON serialization for persisted state.
//!
//! Persisted values are written with:
//! - 2-space indentation
//! - Trailing newline
//! - UTF-8 encoding without BOM

mod json;

pub use json::*;
