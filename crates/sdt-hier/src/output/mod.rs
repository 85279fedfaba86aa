//! Report formatting.

pub mod json;
pub mod terminal;
