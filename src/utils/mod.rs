//! Utils module - shared helpers used across layers.

/// Text normalization for diacritic-insensitive matching
pub mod text;
