//! Api module - AJAX transport and response normalization.

/// AJAX configuration and request parameter assembly
pub mod config;

/// HTTP client wrapper around reqwest
pub mod client;

/// Response-shape matching and raw item flattening
pub mod response;
