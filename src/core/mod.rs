//! Core module - search/pagination control logic.

/// Pagination state and search outcome types
pub mod state;

/// Item model, item-source seam and in-memory implementation
pub mod items;

/// The search/pagination controller
pub mod controller;
