pub use error::SearchError;

/// Main architecture layers (dependency flow: Core → Api → Utils)
pub mod core; // Search/pagination control logic
pub mod api; // AJAX transport and response normalization

/// Support modules (used across layers)
pub mod error; // Error handling
pub mod utils; // Shared text helpers

pub type Result<T> = std::result::Result<T, SearchError>;
