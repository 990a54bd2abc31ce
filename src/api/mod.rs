/// Gateway API
///
/// This module provides the client-facing file operations over the
/// remote hierarchical storage service.
pub mod gateway;
pub mod types;

// Re-export main types
pub use gateway::*;
pub use types::*;
