//! Domain layer containing the verification code entity and key format.

pub mod entities;

// Re-export commonly used domain types
pub use entities::*;
