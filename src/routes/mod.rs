// Export all route modules
pub mod orphanages;

// Re-export all route handlers for easy importing
pub use orphanages::*;
