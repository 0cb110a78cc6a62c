pub mod cameras;
pub mod overview;
pub mod storage;

// Re-export the main types for easy access
pub use cameras::*;
pub use overview::*;
pub use storage::*;
