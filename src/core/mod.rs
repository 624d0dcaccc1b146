// Public modules
pub mod access;
pub mod drink;
pub mod drink_ingredient;
pub mod error;
pub mod ingredient;
pub mod instructions;
pub mod list;
pub mod output;
pub mod slugify;
pub mod store;

// Internal modules - not part of public API
pub(crate) mod paths;

// Public modules for CLI access
pub mod defaults;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
pub use output::{DeleteResult, Page};
