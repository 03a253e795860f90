//! Bookstore Common Library
//!
//! Domain types shared by the acceptance harness: the Book and Author
//! entities, the HTTP status vocabulary used by assertions, and the
//! process-wide identifier generator.

pub mod error;
pub mod http;
pub mod ids;
pub mod model;

// Re-export commonly used types
pub use error::{Error, Result};
pub use http::HttpCode;
pub use ids::{unique_id, IdGenerator, INVALID_ID, NEVER_EXISTED_ID};
pub use model::{Author, Book, Entity, EntityId, EntityKind};

/// Harness version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
