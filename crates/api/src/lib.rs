pub mod catalog;
pub mod error;
pub mod models;
pub mod state;

// Re-export commonly used types
pub use catalog::CatalogService;
pub use error::{ApiError, ApiResult, InvocationError};
pub use models::*;
pub use state::{carry_state, merge_state};
