pub mod catalog;
pub mod config;
pub mod error;
pub mod invoke;
pub mod logging;
pub mod session;

pub use catalog::{Catalog, MountPoint};
pub use config::{CatalogConfig, ServerConfig};
pub use error::{CatalogError, Result};
pub use invoke::{Dispatcher, EndpointHandler, HandlerRegistry, InvocationContext};
pub use session::{InMemorySessionStore, SessionStore, SharedSessionStore};
