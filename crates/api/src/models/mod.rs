pub mod invocation;
pub mod metadata;

pub use invocation::*;
pub use metadata::*;
