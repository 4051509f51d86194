use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed descriptor {path}: {reason}")]
    Descriptor { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, CatalogError>;
