use crate::catalog::path::MountPoint;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DESCRIPTOR_DIR: &str = "discovery";
pub const DEFAULT_DESCRIPTOR_FILE: &str = "metadata.json";

/// Where the catalog lives and how its directories map to endpoints.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub root: PathBuf,
    pub mount: MountPoint,
    /// Reserved folder holding each directory's descriptor. Never inventoried.
    pub descriptor_dir: String,
    pub descriptor_file: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("api"),
            mount: MountPoint::new("/api"),
            descriptor_dir: DEFAULT_DESCRIPTOR_DIR.to_string(),
            descriptor_file: DEFAULT_DESCRIPTOR_FILE.to_string(),
        }
    }
}

impl CatalogConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn with_mount(mut self, mount: impl Into<MountPoint>) -> Self {
        self.mount = mount.into();
        self
    }

    pub fn with_descriptor(mut self, dir: impl Into<String>, file: impl Into<String>) -> Self {
        self.descriptor_dir = dir.into();
        self.descriptor_file = file.into();
        self
    }

    /// Descriptor path for one candidate directory.
    pub fn descriptor_path(&self, location: &Path) -> PathBuf {
        location
            .join(&self.descriptor_dir)
            .join(&self.descriptor_file)
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Idle lifetime of a handler session.
    pub session_ttl: Duration,
    pub purge_interval: Duration,
    /// Upper bound on request bodies, multipart included.
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            session_ttl: Duration::from_secs(30 * 60),
            purge_interval: Duration::from_secs(60),
            body_limit: 10 * 1024 * 1024,
        }
    }
}
