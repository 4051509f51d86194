pub mod check;
pub mod loader;
pub mod path;
pub mod walker;

pub use check::{CheckReport, Finding, check_catalog};
pub use loader::MetadataLoader;
pub use path::{MountPoint, endpoint_for, location_for};
pub use walker::TreeWalker;

use crate::config::CatalogConfig;
use async_trait::async_trait;
use routescope_api::{ApiError, ApiMetadata, ApiResult, CatalogService};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Catalog rooted at one directory. Every call rescans the filesystem.
#[derive(Debug, Clone)]
pub struct Catalog {
    config: Arc<CatalogConfig>,
    walker: TreeWalker,
}

impl Catalog {
    pub fn new(config: CatalogConfig) -> Self {
        let config = Arc::new(config);
        let walker = TreeWalker::new(config.clone());
        Self { config, walker }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn mount(&self) -> &MountPoint {
        &self.config.mount
    }

    /// Discover the whole catalog.
    pub async fn discover(&self) -> Vec<ApiMetadata> {
        info!("Starting API discovery in {}", self.config.root.display());
        let apis = self.walker.discover(&self.config.root).await;
        info!("Discovered {} top-level APIs", apis.len());
        apis
    }

    /// Find the record serving `endpoint`, with its subtree.
    ///
    /// Only the directory the endpoint maps to is read, so a miss never costs
    /// a scan. The answer agrees with discovery: the path must consist of real
    /// directories (no symlinks), and the descriptor there must claim this
    /// endpoint.
    pub async fn lookup(&self, endpoint: &str) -> Option<ApiMetadata> {
        let location = location_for(
            &self.config.root,
            &self.config.mount,
            endpoint,
            &self.config.descriptor_dir,
        )?;

        if !self.is_discoverable(&location).await {
            debug!("{} does not map to a discoverable directory", endpoint);
            return None;
        }

        let api = self.walker.loader().load(&location).await?;
        if api.endpoint != endpoint {
            debug!(
                "Descriptor at {} declares endpoint {}, not {}",
                location.display(),
                api.endpoint,
                endpoint
            );
            return None;
        }

        let children = self.walker.discover_children(&location).await;
        Some(api.with_sub_apis(children))
    }

    /// True when every component between the root and `location` is a plain
    /// directory, i.e. the walker would have descended into it.
    async fn is_discoverable(&self, location: &Path) -> bool {
        let Ok(relative) = location.strip_prefix(&self.config.root) else {
            return false;
        };
        let mut current = self.config.root.clone();
        for component in relative.components() {
            current.push(component);
            match tokio::fs::symlink_metadata(&current).await {
                Ok(meta) if meta.file_type().is_dir() => {}
                Ok(_) => return false,
                Err(e) => {
                    debug!("Cannot stat {}: {}", current.display(), e);
                    return false;
                }
            }
        }
        true
    }

    /// Audit every descriptor under the root. Blocking.
    pub fn check(&self) -> CheckReport {
        check_catalog(self.config.clone())
    }
}

#[async_trait]
impl CatalogService for Catalog {
    async fn list(&self) -> ApiResult<Vec<ApiMetadata>> {
        Ok(self.discover().await)
    }

    async fn describe(&self, endpoint: &str) -> ApiResult<ApiMetadata> {
        self.lookup(endpoint)
            .await
            .ok_or_else(|| ApiError::NotFound(endpoint.to_string()))
    }
}
