use super::loader::MetadataLoader;
use super::path::is_excluded;
use crate::config::CatalogConfig;
use futures::future::{BoxFuture, FutureExt, join_all};
use routescope_api::ApiMetadata;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Recursive discovery over a catalog directory tree.
///
/// Placement rule:
/// - a directory with its own descriptor yields exactly one record, with the
///   records found below it attached as `subApis`;
/// - a directory without one yields nothing itself and hoists whatever its
///   children yield into the parent's level.
#[derive(Debug, Clone)]
pub struct TreeWalker {
    config: Arc<CatalogConfig>,
    loader: MetadataLoader,
}

impl TreeWalker {
    pub fn new(config: Arc<CatalogConfig>) -> Self {
        let loader = MetadataLoader::new(config.clone());
        Self { config, loader }
    }

    pub fn loader(&self) -> &MetadataLoader {
        &self.loader
    }

    /// Discover every record at or below `location`.
    ///
    /// Never fails: unreadable directories count as empty and malformed
    /// descriptors as absent.
    pub fn discover<'a>(&'a self, location: &'a Path) -> BoxFuture<'a, Vec<ApiMetadata>> {
        async move {
            debug!("Discovering APIs in {}", location.display());

            let own = self.loader.load(location).await;
            let nested = self.discover_children(location).await;

            match own {
                Some(api) => vec![api.with_sub_apis(nested)],
                None => nested,
            }
        }
        .boxed()
    }

    /// Concatenated discovery results of every eligible child of `location`,
    /// in child order.
    pub async fn discover_children(&self, location: &Path) -> Vec<ApiMetadata> {
        let children = self.child_dirs(location).await;

        // Siblings share nothing, so they are scanned together. join_all
        // keeps the input order.
        join_all(children.iter().map(|child| self.discover(child)))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    /// Immediate child directories eligible for discovery, sorted by name.
    pub async fn child_dirs(&self, location: &Path) -> Vec<PathBuf> {
        let mut entries = match tokio::fs::read_dir(location).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Error discovering APIs in {}: {}", location.display(), e);
                return Vec::new();
            }
        };

        let mut children = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!("Error reading entry in {}: {}", location.display(), e);
                    break;
                }
            };

            let Ok(name) = entry.file_name().into_string() else {
                debug!("Skipping non UTF-8 entry in {}", location.display());
                continue;
            };
            if is_excluded(&name, &self.config.descriptor_dir) {
                continue;
            }

            // Symlinked directories are not followed, which also rules out cycles.
            let is_dir = match entry.file_type().await {
                Ok(file_type) => file_type.is_dir(),
                Err(e) => {
                    debug!("Cannot stat {}: {}", entry.path().display(), e);
                    false
                }
            };
            if is_dir {
                children.push((name, entry.path()));
            }
        }

        children.sort_by(|a, b| a.0.cmp(&b.0));
        children.into_iter().map(|(_, path)| path).collect()
    }
}
