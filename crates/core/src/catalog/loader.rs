use super::path::endpoint_for;
use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use routescope_api::ApiMetadata;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Reads the descriptor attached to a single catalog directory.
#[derive(Debug, Clone)]
pub struct MetadataLoader {
    config: Arc<CatalogConfig>,
}

impl MetadataLoader {
    pub fn new(config: Arc<CatalogConfig>) -> Self {
        Self { config }
    }

    /// Load the record for `location`.
    ///
    /// A missing descriptor yields `None` silently. An unreadable or malformed
    /// one is logged and also yields `None`, so a bad node never stops a scan.
    pub async fn load(&self, location: &Path) -> Option<ApiMetadata> {
        match self.try_load(location).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Skipping descriptor for {}: {}", location.display(), e);
                None
            }
        }
    }

    /// Like [`load`](Self::load) but reports why a present descriptor was rejected.
    pub async fn try_load(&self, location: &Path) -> Result<Option<ApiMetadata>> {
        let path = self.config.descriptor_path(location);
        debug!("Checking descriptor at {}", path.display());

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No descriptor at {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let api = self.parse(&bytes, location, &path)?;
        debug!("Loaded descriptor '{}' ({})", api.name, api.endpoint);
        Ok(Some(api))
    }

    /// Parse raw descriptor bytes found for `location`.
    pub fn parse(&self, bytes: &[u8], location: &Path, path: &Path) -> Result<ApiMetadata> {
        let mut api: ApiMetadata =
            serde_json::from_slice(bytes).map_err(|e| CatalogError::Descriptor {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if api.name.trim().is_empty() {
            return Err(CatalogError::Descriptor {
                path: path.to_path_buf(),
                reason: "name must not be empty".to_string(),
            });
        }

        if api.endpoint.is_empty() {
            api.endpoint = endpoint_for(&self.config.root, &self.config.mount, location)
                .ok_or_else(|| CatalogError::Descriptor {
                    path: path.to_path_buf(),
                    reason: format!(
                        "cannot derive an endpoint for {} under {}",
                        location.display(),
                        self.config.root.display()
                    ),
                })?;
        }

        // Children are attached by the walker after recursing.
        if api.sub_apis.take().is_some() {
            debug!("Ignoring subApis declared in {}", path.display());
        }

        Ok(api)
    }
}
