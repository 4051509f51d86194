use crate::ApiResult;
use crate::models::ApiMetadata;
use async_trait::async_trait;

#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Scan the whole catalog from its root.
    async fn list(&self) -> ApiResult<Vec<ApiMetadata>>;

    /// Retrieve one record (with its subtree) by endpoint.
    async fn describe(&self, endpoint: &str) -> ApiResult<ApiMetadata>;
}
