pub mod builtin;
pub mod validate;

use crate::session::SharedSessionStore;
use async_trait::async_trait;
use routescope_api::{ApiMetadata, CatalogService, Invocation, InvocationError, Method};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// What a handler sees besides the request body.
#[derive(Clone)]
pub struct InvocationContext {
    /// Record of the endpoint being invoked.
    pub api: ApiMetadata,
    pub sessions: SharedSessionStore,
}

/// Implementation behind one or more cataloged endpoints.
///
/// Descriptors select a handler through their `handler` field, so the same
/// implementation can serve several endpoints.
#[async_trait]
pub trait EndpointHandler: Send + Sync {
    /// Id descriptors refer to.
    fn id(&self) -> &str;

    async fn handle(
        &self,
        ctx: &InvocationContext,
        request: Invocation,
    ) -> Result<Map<String, Value>, InvocationError>;
}

#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn EndpointHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the handlers shipped in this crate.
    pub fn with_builtins() -> Self {
        Self::new()
            .with(Arc::new(builtin::EchoHandler))
            .with(Arc::new(builtin::InspectHandler))
    }

    pub fn with(mut self, handler: Arc<dyn EndpointHandler>) -> Self {
        self.register(handler);
        self
    }

    /// Register a handler, replacing any previous one with the same id.
    pub fn register(&mut self, handler: Arc<dyn EndpointHandler>) {
        let id = handler.id().to_string();
        if self.handlers.insert(id.clone(), handler).is_some() {
            warn!("Handler '{}' registered twice, keeping the latest", id);
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn EndpointHandler>> {
        self.handlers.get(id).cloned()
    }

    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

/// Routes a request to the handler declared by the endpoint's record.
#[derive(Clone)]
pub struct Dispatcher {
    catalog: Arc<dyn CatalogService>,
    registry: HandlerRegistry,
    sessions: SharedSessionStore,
}

impl Dispatcher {
    pub fn new(
        catalog: Arc<dyn CatalogService>,
        registry: HandlerRegistry,
        sessions: SharedSessionStore,
    ) -> Self {
        Self {
            catalog,
            registry,
            sessions,
        }
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogService> {
        &self.catalog
    }

    pub fn sessions(&self) -> &SharedSessionStore {
        &self.sessions
    }

    pub async fn invoke(
        &self,
        endpoint: &str,
        method: Method,
        mut request: Invocation,
    ) -> Result<Map<String, Value>, InvocationError> {
        let api = self.catalog.describe(endpoint).await?;

        if api.method != method {
            return Err(InvocationError::MethodNotAllowed {
                endpoint: endpoint.to_string(),
                method: method.to_string(),
                expected: api.method.to_string(),
            });
        }

        if api.is_category() {
            debug!("Listing category {}", endpoint);
            return Ok(category_listing(&api));
        }

        validate::prepare(&api, &mut request)?;

        let handler_id = api
            .handler
            .clone()
            .ok_or_else(|| InvocationError::NotImplemented(endpoint.to_string()))?;
        let handler = self.registry.get(&handler_id).ok_or_else(|| {
            warn!("{} names unknown handler '{}'", endpoint, handler_id);
            InvocationError::NotImplemented(endpoint.to_string())
        })?;

        let ctx = InvocationContext {
            api,
            sessions: self.sessions.clone(),
        };
        let result = handler.handle(&ctx, request).await;
        if let Err(e) = &result {
            if e.is_client_error() {
                debug!("Rejected request to {}: {}", endpoint, e);
            } else {
                error!("Error in {} ({}): {}", endpoint, handler_id, e);
            }
        }
        result
    }
}

/// Body returned when a category is invoked: its children, as discovered.
pub fn category_listing(api: &ApiMetadata) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert("apis".to_string(), json!(api.sub_apis()));
    body
}
