//! Handlers shipped with the server, used by the sample catalog.

use super::{EndpointHandler, InvocationContext};
use async_trait::async_trait;
use routescope_api::{Invocation, InvocationError};
use serde_json::{Map, Value, json};

/// Echoes messages back and remembers the conversation per `thread_id`.
pub struct EchoHandler;

#[async_trait]
impl EndpointHandler for EchoHandler {
    fn id(&self) -> &str {
        "echo"
    }

    async fn handle(
        &self,
        ctx: &InvocationContext,
        request: Invocation,
    ) -> Result<Map<String, Value>, InvocationError> {
        let message = request
            .str_field("message")
            .ok_or_else(|| InvocationError::BadRequest("Message is required".to_string()))?;

        let sessions = &ctx.sessions;
        let thread_id = match request.str_field("thread_id") {
            Some(id) => id.to_string(),
            None => sessions.create(),
        };

        let mut history: Vec<Value> = sessions
            .get(&thread_id)
            .and_then(|state| state.get("messages").cloned())
            .and_then(|messages| serde_json::from_value(messages).ok())
            .unwrap_or_default();
        history.push(json!(message));
        let turns = history.len();
        sessions.put(&thread_id, json!({ "messages": history }));

        let mut body = Map::new();
        body.insert("response".to_string(), json!(format!("Echo: {}", message)));
        body.insert("thread_id".to_string(), json!(thread_id));
        body.insert("turns".to_string(), json!(turns));
        Ok(body)
    }
}

/// Reports what arrived: plain fields verbatim, files by name, type and size.
pub struct InspectHandler;

#[async_trait]
impl EndpointHandler for InspectHandler {
    fn id(&self) -> &str {
        "inspect"
    }

    async fn handle(
        &self,
        ctx: &InvocationContext,
        request: Invocation,
    ) -> Result<Map<String, Value>, InvocationError> {
        let files: Vec<Value> = request
            .files
            .iter()
            .map(|(name, file)| {
                json!({
                    "parameter": name,
                    "fileName": file.file_name,
                    "contentType": file.content_type,
                    "size": file.size(),
                })
            })
            .collect();

        let mut body = Map::new();
        body.insert("endpoint".to_string(), json!(ctx.api.endpoint));
        body.insert("fields".to_string(), Value::Object(request.fields));
        body.insert("files".to_string(), Value::Array(files));
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{InMemorySessionStore, SessionStore};
    use routescope_api::{ApiMetadata, UploadedFile};
    use std::sync::Arc;
    use std::time::Duration;

    fn ctx() -> InvocationContext {
        InvocationContext {
            api: ApiMetadata::new("Echo", "/api/echo"),
            sessions: Arc::new(InMemorySessionStore::new(Duration::from_secs(60))),
        }
    }

    #[tokio::test]
    async fn test_echo_keeps_thread_state() {
        let ctx = ctx();
        let first = EchoHandler
            .handle(&ctx, Invocation::new().with_field("message", json!("one")))
            .await
            .unwrap();
        let thread_id = first["thread_id"].as_str().unwrap().to_string();
        assert_eq!(first["turns"], json!(1));

        let second = EchoHandler
            .handle(
                &ctx,
                Invocation::new()
                    .with_field("message", json!("two"))
                    .with_field("thread_id", json!(thread_id.clone())),
            )
            .await
            .unwrap();
        assert_eq!(second["thread_id"], json!(thread_id));
        assert_eq!(second["turns"], json!(2));
        assert_eq!(
            ctx.sessions.get(&thread_id),
            Some(json!({"messages": ["one", "two"]}))
        );
    }

    #[tokio::test]
    async fn test_echo_new_thread_without_id() {
        let ctx = ctx();
        let a = EchoHandler
            .handle(&ctx, Invocation::new().with_field("message", json!("a")))
            .await
            .unwrap();
        let b = EchoHandler
            .handle(&ctx, Invocation::new().with_field("message", json!("b")))
            .await
            .unwrap();
        assert_ne!(a["thread_id"], b["thread_id"]);
        assert_eq!(b["turns"], json!(1));
    }

    #[tokio::test]
    async fn test_echo_requires_message() {
        let err = EchoHandler
            .handle(&ctx(), Invocation::new())
            .await
            .unwrap_err();
        assert_eq!(err, InvocationError::BadRequest("Message is required".to_string()));
    }

    #[tokio::test]
    async fn test_inspect_reports_files() {
        let request = Invocation::new().with_field("note", json!("hi")).with_file(
            "doc",
            UploadedFile::new("a.pdf", Some("application/pdf".to_string()), vec![1, 2, 3]),
        );
        let body = InspectHandler.handle(&ctx(), request).await.unwrap();
        assert_eq!(body["fields"], json!({"note": "hi"}));
        assert_eq!(body["files"][0]["size"], json!(3));
        assert_eq!(body["files"][0]["fileName"], json!("a.pdf"));
    }
}
