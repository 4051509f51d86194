use crate::AppState;
use crate::body::read_invocation;
use crate::error::{HttpError, json_response};
use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use routescope_api::{InvocationError, Method};
use tracing::debug;

const DISCOVERY_SUFFIX: &str = "/discovery";
const ALLOWED_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";

/// What a request path asks for once the mount is accounted for.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Target {
    /// `{mount}/discovery`
    Catalog,
    /// `{endpoint}/discovery`
    Describe(String),
    /// `{endpoint}`
    Invoke(String),
}

/// Under a root mount `/discovery` is always the catalog; a self-describing
/// root shows up as that listing's only entry and is invoked at `/`.
pub(crate) fn target(mount: &str, path: &str) -> Target {
    let path = match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    };
    match path.strip_suffix(DISCOVERY_SUFFIX) {
        Some(base) if base == mount => Target::Catalog,
        Some("") => Target::Describe("/".to_string()),
        Some(base) => Target::Describe(base.to_string()),
        None => Target::Invoke(path.to_string()),
    }
}

pub(crate) async fn dispatch(State(state): State<AppState>, req: Request) -> Response {
    if req.method() == axum::http::Method::OPTIONS {
        return preflight();
    }

    let path = req.uri().path().to_string();
    let verb = req.method().to_string();
    debug!("{} {}", verb, path);

    let result = match target(state.catalog.mount().as_str(), &path) {
        Target::Catalog => match require_get(&verb, &path) {
            Ok(()) => {
                let apis = state.catalog.discover().await;
                return json_response(StatusCode::OK, &apis);
            }
            Err(e) => Err(e),
        },
        Target::Describe(endpoint) => match require_get(&verb, &path) {
            Ok(()) => match state.catalog.lookup(&endpoint).await {
                Some(api) => return json_response(StatusCode::OK, &api),
                None => Err(InvocationError::NotFound(endpoint)),
            },
            Err(e) => Err(e),
        },
        Target::Invoke(endpoint) => invoke(&state, endpoint, &verb, req).await,
    };

    match result {
        Ok(body) => json_response(StatusCode::OK, &body),
        Err(e) => {
            debug!("{} {} failed: {}", verb, path, e);
            HttpError(e).into_response()
        }
    }
}

async fn invoke(
    state: &AppState,
    endpoint: String,
    verb: &str,
    req: Request,
) -> Result<serde_json::Map<String, serde_json::Value>, InvocationError> {
    let method = Method::parse(verb).ok_or_else(|| InvocationError::MethodNotAllowed {
        endpoint: endpoint.clone(),
        method: verb.to_string(),
        expected: "GET, POST, PUT, PATCH or DELETE".to_string(),
    })?;
    let request = read_invocation(req).await?;
    state.dispatcher.invoke(&endpoint, method, request).await
}

fn require_get(verb: &str, path: &str) -> Result<(), InvocationError> {
    if verb == "GET" {
        Ok(())
    } else {
        Err(InvocationError::MethodNotAllowed {
            endpoint: path.to_string(),
            method: verb.to_string(),
            expected: "GET".to_string(),
        })
    }
}

fn preflight() -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    response
}
