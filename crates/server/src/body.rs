//! Turns an HTTP request into the flat field mapping handlers consume.

use crate::error::rejected;
use axum::Form;
use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::{FromRequest, Multipart, Query, Request};
use axum::http::header::CONTENT_TYPE;
use routescope_api::{Invocation, InvocationError, UploadedFile};
use serde_json::{Map, Value};

enum BodyKind {
    Multipart,
    Form,
    Json,
}

fn body_kind(req: &Request) -> BodyKind {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_ascii_lowercase();
    if content_type.starts_with("multipart/form-data") {
        BodyKind::Multipart
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        BodyKind::Form
    } else {
        BodyKind::Json
    }
}

/// Read the request body. Multipart parts with a file name become files,
/// every other part a text field. An empty body falls back to the query string.
pub async fn read_invocation(req: Request) -> Result<Invocation, InvocationError> {
    match body_kind(&req) {
        BodyKind::Multipart => read_multipart(req).await,
        BodyKind::Form => {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, &())
                .await
                .map_err(|e| rejected(e.status(), e.body_text()))?;
            Ok(Invocation::from_fields(text_fields(pairs)))
        }
        BodyKind::Json => {
            let query = query_fields(&req)?;
            let bytes = Bytes::from_request(req, &())
                .await
                .map_err(|e| rejected(e.status(), e.body_text()))?;
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(Invocation::from_fields(query));
            }
            parse_json(&bytes).map(Invocation::from_fields)
        }
    }
}

fn parse_json(bytes: &[u8]) -> Result<Map<String, Value>, InvocationError> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(InvocationError::BadRequest(
            "Request body must be a JSON object".to_string(),
        )),
        Err(e) => Err(InvocationError::BadRequest(format!(
            "Invalid JSON body: {}",
            e
        ))),
    }
}

fn query_fields(req: &Request) -> Result<Map<String, Value>, InvocationError> {
    if req.uri().query().is_none() {
        return Ok(Map::new());
    }
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(req.uri())
        .map_err(|e| rejected(e.status(), e.body_text()))?;
    Ok(text_fields(pairs))
}

fn text_fields(pairs: Vec<(String, String)>) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(name, value)| (name, Value::String(value)))
        .collect()
}

async fn read_multipart(req: Request) -> Result<Invocation, InvocationError> {
    let mut multipart = Multipart::from_request(req, &())
        .await
        .map_err(|e| rejected(e.status(), e.body_text()))?;

    let mut request = Invocation::new();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                request
                    .files
                    .insert(name, UploadedFile::new(file_name, content_type, bytes.to_vec()));
            }
            None => {
                let text = field.text().await.map_err(multipart_error)?;
                request.fields.insert(name, Value::String(text));
            }
        }
    }
    Ok(request)
}

fn multipart_error(err: MultipartError) -> InvocationError {
    rejected(err.status(), err.body_text())
}
