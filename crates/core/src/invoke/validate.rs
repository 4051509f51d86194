//! Checks an incoming request against the parameters a record declares.

use routescope_api::{ApiMetadata, Invocation, InvocationError, ParamType, Parameter};
use serde_json::Value;

/// Validate `request` against `api` and fill in declared defaults.
///
/// Fields the record does not declare are passed through untouched; state
/// variables travel that way.
pub fn prepare(api: &ApiMetadata, request: &mut Invocation) -> Result<(), InvocationError> {
    for (name, param) in &api.parameters {
        if param.kind == ParamType::File {
            check_file(name, param, request)?;
            continue;
        }

        if request.files.contains_key(name) {
            return Err(InvocationError::BadRequest(format!(
                "Parameter '{}' must be a {}, not a file",
                name, param.kind
            )));
        }

        let present = request.fields.get(name).is_some_and(|v| !is_blank(v));
        if let Some(value) = request.fields.get_mut(name).filter(|_| present) {
            coerce(param, value);
            check_value(name, param, value)?;
        } else if let Some(default) = &param.default {
            request.fields.insert(name.clone(), default.clone());
        } else if param.required {
            return Err(InvocationError::BadRequest(format!(
                "Missing required parameter: {}",
                name
            )));
        }
    }
    Ok(())
}

/// Form submissions carry every field as text. Arrays and objects sent that
/// way are accepted when the text is JSON of the declared shape.
fn coerce(param: &Parameter, value: &mut Value) {
    let Value::String(text) = value else {
        return;
    };
    let parsed = match param.kind {
        ParamType::Array | ParamType::Object => serde_json::from_str::<Value>(text).ok(),
        _ => None,
    };
    if let Some(parsed) = parsed {
        let shape_ok = match param.kind {
            ParamType::Array => parsed.is_array(),
            _ => parsed.is_object(),
        };
        if shape_ok {
            *value = parsed;
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn check_file(name: &str, param: &Parameter, request: &Invocation) -> Result<(), InvocationError> {
    let Some(file) = request.files.get(name) else {
        if param.required {
            return Err(InvocationError::BadRequest(format!(
                "Missing required file: {}",
                name
            )));
        }
        if request.fields.contains_key(name) {
            return Err(InvocationError::BadRequest(format!(
                "Parameter '{}' must be uploaded as a file",
                name
            )));
        }
        return Ok(());
    };

    if let Some(accepted) = &param.mime_types {
        let content_type = file.content_type.as_deref().unwrap_or("");
        if !accepted.iter().any(|mime| mime_matches(mime, content_type)) {
            return Err(InvocationError::BadRequest(format!(
                "File '{}' has unsupported type '{}', expected one of: {}",
                name,
                content_type,
                accepted.join(", ")
            )));
        }
    }
    Ok(())
}

/// `image/*` style wildcards match any subtype.
fn mime_matches(accepted: &str, actual: &str) -> bool {
    let actual = actual.split(';').next().unwrap_or("").trim();
    if let Some(major) = accepted.strip_suffix("/*") {
        return actual
            .split_once('/')
            .is_some_and(|(m, _)| m.eq_ignore_ascii_case(major));
    }
    accepted.eq_ignore_ascii_case(actual)
}

fn check_value(name: &str, param: &Parameter, value: &Value) -> Result<(), InvocationError> {
    let type_ok = match param.kind {
        ParamType::String => value.is_string(),
        ParamType::Array => value.is_array(),
        ParamType::Object => value.is_object(),
        ParamType::File => false,
    };
    if !type_ok {
        return Err(InvocationError::BadRequest(format!(
            "Parameter '{}' must be of type {}",
            name, param.kind
        )));
    }

    if let (Some(allowed), Some(s)) = (&param.allowed, value.as_str()) {
        if !allowed.iter().any(|a| a == s) {
            return Err(InvocationError::BadRequest(format!(
                "Parameter '{}' must be one of: {}",
                name,
                allowed.join(", ")
            )));
        }
    }

    if let (Some(items), Some(values)) = (&param.items, value.as_array()) {
        let item_ok = |v: &Value| match items.kind {
            ParamType::String => v.is_string(),
            ParamType::Array => v.is_array(),
            ParamType::Object => v.is_object(),
            ParamType::File => false,
        };
        if !values.iter().all(item_ok) {
            return Err(InvocationError::BadRequest(format!(
                "Items of '{}' must be of type {}",
                name, items.kind
            )));
        }
    }

    if let (Some(properties), Some(object)) = (&param.properties, value.as_object()) {
        for (field, nested) in properties {
            let qualified = format!("{}.{}", name, field);
            match object.get(field) {
                Some(v) if !is_blank(v) => check_value(&qualified, nested, v)?,
                _ if nested.required && nested.default.is_none() => {
                    return Err(InvocationError::BadRequest(format!(
                        "Missing required parameter: {}",
                        qualified
                    )));
                }
                _ => {}
            }
        }
    }

    Ok(())
}
