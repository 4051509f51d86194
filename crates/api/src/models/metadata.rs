use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// HTTP verb accepted by an endpoint. Exactly one per record.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    pub fn parse(verb: &str) -> Option<Self> {
        match verb.to_ascii_uppercase().as_str() {
            "GET" => Some(Method::Get),
            "POST" => Some(Method::Post),
            "PUT" => Some(Method::Put),
            "PATCH" => Some(Method::Patch),
            "DELETE" => Some(Method::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a record groups other records or serves requests itself.
///
/// The tag is declared in the descriptor. Discovery never infers it; placement
/// in the tree depends only on descriptor presence.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApiKind {
    Category,
    #[default]
    Endpoint,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Array,
    Object,
    File,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Array => "array",
            ParamType::Object => "object",
            ParamType::File => "file",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Element type of an array parameter.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct ItemSpec {
    #[serde(rename = "type")]
    pub kind: ParamType,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct Parameter {
    #[serde(rename = "type")]
    pub kind: ParamType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
    /// Allowed values, in display order.
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<ItemSpec>,
    /// Nested fields of an `object` parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Parameter>>,
    #[serde(rename = "mimeTypes", default, skip_serializing_if = "Option::is_none")]
    pub mime_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl Parameter {
    pub fn new(kind: ParamType) -> Self {
        Self {
            kind,
            required: false,
            description: String::new(),
            allowed: None,
            items: None,
            properties: None,
            mime_types: None,
            default: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_allowed<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_mime_types<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mime_types = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }
}

/// Documented response field. Never checked against real responses.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct ResponseSpec {
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, FieldSpec>>,
}

/// A response field that callers round-trip into their next request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct StateVar {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    /// Field of the JSON response carrying the current value.
    pub key: String,
    #[serde(default)]
    pub persist: bool,
}

/// Declarative description of one cataloged endpoint or category.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct ApiMetadata {
    pub name: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub method: Method,
    #[serde(default)]
    pub kind: ApiKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
    #[serde(default)]
    pub parameters: IndexMap<String, Parameter>,
    #[serde(default)]
    pub responses: IndexMap<String, ResponseSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<IndexMap<String, StateVar>>,
    #[serde(rename = "subApis", default, skip_serializing_if = "Option::is_none")]
    pub sub_apis: Option<Vec<ApiMetadata>>,
    /// Descriptor fields this model does not know about, kept as written.
    #[serde(flatten)]
    #[schemars(skip)]
    pub extra: Map<String, Value>,
}

impl ApiMetadata {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            description: String::new(),
            method: Method::default(),
            kind: ApiKind::default(),
            handler: None,
            parameters: IndexMap::new(),
            responses: IndexMap::new(),
            state: None,
            sub_apis: None,
            extra: Map::new(),
        }
    }

    pub fn is_category(&self) -> bool {
        self.kind == ApiKind::Category
    }

    /// Attach child records. An empty list leaves `subApis` absent.
    pub fn with_sub_apis(mut self, children: Vec<ApiMetadata>) -> Self {
        self.sub_apis = if children.is_empty() {
            None
        } else {
            Some(children)
        };
        self
    }

    pub fn sub_apis(&self) -> &[ApiMetadata] {
        self.sub_apis.as_deref().unwrap_or(&[])
    }

    /// Depth-first search of this record and its descendants by endpoint.
    pub fn find(&self, endpoint: &str) -> Option<&ApiMetadata> {
        if self.endpoint == endpoint {
            return Some(self);
        }
        self.sub_apis().iter().find_map(|child| child.find(endpoint))
    }

    /// State variables marked for round-tripping.
    pub fn persisted_state(&self) -> impl Iterator<Item = (&String, &StateVar)> {
        self.state
            .iter()
            .flat_map(|vars| vars.iter())
            .filter(|(_, var)| var.persist)
    }

    /// True when any parameter must be sent as multipart form data.
    pub fn accepts_files(&self) -> bool {
        self.parameters
            .values()
            .any(|param| param.kind == ParamType::File)
    }
}

/// Finds a record by endpoint anywhere in a catalog.
pub fn find_in<'a>(apis: &'a [ApiMetadata], endpoint: &str) -> Option<&'a ApiMetadata> {
    apis.iter().find_map(|api| api.find(endpoint))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_stateful_descriptor() {
        let raw = json!({
            "name": "React Memory Agent",
            "endpoint": "/api/langgraph/react-memory",
            "description": "Agent with memory",
            "method": "POST",
            "parameters": {
                "message": {"type": "string", "description": "The message to process", "required": true}
            },
            "state": {
                "thread_id": {
                    "type": "string",
                    "description": "Conversation thread",
                    "key": "thread_id",
                    "persist": true
                }
            },
            "responses": {
                "200": {
                    "description": "Successful response",
                    "content": {"response": {"type": "string", "description": "Reply"}}
                },
                "400": {"description": "Bad request - message is missing"}
            }
        });

        let api: ApiMetadata = serde_json::from_value(raw).unwrap();
        assert_eq!(api.method, Method::Post);
        assert_eq!(api.kind, ApiKind::Endpoint);
        assert!(api.parameters["message"].required);
        assert_eq!(api.responses.keys().collect::<Vec<_>>(), vec!["200", "400"]);
        assert!(api.responses["400"].content.is_none());
        let persisted: Vec<_> = api.persisted_state().map(|(name, _)| name.as_str()).collect();
        assert_eq!(persisted, vec!["thread_id"]);
        assert!(api.sub_apis.is_none());
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let raw = json!({
            "name": "Docs",
            "method": "GET",
            "owner": "platform-team",
            "tags": ["beta"]
        });
        let api: ApiMetadata = serde_json::from_value(raw).unwrap();
        assert_eq!(api.extra.get("owner"), Some(&json!("platform-team")));

        let back = serde_json::to_value(&api).unwrap();
        assert_eq!(back["tags"], json!(["beta"]));
        assert!(back.get("subApis").is_none());
        assert!(back.get("state").is_none());
    }

    #[test]
    fn test_rejects_unknown_parameter_type() {
        let raw = json!({
            "name": "Bad",
            "parameters": {"n": {"type": "number"}}
        });
        assert!(serde_json::from_value::<ApiMetadata>(raw).is_err());
    }

    #[test]
    fn test_rejects_multiple_methods() {
        let raw = json!({"name": "Bad", "method": ["GET", "POST"]});
        assert!(serde_json::from_value::<ApiMetadata>(raw).is_err());
    }

    #[test]
    fn test_empty_children_normalize_to_absent() {
        let api = ApiMetadata::new("Cat", "/cat").with_sub_apis(vec![]);
        assert!(api.sub_apis.is_none());
        assert!(api.sub_apis().is_empty());
    }

    #[test]
    fn test_find_nested() {
        let tree = vec![
            ApiMetadata::new("A", "/a")
                .with_sub_apis(vec![ApiMetadata::new("X", "/a/x"), ApiMetadata::new("Y", "/a/y")]),
            ApiMetadata::new("B", "/b"),
        ];
        assert_eq!(find_in(&tree, "/a/y").map(|api| api.name.as_str()), Some("Y"));
        assert_eq!(find_in(&tree, "/b").map(|api| api.name.as_str()), Some("B"));
        assert!(find_in(&tree, "/c").is_none());
    }

    #[test]
    fn test_accepts_files() {
        let mut api = ApiMetadata::new("Upload", "/upload");
        assert!(!api.accepts_files());
        api.parameters
            .insert("doc".to_string(), Parameter::new(ParamType::File).required());
        assert!(api.accepts_files());
    }
}
