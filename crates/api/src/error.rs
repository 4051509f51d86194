#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Failure of a single endpoint invocation, mapped onto an HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvocationError {
    #[error("{0}")]
    BadRequest(String),
    #[error("API not found: {0}")]
    NotFound(String),
    #[error("Method {method} not allowed for {endpoint}, expected {expected}")]
    MethodNotAllowed {
        endpoint: String,
        method: String,
        expected: String,
    },
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("No handler available for {0}")]
    NotImplemented(String),
    #[error("Upstream service failed: {0}")]
    Upstream(String),
}

impl InvocationError {
    pub fn status_code(&self) -> u16 {
        match self {
            InvocationError::BadRequest(_) => 400,
            InvocationError::NotFound(_) => 404,
            InvocationError::MethodNotAllowed { .. } => 405,
            InvocationError::PayloadTooLarge(_) => 413,
            InvocationError::Internal(_) => 500,
            InvocationError::NotImplemented(_) => 501,
            InvocationError::Upstream(_) => 502,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

impl From<ApiError> for InvocationError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotFound(what) => InvocationError::NotFound(what),
        }
    }
}
