use http::StatusCode;
use thiserror::Error;

pub(crate) type HttpResult<T> = std::result::Result<T, HttpError>;

/// Per-request failure. The response status code this maps to *is* the
/// error channel; nothing here is logged as a server-side error except
/// [`HttpError::ResponseBuild`].
#[derive(Debug, Error, Clone)]
pub enum HttpError {
    #[error("missing or invalid credentials")]
    AuthRequired,

    #[error("no backend for host")]
    UnknownHost,

    #[error("backend has no upstreams")]
    EmptyPool,

    #[error("upstream call failed: {0}")]
    UpstreamUnavailable(String),

    #[error("failed to build response: {0}")]
    ResponseBuild(String),
}

impl HttpError {
    pub fn error_type(&self) -> &'static str {
        match self {
            HttpError::AuthRequired => "auth_required",
            HttpError::UnknownHost => "unknown_host",
            HttpError::EmptyPool => "empty_pool",
            HttpError::UpstreamUnavailable(_) => "upstream_unavailable",
            HttpError::ResponseBuild(_) => "response_build",
        }
    }
}

impl From<HttpError> for StatusCode {
    fn from(e: HttpError) -> StatusCode {
        match e {
            HttpError::AuthRequired => StatusCode::UNAUTHORIZED,
            HttpError::UnknownHost => StatusCode::NOT_FOUND,
            HttpError::EmptyPool => StatusCode::SERVICE_UNAVAILABLE,
            HttpError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            HttpError::ResponseBuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
