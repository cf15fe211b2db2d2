use http::StatusCode;
use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::body::Bytes;
use hyper::Response;

use crate::error::{ProxyError, Result};

type RespBody = BoxBody<Bytes, hyper::Error>;

/// Build a bodyless response carrying a 4xx/5xx status.
pub(crate) fn synthetic_error_response(status_code: StatusCode) -> Result<Response<RespBody>> {
    let res = Response::builder()
        .status(status_code)
        .body(empty_body())
        .map_err(|e| ProxyError::Http(format!("failed to build error response: {e}")))?;
    Ok(res)
}

/// 401 with the `WWW-Authenticate` challenge the auth gate promises on failure.
pub(crate) fn unauthorized_response() -> Result<Response<RespBody>> {
    let res = Response::builder()
        .status(StatusCode::UNAUTHORIZED)
        .header("WWW-Authenticate", r#"Basic realm="basic""#)
        .body(empty_body())
        .map_err(|e| ProxyError::Http(format!("failed to build 401 response: {e}")))?;
    Ok(res)
}

fn empty_body() -> RespBody {
    Full::new(Bytes::new()).map_err(|never| match never {}).boxed()
}
