use std::sync::Arc;
use std::time::Duration;

use http::header::{AUTHORIZATION, CONNECTION, HOST};
use http::Request;
use http_body_util::combinators::BoxBody;
use hyper::body::{Bytes, Incoming};
use hyper::Response;
use opentelemetry::KeyValue;
use tokio::time::Instant;

use crate::auth::CredentialTable;
use crate::proxy::http_result::{HttpError, HttpResult};
use crate::table::{BackendTable, Lookup};
use crate::telemetry::Metrics;

type RespBody = BoxBody<Bytes, hyper::Error>;

/// Auth-gate -> route -> forward -> header-scrub, as one request.
///
/// Auth is bypassed entirely when no users are configured; otherwise a
/// missing or mismatched `Authorization` header fails the whole request
/// before routing is attempted.
pub async fn handle(
    mut req: Request<Incoming>,
    table: Arc<BackendTable>,
    credentials: Arc<CredentialTable>,
    request_timeout: Duration,
    metrics: Option<Arc<Metrics>>,
) -> HttpResult<Response<RespBody>> {
    let start = Instant::now();
    let method = req.method().to_string();

    if credentials.is_enabled() {
        let header = req.headers().get(AUTHORIZATION).map(|v| v.as_bytes());
        if !credentials.authenticate(header) {
            record(&metrics, &method, HttpError::AuthRequired.error_type(), start);
            return Err(HttpError::AuthRequired);
        }
    }

    let host = req
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let result = match table.lookup(&host) {
        Lookup::NotFound => Err(HttpError::UnknownHost),
        Lookup::EmptyPool => Err(HttpError::EmptyPool),
        Lookup::Pool(pool) => {
            req.headers_mut().remove(CONNECTION);
            match pool.forward(req, request_timeout).await {
                Ok(mut resp) => {
                    resp.headers_mut().remove(CONNECTION);
                    Ok(resp)
                }
                Err(e) => Err(e),
            }
        }
    };

    let error_type = result.as_ref().err().map(HttpError::error_type).unwrap_or("none");
    record(&metrics, &method, error_type, start);
    result
}

fn record(metrics: &Option<Arc<Metrics>>, method: &str, error_type: &str, start: Instant) {
    let Some(m) = metrics else { return };
    let duration = start.elapsed().as_secs_f64();
    m.requests_total.add(1, &[KeyValue::new("method", method.to_string())]);
    m.requests_duration_seconds.record(duration, &[KeyValue::new("method", method.to_string())]);
    if error_type != "none" {
        m.errors_total.add(1, &[KeyValue::new("error_type", error_type.to_string())]);
    }
}
