use std::time::Duration;

use http::Request;
use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::addr::normalize_address;
use crate::config::{KeepAliveConfig, Server, TimeoutConfig};
use crate::error::Result;
use crate::load_balancing::RoundRobin;
use crate::proxy::http_result::{HttpError, HttpResult};

type RespBody = BoxBody<Bytes, hyper::Error>;
type HttpClient = Client<HttpConnector, Full<Bytes>>;

/// One backend's upstream endpoints, normalized at build time. Immutable
/// once built; a [`crate::table::BackendTable`] reload replaces the whole
/// pool rather than mutating it.
pub struct Pool {
    endpoints: Vec<String>,
    client: HttpClient,
    rr: RoundRobin,
}

impl Pool {
    /// Build a pool from the configured servers for one backend. Every
    /// address is normalized up front; the first failure aborts the build
    /// so a reload never installs a half-valid pool.
    pub fn build(servers: &[Server], timeout: &TimeoutConfig) -> Result<Self> {
        let endpoints = servers
            .iter()
            .map(|s| normalize_address(&s.address))
            .collect::<Result<Vec<_>>>()?;

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_millis(timeout.connect_ms)));
        if timeout.keep_alive.enabled {
            connector.set_keepalive(Some(Duration::from_secs(timeout.keep_alive.timeout_secs)));
        } else {
            connector.set_keepalive(None);
        }

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self { endpoints, client, rr: RoundRobin::new() })
    }

    /// A backend with zero servers yields a null pool: known host, no
    /// upstream available.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Select one endpoint per call (round-robin), retrying the next
    /// endpoint within the same call budget on failure or timeout. The
    /// request body is buffered so it can be replayed across attempts.
    pub async fn forward(
        &self,
        req: Request<Incoming>,
        call_timeout: Duration,
    ) -> HttpResult<hyper::Response<RespBody>> {
        let n = self.endpoints.len();
        if n == 0 {
            return Err(HttpError::EmptyPool);
        }

        let (parts, body) = req.into_parts();
        let method = parts.method;
        let version = parts.version;
        let headers = parts.headers;
        let body_bytes = body
            .collect()
            .await
            .map(|collected| collected.to_bytes())
            .map_err(|e| HttpError::UpstreamUnavailable(e.to_string()))?;

        let start = self.rr.next(n);
        let mut last_error = String::from("no upstream endpoints configured");

        for offset in 0..n {
            let endpoint = &self.endpoints[(start + offset) % n];
            let uri = match rewrite_uri(endpoint, &parts.uri) {
                Ok(uri) => uri,
                Err(e) => {
                    last_error = e;
                    continue;
                }
            };

            let mut builder = Request::builder().method(method.clone()).uri(uri).version(version);
            if let Some(h) = builder.headers_mut() {
                *h = headers.clone();
            }
            let out_req = match builder.body(Full::new(body_bytes.clone())) {
                Ok(r) => r,
                Err(e) => {
                    last_error = e.to_string();
                    continue;
                }
            };

            match tokio::time::timeout(call_timeout, self.client.request(out_req)).await {
                Ok(Ok(resp)) => return Ok(resp.map(|b| b.boxed())),
                Ok(Err(e)) => last_error = e.to_string(),
                Err(_) => last_error = format!("timed out after {call_timeout:?}"),
            }
        }

        Err(HttpError::UpstreamUnavailable(last_error))
    }
}

fn rewrite_uri(endpoint: &str, original: &http::Uri) -> std::result::Result<http::Uri, String> {
    let path_and_query = original.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    format!("http://{endpoint}{path_and_query}")
        .parse()
        .map_err(|e| format!("{endpoint}: {e}"))
}
