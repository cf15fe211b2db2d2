#![allow(dead_code)]

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hostrelay_lib::auth::CredentialTable;
use hostrelay_lib::config::{Backend, KeepAliveConfig, Server, TimeoutConfig};
use hostrelay_lib::proxy::handler::handle;
use hostrelay_lib::proxy::to_response;
use hostrelay_lib::table::BackendTable;
use hyper::body::{Bytes, Incoming};
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::sleep;

type RespBody = BoxBody<Bytes, hyper::Error>;

/// Bind an ephemeral loopback listener and return its address.
async fn bind_ephemeral() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind ephemeral");
    let addr = listener.local_addr().expect("local_addr");
    (listener, addr)
}

/// Spawn a minimal upstream server that always answers with `body` and
/// `status`, tracking how many requests it served.
pub struct UpstreamServer {
    pub addr: SocketAddr,
    pub hits: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl UpstreamServer {
    pub async fn spawn(body: &'static str, status: StatusCode) -> Self {
        let (listener, addr) = bind_ephemeral().await;
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_for_task = Arc::clone(&hits);

        let handle = tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(v) => v,
                    Err(_) => continue,
                };
                let hits = Arc::clone(&hits_for_task);
                tokio::spawn(async move {
                    let svc = hyper::service::service_fn(move |_req: Request<Incoming>| {
                        hits.fetch_add(1, Ordering::SeqCst);
                        let resp: Response<RespBody> = Response::builder()
                            .status(status)
                            .body(Full::new(Bytes::from_static(body.as_bytes())).boxed())
                            .unwrap();
                        async move { Ok::<_, Infallible>(resp) }
                    });
                    let builder = ConnBuilder::new(TokioExecutor::new());
                    let _ = builder.serve_connection(TokioIo::new(stream), svc).await;
                });
            }
        });

        sleep(Duration::from_millis(20)).await;
        Self { addr, hits, handle }
    }

    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for UpstreamServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawn the proxy's own request-handling pipeline (auth -> route -> forward)
/// behind a real listener, without the signal-driven reload/shutdown loop in
/// [`hostrelay_lib::proxy::run`] — tests drive reloads directly against the
/// shared [`BackendTable`] instead of via SIGHUP.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub table: Arc<BackendTable>,
    pub credentials: Arc<CredentialTable>,
    handle: JoinHandle<()>,
}

impl TestProxy {
    pub async fn spawn(table: Arc<BackendTable>, credentials: Arc<CredentialTable>) -> Self {
        let (listener, addr) = bind_ephemeral().await;
        let table_for_task = Arc::clone(&table);
        let credentials_for_task = Arc::clone(&credentials);

        let handle = tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(v) => v,
                    Err(_) => continue,
                };
                let table = Arc::clone(&table_for_task);
                let credentials = Arc::clone(&credentials_for_task);
                tokio::spawn(async move {
                    let svc = hyper::service::service_fn(move |req: Request<Incoming>| {
                        let table = Arc::clone(&table);
                        let credentials = Arc::clone(&credentials);
                        async move {
                            let outcome =
                                handle(req, table, credentials, Duration::from_secs(5), None).await;
                            Ok::<_, Infallible>(to_response(outcome))
                        }
                    });
                    let builder = ConnBuilder::new(TokioExecutor::new());
                    let _ = builder.serve_connection(TokioIo::new(stream), svc).await;
                });
            }
        });

        sleep(Duration::from_millis(20)).await;
        Self { addr, table, credentials, handle }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn backend_of(addresses: &[SocketAddr]) -> Backend {
    Backend { servers: addresses.iter().map(|a| Server { address: a.to_string() }).collect() }
}

pub fn timeout_config() -> TimeoutConfig {
    TimeoutConfig {
        connect_ms: 5000,
        request_secs: 30,
        shutdown_secs: 30,
        keep_alive: KeepAliveConfig { enabled: true, timeout_secs: 60 },
    }
}
