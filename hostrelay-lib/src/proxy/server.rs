use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use http::StatusCode;
use http_body_util::{combinators::BoxBody, BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::Request;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};

use crate::auth::CredentialTable;
use crate::config;
use crate::error::{ProxyError, Result};
use crate::proxy::handler::handle;
use crate::proxy::http_result::HttpError;
use crate::proxy::synthetic_response::{synthetic_error_response, unauthorized_response};
use crate::table::BackendTable;
use crate::telemetry::Metrics;

type RespBody = BoxBody<Bytes, hyper::Error>;

/// Bind the listener. Port `0` asks the OS for an ephemeral port; the
/// actually-bound port is returned alongside the listener for callers that
/// need to observe it (tests, logs).
pub async fn bind(port: u16) -> Result<(TcpListener, u16)> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await.map_err(ProxyError::Bind)?;
    let bound_port = listener.local_addr().map_err(ProxyError::Bind)?.port();
    Ok((listener, bound_port))
}

/// Serve connections until SIGINT or SIGTERM. SIGHUP reloads `config_path`
/// into `table`; SIGUSR1 dumps the current backend table to stdout. There
/// is no request-draining on stop: the accept loop simply exits.
#[allow(clippy::too_many_arguments)]
pub async fn run(
    listener: TcpListener,
    table: Arc<BackendTable>,
    credentials: Arc<CredentialTable>,
    metrics: Option<Arc<Metrics>>,
    request_timeout: Duration,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let builder = ConnBuilder::new(TokioExecutor::new());

    let mut sighup = signal(SignalKind::hangup()).map_err(ProxyError::Io)?;
    let mut sigusr1 = signal(SignalKind::user_defined1()).map_err(ProxyError::Io)?;
    let mut sigint = signal(SignalKind::interrupt()).map_err(ProxyError::Io)?;
    let mut sigterm = signal(SignalKind::terminate()).map_err(ProxyError::Io)?;

    let port = listener.local_addr().map(|a| a.port()).unwrap_or_default();
    info!(port, "proxy listening");

    loop {
        tokio::select! {
            _ = sighup.recv() => {
                reload(&table, config_path.as_deref(), metrics.as_ref());
            }
            _ = sigusr1.recv() => {
                dump(&table);
            }
            _ = sigint.recv() => {
                info!("received SIGINT, stopping");
                break;
            }
            _ = sigterm.recv() => {
                info!("received SIGTERM, stopping");
                break;
            }
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(v) => v,
                    Err(e) => {
                        warn!(error = %e, "accept error");
                        continue;
                    }
                };

                let builder = builder.clone();
                let table = Arc::clone(&table);
                let credentials = Arc::clone(&credentials);
                let metrics = metrics.clone();

                if let Some(ref m) = metrics {
                    m.connections_total.add(1, &[]);
                    m.connections_active.add(1, &[]);
                }

                tokio::spawn(async move {
                    let connection_metrics = metrics.clone();
                    let svc = hyper::service::service_fn(move |req: Request<Incoming>| {
                        let table = Arc::clone(&table);
                        let credentials = Arc::clone(&credentials);
                        let metrics = metrics.clone();
                        async move {
                            let outcome = handle(req, table, credentials, request_timeout, metrics).await;
                            Ok::<_, hyper::Error>(to_response(outcome))
                        }
                    });

                    if let Err(e) = builder.serve_connection(TokioIo::new(stream), svc).await {
                        warn!(?peer, error = %e, "serve_connection error");
                    }

                    if let Some(ref m) = connection_metrics {
                        m.connections_active.add(-1, &[]);
                    }
                });
            }
        }
    }

    info!("proxy stopped");
    Ok(())
}

/// Map a request outcome to the response actually sent on the wire. Shared
/// by the real accept loop above and by test harnesses that drive
/// [`crate::proxy::handler::handle`] directly, so both exercise the same
/// status/header mapping (including the `WWW-Authenticate` challenge).
pub fn to_response(outcome: HttpResultAlias) -> hyper::Response<RespBody> {
    match outcome {
        Ok(resp) => resp,
        Err(HttpError::AuthRequired) => unauthorized_response()
            .unwrap_or_else(|_| emergency_response(StatusCode::INTERNAL_SERVER_ERROR)),
        Err(e) => {
            error!(error = %e, "request failed");
            let status = StatusCode::from(e);
            synthetic_error_response(status)
                .unwrap_or_else(|_| emergency_response(StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

type HttpResultAlias = std::result::Result<hyper::Response<RespBody>, HttpError>;

fn emergency_response(status: StatusCode) -> hyper::Response<RespBody> {
    let body: RespBody = Full::new(Bytes::new()).map_err(|never| match never {}).boxed();
    let mut resp = hyper::Response::new(body);
    *resp.status_mut() = status;
    resp
}

fn reload(table: &Arc<BackendTable>, config_path: Option<&Path>, metrics: Option<&Arc<Metrics>>) {
    let Some(path) = config_path else {
        warn!("SIGHUP received but no config file path was given at startup, ignoring");
        return;
    };
    let outcome = match config::load_from_path(path) {
        Ok(cfg) => match table.load(&cfg.backends) {
            Ok(()) => {
                info!(backends = cfg.backends.len(), "backend table reloaded");
                "ok"
            }
            Err(e) => {
                warn!(error = %e, "reload rejected, keeping prior backend table");
                "rejected"
            }
        },
        Err(e) => {
            warn!(error = %e, "failed to read config file, keeping prior backend table");
            "config_load_failed"
        }
    };
    if let Some(m) = metrics {
        m.reloads_total.add(1, &[opentelemetry::KeyValue::new("outcome", outcome)]);
    }
}

fn dump(table: &Arc<BackendTable>) {
    print!("{}", table.dump());
}
