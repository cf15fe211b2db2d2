use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::{Backend, TimeoutConfig};
use crate::error::Result;
use crate::pool::Pool;

/// Outcome of a host lookup against the live backend table.
pub enum Lookup {
    /// Host is not a key in the table at all.
    NotFound,
    /// Host is known but its backend has no upstreams (a null pool).
    EmptyPool,
    /// Host resolved to a non-empty pool, ready to forward to.
    Pool(Arc<Pool>),
}

/// The public view and its derived pools are stored together behind one
/// atomic pointer so a reader always sees them as of the same `Load`; two
/// separately-swapped maps could momentarily disagree.
struct Snapshot {
    public: HashMap<String, Backend>,
    pools: HashMap<String, Option<Arc<Pool>>>,
}

/// Host-keyed routing table, hot-swappable while requests are in flight.
pub struct BackendTable {
    inner: ArcSwap<Snapshot>,
    timeout: TimeoutConfig,
}

impl BackendTable {
    pub fn new(timeout: TimeoutConfig) -> Self {
        Self {
            inner: ArcSwap::from_pointee(Snapshot { public: HashMap::new(), pools: HashMap::new() }),
            timeout,
        }
    }

    /// Build pools for every backend, normalizing every server address
    /// before anything is published. Any normalization failure rejects the
    /// whole reload and leaves the previous snapshot active.
    pub fn load(&self, backends: &HashMap<String, Backend>) -> Result<()> {
        let mut pools = HashMap::with_capacity(backends.len());
        for (name, backend) in backends {
            let pool = Pool::build(&backend.servers, &self.timeout)?;
            let entry = if pool.is_empty() { None } else { Some(Arc::new(pool)) };
            pools.insert(name.clone(), entry);
        }

        let snapshot = Snapshot { public: backends.clone(), pools };
        self.inner.store(Arc::new(snapshot));
        Ok(())
    }

    /// Look up the pool for a `Host` header value, stripping any `:port`
    /// suffix. Exact match only; no wildcards.
    pub fn lookup(&self, host: &str) -> Lookup {
        let key = host_key(host);
        let snapshot = self.inner.load();
        match snapshot.pools.get(key) {
            None => Lookup::NotFound,
            Some(None) => Lookup::EmptyPool,
            Some(Some(pool)) => Lookup::Pool(Arc::clone(pool)),
        }
    }

    /// Snapshot of the currently active public backend map.
    pub fn get_backends(&self) -> HashMap<String, Backend> {
        self.inner.load().public.clone()
    }

    /// Render the currently active backend table in the `BACKEND\tSERVER`
    /// tab-separated form used both at startup and on a SIGUSR1 dump.
    pub fn dump(&self) -> String {
        format_backend_dump(&self.get_backends())
    }
}

/// `BACKEND\tSERVER` tab-separated listing, one line per server; a backend
/// with no servers prints `---` for its one line. Repeated servers of the
/// same backend print `*` in the backend column, matching the original
/// `ShowBackendsConfig` tabwriter output.
pub fn format_backend_dump(backends: &HashMap<String, Backend>) -> String {
    let mut out = String::from("BACKEND\tSERVER\n");
    for (name, backend) in backends {
        if backend.servers.is_empty() {
            out.push_str(&format!("{name}\t---\n"));
            continue;
        }
        for (i, server) in backend.servers.iter().enumerate() {
            let label = if i == 0 { name.as_str() } else { "*" };
            out.push_str(&format!("{label}\t{}\n", server.address));
        }
    }
    out
}

/// Strip a `:port` suffix from a `Host` header value. Note this takes
/// everything *before* the first `:`, not up to and including it.
fn host_key(host: &str) -> &str {
    host.split(':').next().unwrap_or(host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{KeepAliveConfig, Server};

    fn timeout() -> TimeoutConfig {
        TimeoutConfig {
            connect_ms: 5000,
            request_secs: 30,
            shutdown_secs: 30,
            keep_alive: KeepAliveConfig { enabled: true, timeout_secs: 60 },
        }
    }

    #[test]
    fn unknown_host_is_not_found() {
        let table = BackendTable::new(timeout());
        assert!(matches!(table.lookup("something.com"), Lookup::NotFound));
    }

    #[test]
    fn empty_backend_is_null_pool() {
        let table = BackendTable::new(timeout());
        let mut backends = HashMap::new();
        backends.insert("something.com".to_string(), Backend { servers: vec![] });
        table.load(&backends).unwrap();
        assert!(matches!(table.lookup("something.com"), Lookup::EmptyPool));
    }

    #[test]
    fn populated_backend_resolves_to_pool() {
        let table = BackendTable::new(timeout());
        let mut backends = HashMap::new();
        backends.insert(
            "something.com".to_string(),
            Backend { servers: vec![Server { address: "127.0.0.1:9000".to_string() }] },
        );
        table.load(&backends).unwrap();
        assert!(matches!(table.lookup("something.com"), Lookup::Pool(_)));
    }

    #[test]
    fn host_key_strips_port_without_off_by_one() {
        assert_eq!(host_key("example.com:8080"), "example.com");
        assert_eq!(host_key("example.com"), "example.com");
    }

    #[test]
    fn failed_reload_keeps_prior_table() {
        let table = BackendTable::new(timeout());
        let mut good = HashMap::new();
        good.insert(
            "something.com".to_string(),
            Backend { servers: vec![Server { address: "127.0.0.1:9000".to_string() }] },
        );
        table.load(&good).unwrap();
        let before = table.get_backends();

        let mut bad = HashMap::new();
        bad.insert(
            "something.com".to_string(),
            Backend { servers: vec![Server { address: "http://:8080".to_string() }] },
        );
        assert!(table.load(&bad).is_err());

        assert_eq!(table.get_backends(), before);
    }

    #[test]
    fn lookup_after_reload_reflects_new_snapshot() {
        let table = BackendTable::new(timeout());
        let mut backends = HashMap::new();
        backends.insert("something.com".to_string(), Backend { servers: vec![] });
        table.load(&backends).unwrap();
        assert!(matches!(table.lookup("something.com"), Lookup::EmptyPool));

        backends.insert(
            "something.com".to_string(),
            Backend { servers: vec![Server { address: "127.0.0.1:9000".to_string() }] },
        );
        table.load(&backends).unwrap();
        assert!(matches!(table.lookup("something.com"), Lookup::Pool(_)));
    }

    #[test]
    fn dump_is_tab_separated_with_star_for_repeats() {
        let mut backends = HashMap::new();
        backends.insert(
            "something.com".to_string(),
            Backend {
                servers: vec![
                    Server { address: "127.0.0.1:9000".to_string() },
                    Server { address: "127.0.0.1:9001".to_string() },
                ],
            },
        );
        backends.insert("empty.com".to_string(), Backend { servers: vec![] });

        let dump = format_backend_dump(&backends);
        assert!(dump.starts_with("BACKEND\tSERVER\n"));
        assert!(dump.contains("something.com\t127.0.0.1:9000\n"));
        assert!(dump.contains("*\t127.0.0.1:9001\n"));
        assert!(dump.contains("empty.com\t---\n"));
    }
}
