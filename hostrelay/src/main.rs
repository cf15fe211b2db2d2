#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use hostrelay_lib::auth::CredentialTable;
use hostrelay_lib::config::{self, backends_from_equal_separated, users_from_login_password, Config};
use hostrelay_lib::table::BackendTable;
use hostrelay_lib::telemetry::{init_tracing_with_otel, shutdown_tracing};
use hostrelay_lib::{bind, run};
use tracing::{error, info};

/// A single-listener L7 reverse proxy: routes by `Host` header to a named
/// backend's upstream pool, with an optional HTTP Basic auth gate.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Port to listen on. 0 picks an ephemeral port.
    #[arg(short = 'p', long, default_value_t = 80)]
    port: u16,

    /// YAML configuration file. When given, it is the sole source of
    /// backends/users/port and is re-read on SIGHUP.
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// HTTP Basic auth credential, repeatable. Ignored when -c is given.
    #[arg(long = "user", value_name = "LOGIN:PASSWORD")]
    users: Vec<String>,

    /// Positional `backend=address` entries. Repeat the same backend name
    /// to add more than one upstream to its pool. Ignored when -c is given.
    #[arg(value_name = "BACKEND=ADDRESS")]
    servers: Vec<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("ERROR: {err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = init_tracing_with_otel(
        config.logging.level.clone(),
        config.logging.show_target,
        config.telemetry.otel_log_level.clone(),
    ) {
        eprintln!("ERROR: failed to initialize tracing: {err}");
        std::process::exit(1);
    }

    let table = Arc::new(BackendTable::new(config.timeout.clone()));
    if let Err(err) = table.load(&config.backends) {
        error!(%err, "failed to build initial backend table");
        std::process::exit(1);
    }
    print!("{}", table.dump());

    let credentials = Arc::new(CredentialTable::build(&config.users));

    let metrics = match hostrelay_lib::telemetry::init_metrics() {
        Ok((metrics, registry)) => {
            if let Some(metrics_port) = config.telemetry.metrics_port {
                let table = Arc::clone(&table);
                tokio::spawn(async move {
                    if let Err(err) =
                        hostrelay_lib::telemetry::start_observability_server(metrics_port, registry, table)
                            .await
                    {
                        error!(%err, "observability server exited");
                    }
                });
            }
            Some(metrics)
        }
        Err(err) => {
            error!(%err, "failed to initialize metrics, continuing without them");
            None
        }
    };

    let (listener, bound_port) = match bind(config.port).await {
        Ok(v) => v,
        Err(err) => {
            error!(%err, "failed to bind listener");
            std::process::exit(1);
        }
    };
    info!(port = bound_port, "hostrelay starting");

    let request_timeout = Duration::from_secs(config.timeout.request_secs);

    let outcome =
        run(listener, table, credentials, metrics, request_timeout, cli.config.clone()).await;

    if let Err(err) = &outcome {
        error!(%err, "proxy exited with error");
    }
    shutdown_tracing();

    if outcome.is_err() {
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> hostrelay_lib::Result<Config> {
    if let Some(path) = &cli.config {
        return config::load_from_path(path);
    }

    let backends = backends_from_equal_separated(&cli.servers)?;
    let users = users_from_login_password(&cli.users)?;
    Ok(Config { port: cli.port, backends, users, ..Config::default() })
}
