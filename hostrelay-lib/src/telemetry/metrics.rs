use std::sync::Arc;

use opentelemetry::global;
use opentelemetry::metrics::{Counter, Histogram, Meter, UpDownCounter};
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::Registry;

#[derive(Clone)]
pub struct Metrics {
    pub connections_total: Counter<u64>,
    pub connections_active: UpDownCounter<i64>,

    pub requests_total: Counter<u64>,
    pub requests_duration_seconds: Histogram<f64>,

    pub errors_total: Counter<u64>,

    pub reloads_total: Counter<u64>,
}

impl Metrics {
    fn new(meter: Meter) -> Self {
        Self {
            connections_total: meter
                .u64_counter("hostrelay_connections_total")
                .with_description("Total number of connections accepted")
                .build(),
            connections_active: meter
                .i64_up_down_counter("hostrelay_connections_active")
                .with_description("Number of active connections")
                .build(),

            requests_total: meter
                .u64_counter("hostrelay_requests_total")
                .with_description("Total number of requests handled")
                .build(),
            requests_duration_seconds: meter
                .f64_histogram("hostrelay_requests_duration_seconds")
                .with_description("Request handling duration in seconds")
                .build(),

            errors_total: meter
                .u64_counter("hostrelay_errors_total")
                .with_description("Total number of non-2xx responses, by error_type")
                .build(),

            reloads_total: meter
                .u64_counter("hostrelay_reloads_total")
                .with_description("Total number of SIGHUP backend table reloads, by outcome")
                .build(),
        }
    }
}

pub fn init_metrics() -> Result<(Arc<Metrics>, Registry), Box<dyn std::error::Error + Send + Sync>>
{
    let registry = Registry::default();

    let exporter = opentelemetry_prometheus::exporter().with_registry(registry.clone()).build()?;
    let meter_provider = SdkMeterProvider::builder().with_reader(exporter).build();
    global::set_meter_provider(meter_provider);

    let meter = global::meter("hostrelay");
    let metrics = Arc::new(Metrics::new(meter));

    Ok((metrics, registry))
}
