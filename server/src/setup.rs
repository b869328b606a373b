use std::{collections::HashMap, time::Duration};

use color_eyre::eyre::Context as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use sentry::ClientInitGuard;
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter, Registry};
use tracing_tree::HierarchicalLayer;

/// Initialise Sentry when `SENTRY_DSN` is set. Keep the guard alive for the
/// life of the process.
pub fn setup_sentry() -> Option<ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok()?;

    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            traces_sample_rate: 1.0,
            ..Default::default()
        },
    )))
}

pub fn setup_tracing(crate_name: &str) -> color_eyre::Result<()> {
    let rust_log = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| format!("info,{crate_name}=trace,tower_http=debug"));

    let env_filter = EnvFilter::builder()
        .parse(&rust_log)
        .wrap_err_with(|| format!("Couldn't create env filter from {rust_log}"))?;

    let hierarchical = HierarchicalLayer::default()
        .with_writer(std::io::stdout)
        .with_indent_lines(true)
        .with_indent_amount(2)
        .with_thread_names(true)
        .with_thread_ids(true)
        .with_verbose_exit(true)
        .with_verbose_entry(true)
        .with_targets(true);

    let honeycomb = match std::env::var("HONEYCOMB_API_KEY") {
        Ok(api_key) => {
            let headers = HashMap::from([
                ("x-honeycomb-team".to_string(), api_key),
                ("x-honeycomb-dataset".to_string(), crate_name.to_string()),
            ]);

            let tracer = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(
                    opentelemetry_otlp::new_exporter()
                        .http()
                        .with_endpoint("https://api.honeycomb.io/v1/traces")
                        .with_timeout(Duration::from_secs(3))
                        .with_headers(headers),
                )
                .with_trace_config(opentelemetry_sdk::trace::config().with_resource(
                    Resource::new(vec![KeyValue::new("service.name", crate_name.to_string())]),
                ))
                .install_batch(opentelemetry_sdk::runtime::Tokio)
                .wrap_err("Failed to install the OTLP pipeline")?;

            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        Err(_) => None,
    };

    Registry::default()
        .with(hierarchical)
        .with(honeycomb)
        .with(env_filter)
        .with(sentry::integrations::tracing::layer())
        .try_init()
        .wrap_err("Failed to install the tracing subscriber")?;

    Ok(())
}
