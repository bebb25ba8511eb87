//! Subscriber setup: fmt output (pretty or JSON), `EnvFilter`, and an optional
//! OTLP span exporter when `OTEL_EXPORTER_OTLP_ENDPOINT` is set.

use anyhow::{Context, Result};
use opentelemetry::{
    global, propagation::TextMapCompositePropagator, trace::TracerProvider as _, KeyValue,
};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    propagation::{BaggagePropagator, TraceContextPropagator},
    trace::SdkTracerProvider,
    Resource,
};
use std::{env::var, str::FromStr, sync::OnceLock, time::Duration};
use tracing::{debug, Level, Subscriber};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, registry::LookupSpan, EnvFilter, Layer, Registry,
};
use ulid::Ulid;

const EXPORT_TIMEOUT: Duration = Duration::from_secs(3);

static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Console log format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}' (expected pretty or json)")),
        }
    }
}

/// Exporter settings taken from the standard `OTEL_*` variables.
#[derive(Debug, PartialEq, Eq)]
struct OtlpSettings {
    endpoint: String,
    instance_id: String,
}

impl OtlpSettings {
    /// `None` unless `OTEL_EXPORTER_OTLP_ENDPOINT` is set and non-empty.
    fn from_env() -> Option<Self> {
        let endpoint = var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .filter(|endpoint| !endpoint.trim().is_empty())?;

        if let Ok(protocol) = var("OTEL_EXPORTER_OTLP_PROTOCOL") {
            if protocol != "grpc" {
                debug!("OTEL_EXPORTER_OTLP_PROTOCOL='{protocol}' ignored, exporting over gRPC");
            }
        }

        Some(Self {
            endpoint: normalize_endpoint(endpoint.trim()),
            instance_id: var("OTEL_SERVICE_INSTANCE_ID")
                .unwrap_or_else(|_| Ulid::new().to_string()),
        })
    }

    fn resource(&self) -> Resource {
        Resource::builder_empty()
            .with_attributes([
                KeyValue::new("service.name", env!("CARGO_PKG_NAME")),
                KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
                KeyValue::new("service.instance.id", self.instance_id.clone()),
                KeyValue::new("vcs.revision", crate::GIT_COMMIT_HASH),
            ])
            .build()
    }

    fn provider(&self) -> Result<SdkTracerProvider> {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(&self.endpoint)
            .with_timeout(EXPORT_TIMEOUT)
            .build()
            .with_context(|| format!("Failed to build OTLP exporter for {}", self.endpoint))?;

        Ok(SdkTracerProvider::builder()
            .with_batch_exporter(exporter)
            .with_resource(self.resource())
            .build())
    }
}

/// Bare `host:port` endpoints are assumed to be TLS.
fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("https://{}", endpoint.trim_end_matches('/'))
    }
}

fn env_filter(level: Level) -> Result<EnvFilter> {
    // RUST_LOG wins over -v
    Ok(EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
        .add_directive("hyper=error".parse()?)
        .add_directive("reqwest=warn".parse()?)
        .add_directive("tokio=error".parse()?)
        .add_directive("opentelemetry_sdk=warn".parse()?))
}

fn fmt_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = fmt::layer()
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_target(false);

    match format {
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Json => layer.json().with_current_span(true).boxed(),
    }
}

/// Install the global subscriber.
///
/// `None` verbosity logs errors only.
///
/// # Errors
///
/// Returns an error if the exporter or the subscriber cannot be installed.
pub fn init(verbosity_level: Option<Level>, format: LogFormat) -> Result<()> {
    let filter = env_filter(verbosity_level.unwrap_or(Level::ERROR))?;

    let Some(settings) = OtlpSettings::from_env() else {
        let subscriber = Registry::default().with(fmt_layer(format)).with(filter);
        tracing::subscriber::set_global_default(subscriber)?;
        return Ok(());
    };

    let provider = settings.provider()?;
    let tracer = provider.tracer(env!("CARGO_PKG_NAME"));

    let _ = TRACER_PROVIDER.set(provider.clone());
    global::set_tracer_provider(provider);
    global::set_text_map_propagator(TextMapCompositePropagator::new(vec![
        Box::new(TraceContextPropagator::new()),
        Box::new(BaggagePropagator::new()),
    ]));

    let subscriber = Registry::default()
        .with(fmt_layer(format))
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .with(filter);
    tracing::subscriber::set_global_default(subscriber)?;

    debug!("Exporting spans to {}", settings.endpoint);
    Ok(())
}

/// Flush and stop the exporter, if one was installed.
pub fn shutdown_tracer() {
    if let Some(provider) = TRACER_PROVIDER.get() {
        if let Err(err) = provider.shutdown() {
            debug!("tracer provider shutdown failed: {err}");
        }
    }
}
