//! Telemetry setup for OpenTelemetry integration

use anyhow::Result;
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;

/// OpenTelemetry tracing layer, if enabled
///
/// # Environment Variables
///
/// - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (e.g., http://localhost:4317)
///
/// # Example
///
/// ```text
/// OTEL_EXPORTER_OTLP_ENDPOINT=http://localhost:4317 ./keyq-broker
/// ```
#[cfg(feature = "telemetry")]
pub fn otel_layer<S>(service_name: &str) -> Result<Option<impl tracing_subscriber::Layer<S>>>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;

    let Ok(endpoint) = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") else {
        return Ok(None);
    };

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()?;

    let provider = opentelemetry_sdk::trace::TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .build();
    let tracer = provider.tracer(service_name.to_string());
    opentelemetry::global::set_tracer_provider(provider);

    Ok(Some(tracing_opentelemetry::layer().with_tracer(tracer)))
}

#[cfg(not(feature = "telemetry"))]
pub fn otel_layer<S>(_service_name: &str) -> Result<Option<tracing_subscriber::layer::Identity>>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    Ok(None)
}

/// Warn about an OTLP endpoint that this build cannot export to
pub fn report_status() {
    let configured = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok();

    if !configured {
        tracing::debug!("OpenTelemetry not configured (OTEL_EXPORTER_OTLP_ENDPOINT not set)");
    } else if cfg!(feature = "telemetry") {
        tracing::info!("OpenTelemetry export enabled");
    } else {
        tracing::warn!("OpenTelemetry endpoint set but feature 'telemetry' not enabled");
        tracing::warn!("Rebuild with: cargo build --features telemetry");
    }
}
