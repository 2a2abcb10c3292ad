//! OpenTelemetry span export for fabula runs.
//!
//! Every `tracing` span, one per pipeline stage and per remote call, is also
//! exported as an OpenTelemetry span on stdout. Enabled through
//! `[logging] export_spans`.

use opentelemetry::{KeyValue, global, trace::TracerProvider};
use opentelemetry_sdk::{
    Resource,
    trace::{SdkTracer, SdkTracerProvider},
};
use opentelemetry_stdout::SpanExporter;
use tracing::Subscriber;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::registry::LookupSpan;

/// Service name attached to exported spans.
pub const SERVICE_NAME: &str = "fabula";

/// Layer bridging `tracing` spans to a stdout OpenTelemetry exporter.
///
/// Also installs the tracer provider globally.
pub fn span_layer<S>() -> OpenTelemetryLayer<S, SdkTracer>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    let resource = Resource::builder()
        .with_service_name(SERVICE_NAME)
        .with_attributes(vec![KeyValue::new(
            "service.version",
            env!("CARGO_PKG_VERSION"),
        )])
        .build();

    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(SpanExporter::default())
        .with_resource(resource)
        .build();
    global::set_tracer_provider(provider.clone());

    tracing_opentelemetry::layer().with_tracer(provider.tracer(SERVICE_NAME))
}
