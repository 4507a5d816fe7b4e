//! Tracing setup: compact console output, plus OTLP trace export when an
//! endpoint is configured and the `otel` feature is built in.

use assetsync_core::Config;
use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
    EnvFilter, Layer,
};

fn env_filter(log_level: &str) -> EnvFilter {
    let fallback = format!(
        "assetsync={level},assetsync_api={level},assetsync_db={level},assetsync_storage={level},tower_http={level}",
        level = log_level
    );
    EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into())
}

fn console_layer<S>() -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer().event_format(Format::default().compact().with_target(false))
}

/// Install the global subscriber. `RUST_LOG` wins over `LOG_LEVEL`.
pub fn init_tracing(config: &Config) -> anyhow::Result<()> {
    let Some(endpoint) = config.otel_endpoint() else {
        tracing_subscriber::registry()
            .with(env_filter(&config.log_level))
            .with(console_layer())
            .init();
        return Ok(());
    };

    #[cfg(feature = "otel")]
    {
        let tracer = otlp::init_tracer(config, endpoint)?;
        tracing_subscriber::registry()
            .with(env_filter(&config.log_level))
            .with(console_layer())
            .with(tracing_opentelemetry::layer().with_tracer(tracer))
            .init();
        tracing::info!(
            endpoint = %endpoint,
            protocol = %config.otel_protocol,
            service = %config.otel_service_name,
            "OTLP trace export enabled"
        );
        Ok(())
    }

    #[cfg(not(feature = "otel"))]
    {
        tracing_subscriber::registry()
            .with(env_filter(&config.log_level))
            .with(console_layer())
            .init();
        tracing::warn!(
            endpoint = %endpoint,
            "OTLP endpoint set but this build lacks the otel feature; traces stay on the console"
        );
        Ok(())
    }
}

/// Flush pending spans. No-op when export was never enabled.
pub fn shutdown_tracing() {
    #[cfg(feature = "otel")]
    opentelemetry::global::shutdown_tracer_provider();
}

#[cfg(feature = "otel")]
mod otlp {
    use assetsync_core::Config;
    use opentelemetry::{trace::TracerProvider as _, KeyValue};
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::{self as sdktrace, BatchSpanProcessor, RandomIdGenerator, Sampler};
    use opentelemetry_sdk::Resource;

    pub(super) fn sampler(ratio: f64) -> Sampler {
        if ratio >= 1.0 {
            Sampler::AlwaysOn
        } else if ratio <= 0.0 {
            Sampler::AlwaysOff
        } else {
            Sampler::TraceIdRatioBased(ratio)
        }
    }

    pub(super) fn init_tracer(config: &Config, endpoint: &str) -> anyhow::Result<sdktrace::Tracer> {
        let exporter = if config.otel_protocol == "http" {
            opentelemetry_otlp::SpanExporter::builder()
                .with_http()
                .with_endpoint(endpoint)
                .build()
        } else {
            opentelemetry_otlp::SpanExporter::builder()
                .with_tonic()
                .with_endpoint(endpoint)
                .build()
        }
        .map_err(|e| anyhow::anyhow!("Failed to build OTLP span exporter: {}", e))?;

        let processor = BatchSpanProcessor::builder(exporter, opentelemetry_sdk::runtime::Tokio).build();

        let provider = sdktrace::TracerProvider::builder()
            .with_span_processor(processor)
            .with_sampler(sampler(config.otel_sample_ratio))
            .with_id_generator(RandomIdGenerator::default())
            .with_resource(Resource::new(vec![
                KeyValue::new("service.name", config.otel_service_name.clone()),
                KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
                KeyValue::new("deployment.environment", config.environment.clone()),
            ]))
            .build();

        let tracer = provider.tracer(config.otel_service_name.clone());
        opentelemetry::global::set_tracer_provider(provider);
        Ok(tracer)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_sampler_follows_ratio() {
            assert!(matches!(sampler(1.0), Sampler::AlwaysOn));
            assert!(matches!(sampler(0.0), Sampler::AlwaysOff));
            assert!(matches!(sampler(0.25), Sampler::TraceIdRatioBased(r) if r == 0.25));
        }
    }
}
