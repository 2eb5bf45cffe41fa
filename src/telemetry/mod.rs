use anyhow::Result;
use opentelemetry::sdk::trace::Tracer;
use opentelemetry::trace::TraceError;
use tracing::subscriber::set_global_default;
use tracing::Subscriber;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

pub mod config;
pub use self::config::{Config, LogsFormat};

pub fn get_subscriber(cfg: &Config) -> Result<Box<dyn Subscriber + Send + Sync>, TraceError> {
    let env_filter = EnvFilter::from_default_env();
    let fmt_layer: Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync> =
        format_layer(cfg);
    let reg = Registry::default().with(env_filter).with(fmt_layer);

    if let Some(ep) = &cfg.jaeger_endpoint {
        let tracer = init_tracer(cfg.svc_name.to_string(), ep.into())?;
        return Ok(Box::new(
            reg.with(tracing_opentelemetry::layer().with_tracer(tracer)),
        ));
    }

    Ok(Box::new(reg))
}

/// Installs `subscriber` globally and routes `log` records (the kafka
/// client logs through `log`) into it.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) -> Result<()> {
    LogTracer::init()?;
    set_global_default(subscriber)?;
    Ok(())
}

fn format_layer<S>(cfg: &Config) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    match cfg.format {
        LogsFormat::Full => Box::new(fmt::layer()),
        LogsFormat::Compact => Box::new(fmt::layer().compact()),
        LogsFormat::Pretty => Box::new(fmt::layer().pretty()),
        LogsFormat::Json => Box::new(JsonStorageLayer.and_then(BunyanFormattingLayer::new(
            cfg.svc_name.clone(),
            std::io::stdout,
        ))),
    }
}

fn init_tracer(svc_name: String, endpoint: String) -> Result<Tracer, TraceError> {
    opentelemetry_jaeger::new_pipeline()
        .with_service_name(svc_name)
        .with_agent_endpoint(endpoint)
        .install_simple()
}
