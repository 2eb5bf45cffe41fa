use std::process;

use kafka_registry::{telemetry, KafkaConnector, Registry};

mod config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = match config::Config::load() {
        Ok(a) => a,
        Err(e) => panic!("can't read config {:?}", e),
    };

    let subscriber = telemetry::get_subscriber(&cfg.telemetry)?;
    telemetry::init_subscriber(subscriber)?;

    tracing::info!("config loaded; config={:?}", &cfg);

    let path = cfg.kafka_config_path();
    let kafka_cfg = match kafka_registry::Config::load(&path) {
        Ok(c) => c,
        Err(e) => {
            println!("Load config file({}) fail, err = {}", path.display(), e);
            process::exit(1);
        }
    };

    let connector = KafkaConnector::new(cfg.connector.clone());
    let mut registry = match Registry::from_config(connector, &kafka_cfg) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!("failed to init kafka handles: {:?}", e);
            process::exit(1);
        }
    };

    tracing::info!(
        writers = ?registry.writer_topics(),
        readers = ?registry.reader_topics(),
        "kafka handles ready"
    );

    tokio::signal::ctrl_c().await?;

    tracing::info!("shutting down");
    if let Err(e) = registry.close_all() {
        tracing::error!("{:?}", e);
    }

    Ok(())
}
