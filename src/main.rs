use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use pirvisor::{
    Components, Config, DeviceBuilder, FileInput, HostLink, HostProbe, LogWriter, MonotonicClock,
    MqttMessaging, Runtime,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pirvisor=info")),
        )
        .init();

    let cfg = Config::from_env().context("loading configuration")?;
    tracing::info!(
        device = %cfg.device,
        broker = %format!("{}:{}", cfg.broker.host, cfg.broker.port),
        sensor = %cfg.sensor_path.display(),
        "starting"
    );

    let runtime = Runtime::new(&cfg, vec![Arc::new(LogWriter::new())]);

    let builder = DeviceBuilder::new(cfg.clone());
    let (messaging, driver) = MqttMessaging::new(&cfg.broker, builder.conn_events());
    let (link, watcher) = HostLink::new(
        format!("{}:{}", cfg.broker.host, cfg.broker.port),
        cfg.link_probe_interval,
        builder.conn_events(),
    );

    let device = builder
        .with_task(Box::new(driver))
        .with_task(Box::new(watcher))
        .build(
            runtime.bus(),
            Components {
                messaging: Arc::new(messaging),
                link: Arc::new(link),
                input: Box::new(FileInput::new(&cfg.sensor_path)),
                probe: Arc::new(HostProbe::new()),
                clock: Arc::new(MonotonicClock::new()),
            },
        );
    tracing::info!(tasks = ?device.task_names(), "device assembled");

    runtime.run(device.into_tasks()).await?;
    tracing::info!("stopped");
    Ok(())
}
