use anyhow::{Context, Result};
use product::{
    config::{myconfig::Config, server_config::ServerConfig},
    kafka::{CommandResponder, KafkaCommandConsumer},
    metrics,
    state::AppState,
};
use shared::{
    abstract_trait::DynKafka,
    config::{ConnectionManager, ConnectionPool, Kafka},
    utils::{Telemetry, init_logger},
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

#[tokio::main]
async fn main() -> Result<()> {
    let (config, server_config, state, telemetry, _log_guard) =
        setup().await.context("Failed to setup application")?;

    let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);

    let server_handles = run_servers(config, server_config, state, shutdown_tx.clone())
        .context("Failed to start servers")?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("🛑 Shutdown signal received (Ctrl+C).");
            if let Err(e) = shutdown_tx.send(()) {
                warn!("Failed to send shutdown signal: {e}");
            }
        }
        _ = shutdown_rx.recv() => {
            info!("🛑 Shutdown signal received from internal component.");
        }
    }

    shutdown(telemetry, server_handles).await;

    Ok(())
}

async fn setup() -> Result<(Config, ServerConfig, Arc<AppState>, Telemetry, WorkerGuard)> {
    dotenv::dotenv().ok();

    let config = Config::init().context("Failed to load configuration")?;
    let server_config = ServerConfig::from_config(&config)?;

    let telemetry = Telemetry::init("product-service", &config.otel_endpoint)
        .context("Failed to initialize telemetry")?;

    let log_guard = init_logger(telemetry.logger_provider(), "product-service", config.is_dev)
        .context("Failed to initialize logger")?;

    info!("🚀 Starting Product Service initialization...");

    let db_pool = ConnectionManager::new_pool(&server_config.database_url, config.db_max_conn)
        .await
        .context("Failed to initialize database pool")?;

    if server_config.run_migrations {
        run_migrations(&db_pool)
            .await
            .context("Failed to run database migrations")?;
    } else {
        info!("⏭️ Skipping database migrations");
    }

    let state = Arc::new(AppState::new(db_pool));

    info!("✅ Application setup completed successfully.");
    Ok((config, server_config, state, telemetry, log_guard))
}

struct ServerHandles {
    kafka_handle: tokio::task::JoinHandle<()>,
    metrics_handle: tokio::task::JoinHandle<()>,
}

fn run_servers(
    config: Config,
    server_config: ServerConfig,
    state: Arc<AppState>,
    shutdown_tx: broadcast::Sender<()>,
) -> Result<ServerHandles> {
    let producer: DynKafka =
        Arc::new(Kafka::new(&config.kafka.brokers).context("Failed to create Kafka producer")?);

    let responder = CommandResponder::new(
        state.di_container.handler(),
        producer,
        config.kafka.reply_topic.clone(),
    );

    let kafka_handle = spawn_kafka_consumer(config, responder, shutdown_tx.clone());
    let metrics_handle = run_metrics_server(state, server_config.metrics_addr, shutdown_tx);

    Ok(ServerHandles {
        kafka_handle,
        metrics_handle,
    })
}

fn spawn_kafka_consumer(
    config: Config,
    responder: CommandResponder,
    shutdown_tx: broadcast::Sender<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut shutdown_rx = shutdown_tx.subscribe();

        loop {
            info!("🔄 Starting Kafka consumer...");

            let consumer = match KafkaCommandConsumer::new(
                &config.kafka.brokers,
                &config.kafka.consumer_group,
                config.kafka.command_topic.clone(),
                responder.clone(),
            ) {
                Ok(consumer) => consumer,
                Err(e) => {
                    error!("💀 Failed to create Kafka consumer: {e}. Restarting in 5s...");
                    if shutdown_during_backoff(&mut shutdown_rx).await {
                        break;
                    }
                    continue;
                }
            };

            let consumer_shutdown_rx = shutdown_rx.resubscribe();
            let kafka_task =
                tokio::spawn(async move { consumer.start_with_shutdown(consumer_shutdown_rx).await });

            match kafka_task.await {
                Ok(Ok(())) => {
                    info!("✅ Kafka consumer stopped gracefully");
                    break;
                }
                Ok(Err(e)) => {
                    error!("💀 Kafka consumer error: {e}. Restarting in 5s...");
                }
                Err(e) => {
                    if e.is_cancelled() {
                        info!("Kafka consumer task cancelled during shutdown");
                        break;
                    }
                    error!("💀 Kafka task panicked: {e}. Restarting in 5s...");
                }
            }

            if shutdown_during_backoff(&mut shutdown_rx).await {
                break;
            }
        }
    })
}

async fn shutdown_during_backoff(shutdown_rx: &mut broadcast::Receiver<()>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(tokio::time::Duration::from_secs(5)) => false,
        _ = shutdown_rx.recv() => {
            info!("🛑 Kafka consumer restart cancelled by shutdown");
            true
        }
    }
}

fn run_metrics_server(
    state: Arc<AppState>,
    metrics_addr: std::net::SocketAddr,
    shutdown_tx: broadcast::Sender<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let shutdown_rx = shutdown_tx.subscribe();

        loop {
            match start_metrics_server(state.clone(), metrics_addr, shutdown_rx.resubscribe())
                .await
            {
                Ok(()) => {
                    info!("Metrics server stopped gracefully");
                    break;
                }
                Err(e) => {
                    error!("❌ Metrics server failed: {e}. Retrying in 3s...");
                    tokio::time::sleep(tokio::time::Duration::from_secs(3)).await;
                }
            }
        }
    })
}

async fn start_metrics_server(
    state: Arc<AppState>,
    addr: std::net::SocketAddr,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<()> {
    info!("📊 Starting metrics server on {addr}");

    let app = metrics::router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind metrics listener on {addr}"))?;

    let shutdown_future = async move {
        let _ = shutdown_rx.recv().await;
        info!("Metrics server received shutdown signal");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_future)
        .await
        .context("Metrics server failed to start or serve")
}

async fn shutdown(telemetry: Telemetry, server_handles: ServerHandles) {
    info!("🛑 Shutting down all servers...");

    let shutdown_timeout = tokio::time::Duration::from_secs(30);
    let shutdown_result = tokio::time::timeout(shutdown_timeout, async {
        let _ = tokio::join!(server_handles.kafka_handle, server_handles.metrics_handle);
    })
    .await;

    match shutdown_result {
        Ok(()) => info!("✅ All components shutdown gracefully"),
        Err(_) => warn!("⚠️ Shutdown timeout reached, forcing exit"),
    }

    if let Err(e) = telemetry.shutdown() {
        error!("Failed to shutdown telemetry: {e}");
    }

    info!("✅ Product Service shutdown complete.");
}

async fn run_migrations(pool: &ConnectionPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
