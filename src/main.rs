use exam_backend::{
    config::{Config, LogFormat},
    database::pool::{create_pool, run_migrations},
    routes::build_router,
    AppState, Backends,
};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let pool = create_pool(&config).await?;
    if config.run_migrations {
        run_migrations(&pool).await?;
    }

    let addr: SocketAddr = config.server_address.parse()?;
    let workers = config.submission_workers;
    let backends = Backends::postgres(&config, &pool);
    let (app_state, worker) = AppState::new(config, pool, backends);
    let handles = worker.spawn(workers);
    info!(workers, "submission workers started");

    let app = build_router(app_state);

    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router owned every queue handle; workers exit once the backlog drains.
    let drain = join_workers(handles);
    if tokio::time::timeout(WORKER_DRAIN_TIMEOUT, drain).await.is_err() {
        tracing::warn!("submission workers did not drain in time, pending submissions dropped");
    } else {
        info!("submission workers drained");
    }

    Ok(())
}

async fn join_workers(handles: Vec<tokio::task::JoinHandle<()>>) {
    for handle in handles {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "submission worker panicked");
        }
    }
}
