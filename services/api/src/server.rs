use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::worklist_routes;
use ar_priority::config::AppConfig;
use ar_priority::error::AppError;
use ar_priority::prioritization::CachedRecordStore;
use ar_priority::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(data_dir) = args.data_dir.take() {
        config.worklist.data_dir = data_dir;
    }

    telemetry::init(&config.telemetry)?;

    let store = Arc::new(CachedRecordStore::new(config.worklist.data_dir.clone()));
    // Fail fast on unreadable sources; later requests reload on change.
    let table = store.table()?;
    info!(
        data_dir = %store.dir().display(),
        rows = table.len(),
        "source relations joined"
    );

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        store,
        default_top_n: config.worklist.top_n,
    };

    let app = worklist_routes()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "ar priority service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
