use crate::cli::ServeArgs;
use crate::infra::{AppState, ConfiguredBlobStore, InMemoryApplicationRepository};
use crate::routes::with_application_routes;
use auto_loan::config::AppConfig;
use auto_loan::error::AppError;
use auto_loan::telemetry;
use auto_loan::workflows::applications::{
    AdminSessions, LoanApplicationService, StaticTokenSessions,
};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    let default_base_url = format!("http://{}:{}", config.server.host, config.server.port);

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if config.storage.public_base_url == default_base_url {
        config.storage.public_base_url =
            format!("http://{}:{}", config.server.host, config.server.port);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryApplicationRepository::default());
    let blobs = Arc::new(ConfiguredBlobStore::from_config(&config.storage));
    let blob_store = blobs.kind();
    let application_service = Arc::new(LoanApplicationService::new(repository, blobs));

    let sessions = StaticTokenSessions::new(config.admin.token.clone());
    if !sessions.is_configured() {
        warn!("APP_ADMIN_TOKEN is not set; admin routes will reject every request");
    }
    let sessions: Arc<dyn AdminSessions> = Arc::new(sessions);

    let app = with_application_routes(
        application_service,
        sessions,
        config.storage.max_upload_bytes,
    )
    .layer(Extension(app_state))
    .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        blob_store,
        public_base_url = %config.storage.public_base_url,
        max_upload_bytes = config.storage.max_upload_bytes,
        "auto loan intake service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
