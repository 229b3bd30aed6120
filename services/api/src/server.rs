use crate::cli::ServeArgs;
use crate::infra::{ensure_demo_pipeline, AppState, DemoSeed, SeedTarget};
use crate::routes::with_recruiting_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use talent_pipeline::config::AppConfig;
use talent_pipeline::error::AppError;
use talent_pipeline::recruiting::{
    InMemoryRecruitingStore, RecruitingState, SqliteRecruitingStore,
};
use talent_pipeline::telemetry;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(url) = args.database_url.take() {
        config.database.url = Some(url);
    }
    config.database.seed_demo |= args.seed_demo;

    telemetry::init(&config.telemetry)?;

    match config.database.url.clone() {
        Some(url) => {
            let store = SqliteRecruitingStore::connect(&url).await?;
            store.health_check().await?;
            info!(database_url = %url, "sqlite pipeline store connected");
            serve(Arc::new(store), config).await
        }
        None => {
            info!("serving in-memory pipeline store");
            serve(Arc::new(InMemoryRecruitingStore::default()), config).await
        }
    }
}

async fn serve<S>(store: Arc<S>, config: AppConfig) -> Result<(), AppError>
where
    S: SeedTarget + 'static,
{
    if config.database.seed_demo {
        match ensure_demo_pipeline(store.as_ref(), Local::now().date_naive()).await? {
            DemoSeed::Seeded(demo) => info!(
                position_id = %demo.position.id,
                candidates = demo.candidates.len(),
                "demo pipeline seeded"
            ),
            DemoSeed::PositionExists(position) => warn!(
                position_id = %position.id,
                "demo pipeline already present, skipping seed"
            ),
            DemoSeed::EmailTaken(candidate) => warn!(
                candidate_id = %candidate.id,
                "demo candidate email already registered, skipping seed"
            ),
        }
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_recruiting_routes(RecruitingState::new(store))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "candidate pipeline api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
