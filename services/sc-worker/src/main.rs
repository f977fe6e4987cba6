use sc_config::{EngineConfig, ServiceConfig};
use sc_core::{ErrorCode, GeoPoint, ScError, ScResult, UserId};
use sc_engine::{follow_repository, NoopRenderer, SessionHandle, ZoneSession};
use sc_messaging::{ZmqAlertSink, ZmqPublisher, ZmqPublisherConfig};
use sc_observability::{init, log_startup, ObservabilityConfig};
use sc_storage::{save_zone, MemoryZoneRepository, ZoneDocument, ZoneRepository};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

const DEFAULT_ALERT_ENDPOINT: &str = "tcp://*:5590";

#[tokio::main]
async fn main() -> ExitCode {
    let config = ServiceConfig::from_env("sc-worker");
    let engine = EngineConfig::from_env();
    let obs_config = ObservabilityConfig {
        service_name: config.service_name.clone(),
        environment: config.environment.to_string(),
        log_level: config.log_level.clone(),
        metrics_addr: config.metrics_addr.clone(),
    };
    let handle = init(&obs_config);
    log_startup(&handle, &obs_config.environment);

    match run(&config, &engine).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "zone worker stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &ServiceConfig, engine: &EngineConfig) -> ScResult<()> {
    let user_id = resolve_user(config.user_id.as_deref());
    let document = load_document(engine.zones_file.as_deref()).await?;
    let repo = Arc::new(MemoryZoneRepository::with_document(user_id, document));

    let publisher = ZmqPublisher::new(&ZmqPublisherConfig::from_env(DEFAULT_ALERT_ENDPOINT))
        .map_err(|err| ScError::new(ErrorCode::Unavailable, err.to_string()))?;
    let alerts = Arc::new(ZmqAlertSink::new(
        publisher,
        user_id,
        config.service_name.clone(),
    ));
    let session = ZoneSession::new(engine, Arc::new(NoopRenderer), alerts)?;
    let (session, task) = SessionHandle::spawn(session);

    if let Some((lat, lng)) = engine.self_position {
        seed_self_zone(repo.as_ref(), user_id, &session, lat, lng).await?;
    }

    info!(user = %user_id, "following zone document");
    tokio::select! {
        result = follow_repository(repo.as_ref(), user_id, &session) => result?,
        _ = tokio::signal::ctrl_c() => info!("shutdown requested"),
    }

    drop(session);
    if let Ok(session) = task.await {
        info!(alerted = session.tracker().len(), "zone session drained");
    }
    Ok(())
}

fn resolve_user(raw: Option<&str>) -> UserId {
    match raw.map(|value| (value, UserId::parse(value))) {
        Some((_, Some(user_id))) => user_id,
        Some((value, None)) => {
            let user_id = UserId::new();
            warn!(value, user = %user_id, "SC_USER_ID is not a uuid; using a fresh id");
            user_id
        }
        None => UserId::new(),
    }
}

async fn load_document(path: Option<&str>) -> ScResult<ZoneDocument> {
    let Some(path) = path else {
        return Ok(ZoneDocument::default());
    };
    let raw = tokio::fs::read_to_string(path).await.map_err(|err| {
        ScError::new(
            ErrorCode::InvalidInput,
            format!("cannot read zones file {}: {}", path, err),
        )
    })?;
    let document = ZoneDocument::from_json(&raw).map_err(ScError::from)?;
    info!(path, records = document.len(), "zones file loaded");
    Ok(document)
}

/// Puts the "You" zone into both the session and the stored document when
/// the user has no zones yet. Runs before the document is followed, so the
/// first load already contains the seeded zone.
async fn seed_self_zone(
    repo: &MemoryZoneRepository,
    user_id: UserId,
    session: &SessionHandle,
    lat: f64,
    lng: f64,
) -> ScResult<()> {
    let center = GeoPoint::new(lat, lng).map_err(|err| {
        ScError::new(ErrorCode::InvalidInput, format!("self position: {}", err))
    })?;
    if !repo.load(user_id).await.map_err(ScError::from)?.is_empty() {
        return Ok(());
    }
    if let Some(zone) = session.bootstrap_self_zone(center).await? {
        save_zone(repo, user_id, &zone).await.map_err(ScError::from)?;
    }
    Ok(())
}
