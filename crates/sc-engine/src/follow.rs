use crate::session::SessionHandle;
use sc_core::{ScError, ScResult, UserId};
use sc_storage::ZoneRepository;
use tracing::{debug, info};

/// Feeds a user's stored document into the session until either side goes
/// away.
///
/// The current document is applied first, then every change as it arrives.
/// Changes that land while a previous one is still being applied collapse
/// into the newest document. Returns `Ok` when the repository closes the
/// subscription.
pub async fn follow_repository<R>(repo: &R, user_id: UserId, session: &SessionHandle) -> ScResult<()>
where
    R: ZoneRepository + ?Sized,
{
    let mut subscription = repo.subscribe(user_id).await.map_err(ScError::from)?;

    let document = subscription.current();
    let outcome = session.apply_document(document.records).await?;
    info!(
        user = %user_id,
        rejected = outcome.rejected.len(),
        alerted = outcome.notified.len(),
        "zone document loaded"
    );

    while let Some(document) = subscription.changed().await {
        let outcome = session.apply_document(document.records).await?;
        debug!(
            user = %user_id,
            zones = outcome.attached(),
            alerted = outcome.notified.len(),
            "zone document applied"
        );
    }
    info!(user = %user_id, "zone subscription closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::NoopRenderer;
    use crate::session::ZoneSession;
    use crate::testing::{hazard, watch, RecordingAlerts};
    use sc_config::EngineConfig;
    use sc_core::{ErrorCode, ZoneKind};
    use sc_storage::{MemoryZoneRepository, ZoneDocument, save_zone};
    use std::sync::Arc;
    use std::time::Duration;

    async fn wait_for_alerts(alerts: &RecordingAlerts, count: usize) {
        for _ in 0..100 {
            if alerts.alerts().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {count} alerts, saw {}", alerts.alerts().len());
    }

    #[tokio::test]
    async fn follows_document_changes() {
        let user = UserId::new();
        let initial = ZoneDocument::from_zones([&watch("w1", 14.5646, 500.0)]);
        let repo = Arc::new(MemoryZoneRepository::with_document(user, initial));

        let alerts = Arc::new(RecordingAlerts::default());
        let session =
            ZoneSession::new(&EngineConfig::default(), Arc::new(NoopRenderer), alerts.clone())
                .unwrap();
        let (handle, _task) = SessionHandle::spawn(session);

        let follower = {
            let repo = repo.clone();
            let handle = handle.clone();
            tokio::spawn(async move { follow_repository(repo.as_ref(), user, &handle).await })
        };

        save_zone(repo.as_ref(), user, &hazard("h1", 14.5699, 100.0))
            .await
            .unwrap();
        wait_for_alerts(&alerts, 1).await;

        assert_eq!(handle.zones(ZoneKind::Watch).await.unwrap().len(), 1);
        assert_eq!(handle.zones(ZoneKind::Hazard).await.unwrap().len(), 1);
        assert_eq!(alerts.alerts()[0].dedup_key(), "w1|h1");

        follower.abort();
    }

    #[tokio::test]
    async fn stopped_session_ends_follow() {
        let user = UserId::new();
        let repo = MemoryZoneRepository::new();
        let session = ZoneSession::new(
            &EngineConfig::default(),
            Arc::new(NoopRenderer),
            Arc::new(RecordingAlerts::default()),
        )
        .unwrap();
        let (handle, task) = SessionHandle::spawn(session);
        task.abort();
        let _ = task.await;

        let err = follow_repository(&repo, user, &handle).await.unwrap_err();
        assert!(err.is(ErrorCode::Unavailable));
    }
}
