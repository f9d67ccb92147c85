use super::{until_cancelled, FetchState, RequestTracker, RetryPolicy};
use crate::clients::SpaceXApi;
use crate::domain::LaunchDetails;
use crate::errors::{ApiError, ApiResult};
use futures::future::join_all;
use std::fmt::Display;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

/// Fetch one launch and join its rocket, launchpad and payloads onto it.
///
/// Only the launch itself is required; each related record that fails to
/// resolve is left out. Payload order follows the launch's payload list.
pub async fn aggregate(client: &dyn SpaceXApi, id: &str) -> ApiResult<LaunchDetails> {
    let launch = client.fetch_launch(id).await?;

    let rocket = client.fetch_rocket(&launch.rocket);
    let launchpad = client.fetch_launchpad(&launch.launchpad);
    let payloads = join_all(launch.payloads.iter().map(|p| client.fetch_payload(p)));
    let (rocket, launchpad, payloads) = futures::join!(rocket, launchpad, payloads);

    let rocket_details = absent_on_error("rocket", &launch.rocket, rocket);
    let launchpad_details = absent_on_error("launchpad", &launch.launchpad, launchpad);
    let payloads_details = launch
        .payloads
        .iter()
        .zip(payloads)
        .filter_map(|(pid, result)| absent_on_error("payload", pid, result))
        .collect();

    Ok(LaunchDetails {
        launch,
        rocket_details,
        launchpad_details,
        payloads_details,
    })
}

fn absent_on_error<T, E: Display>(what: &str, id: &str, result: Result<T, E>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Dropping {} {} from launch details: {}", what, id, e);
            None
        }
    }
}

/// Selected launch and what is known about it
#[derive(Debug, Clone, PartialEq)]
pub struct DetailState {
    pub launch_id: Option<String>,
    pub status: FetchState<LaunchDetails>,
}

/// Detail aggregator bound to the currently selected launch
pub struct DetailService {
    client: Arc<dyn SpaceXApi>,
    retry: RetryPolicy,
    state: Mutex<DetailState>,
    requests: RequestTracker,
}

impl DetailService {
    pub fn new(client: Arc<dyn SpaceXApi>, retry: RetryPolicy) -> Self {
        Self {
            client,
            retry,
            state: Mutex::new(DetailState {
                launch_id: None,
                status: FetchState::Idle,
            }),
            requests: RequestTracker::default(),
        }
    }

    pub fn state(&self) -> DetailState {
        self.lock_state().clone()
    }

    pub fn selected(&self) -> Option<String> {
        self.lock_state().launch_id.clone()
    }

    /// Switch to `launch_id` (or to nothing) and load it.
    ///
    /// Any aggregation still running for an earlier selection is cancelled
    /// and can no longer write state.
    pub async fn select(&self, launch_id: Option<&str>) -> DetailState {
        let (generation, token) = self.requests.begin();
        let Some(id) = launch_id.map(str::to_string) else {
            token.cancel();
            self.set_state(DetailState {
                launch_id: None,
                status: FetchState::Idle,
            });
            return self.state();
        };
        self.set_state(DetailState {
            launch_id: Some(id.clone()),
            status: FetchState::Loading,
        });

        let client = self.client.clone();
        let label = format!("launch {id}");
        let result = until_cancelled(
            &token,
            self.retry.run(&label, || {
                let client = client.clone();
                let id = id.clone();
                async move { aggregate(client.as_ref(), &id).await }
            }),
        )
        .await;

        if !self.requests.is_current(generation) {
            debug!("Discarding stale details for {} (generation {})", id, generation);
            return self.state();
        }

        let status = match result {
            Ok(details) => {
                info!(
                    "Launch {} aggregated with {} payloads",
                    id,
                    details.payloads_details.len()
                );
                FetchState::Ready(details)
            }
            Err(ApiError::Cancelled) => return self.state(),
            Err(e) => {
                error!("Launch details for {} failed: {}", id, e);
                FetchState::Failed(e)
            }
        };
        self.set_state(DetailState {
            launch_id: Some(id),
            status,
        });
        self.state()
    }

    /// Reload the current selection; a no-op when nothing is selected
    pub async fn refetch(&self) -> DetailState {
        match self.selected() {
            Some(id) => self.select(Some(&id)).await,
            None => self.state(),
        }
    }

    /// Drop the selection and ignore whatever is still in flight for it
    pub fn cancel(&self) {
        self.requests.abandon();
        self.set_state(DetailState {
            launch_id: None,
            status: FetchState::Idle,
        });
    }

    fn set_state(&self, next: DetailState) {
        *self.lock_state() = next;
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, DetailState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{connect_error, launch, launchpad, payload, rocket, FakeSpaceX};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn fixture() -> FakeSpaceX {
        let mut l = launch("L1", "CRS-20", "2020-03-07T04:50:31.000Z", Some(true));
        l.rocket = "falcon9".into();
        l.launchpad = "slc40".into();
        l.payloads = vec!["p1".into(), "p2".into(), "p3".into()];

        let mut fake = FakeSpaceX::with_launches(vec![
            l,
            launch("L2", "Starlink-5", "2020-03-18T12:16:00.000Z", Some(true)),
        ]);
        fake.rockets.insert("falcon9".into(), rocket("falcon9", "Falcon 9"));
        fake.launchpads
            .insert("slc40".into(), launchpad("slc40", "CCSFS SLC 40"));
        for p in ["p1", "p2", "p3"] {
            fake.payloads.insert(p.into(), payload(p, &format!("Payload {p}")));
        }
        fake
    }

    #[tokio::test]
    async fn test_aggregate_joins_all_parts() {
        let fake = fixture();
        let details = aggregate(&fake, "L1").await.unwrap();
        assert_eq!(details.launch.name, "CRS-20");
        assert_eq!(details.rocket_details.unwrap().name, "Falcon 9");
        assert_eq!(details.launchpad_details.unwrap().name, "CCSFS SLC 40");
        let pids: Vec<_> = details.payloads_details.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(pids, ["p1", "p2", "p3"]);
    }

    #[tokio::test]
    async fn test_failed_rocket_is_absent_not_fatal() {
        let mut fake = fixture();
        fake.broken.insert("falcon9".into());
        let details = aggregate(&fake, "L1").await.unwrap();
        assert!(details.rocket_details.is_none());
        assert!(details.launchpad_details.is_some());
        assert_eq!(details.payloads_details.len(), 3);
    }

    #[tokio::test]
    async fn test_failed_payloads_dropped_in_order() {
        let mut fake = fixture();
        fake.broken.insert("p2".into());
        let details = aggregate(&fake, "L1").await.unwrap();
        let pids: Vec<_> = details.payloads_details.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(pids, ["p1", "p3"]);
    }

    #[tokio::test]
    async fn test_missing_launch_fails_whole_aggregate() {
        let fake = fixture();
        let err = aggregate(&fake, "nope").await.unwrap_err();
        assert!(matches!(err, ApiError::HttpStatus { status: 404, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_retries_network_failures() {
        let fake = Arc::new(fixture());
        fake.fail_launch([connect_error(), connect_error()]);
        let service = DetailService::new(fake.clone(), RetryPolicy::default());

        let state = service.select(Some("L1")).await;
        assert_eq!(state.launch_id.as_deref(), Some("L1"));
        assert!(state.status.ready().is_some());
        assert_eq!(fake.launch_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_selection_never_overwrites() {
        let mut fake = fixture();
        fake.delays.insert("L1".into(), Duration::from_secs(5));
        let service = Arc::new(DetailService::new(Arc::new(fake), RetryPolicy::default()));

        let slow = {
            let service = service.clone();
            tokio::spawn(async move { service.select(Some("L1")).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        let fast = service.select(Some("L2")).await;
        assert_eq!(
            fast.status.ready().map(|d| d.launch.id.as_str()),
            Some("L2")
        );

        slow.await.unwrap();
        let state = service.state();
        assert_eq!(state.launch_id.as_deref(), Some("L2"));
        assert_eq!(
            state.status.ready().map(|d| d.launch.id.as_str()),
            Some("L2")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_deselect_clears_and_cancels() {
        let mut fake = fixture();
        fake.delays.insert("L1".into(), Duration::from_secs(5));
        let service = Arc::new(DetailService::new(Arc::new(fake), RetryPolicy::default()));

        let pending = {
            let service = service.clone();
            tokio::spawn(async move { service.select(Some("L1")).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        let cleared = service.select(None).await;
        assert_eq!(cleared.status, FetchState::Idle);

        pending.await.unwrap();
        assert_eq!(service.state().launch_id, None);
        assert_eq!(service.state().status, FetchState::Idle);
    }

    #[tokio::test]
    async fn test_refetch_reloads_current_selection() {
        let fake = Arc::new(fixture());
        let service = DetailService::new(fake.clone(), RetryPolicy::default());
        assert_eq!(service.refetch().await.status, FetchState::Idle);

        service.select(Some("L2")).await;
        service.refetch().await;
        assert_eq!(fake.launch_calls.load(Ordering::SeqCst), 2);
        assert_eq!(service.selected().as_deref(), Some("L2"));
    }
}
