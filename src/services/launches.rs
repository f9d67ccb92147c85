use super::{until_cancelled, FetchState, RequestTracker, RetryPolicy};
use crate::clients::SpaceXApi;
use crate::domain::{Launch, LaunchFilters, SortOrder};
use crate::errors::ApiError;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

/// Filter then sort by UTC timestamp; the input is left untouched.
///
/// The sort is stable, so launches sharing a timestamp keep collection order.
pub fn filter_and_sort(
    launches: &[Launch],
    filters: &LaunchFilters,
    favorites: &[String],
    sort: SortOrder,
) -> Vec<Launch> {
    let mut out: Vec<Launch> = launches
        .iter()
        .filter(|l| filters.matches(l, favorites))
        .cloned()
        .collect();
    match sort {
        SortOrder::Desc => out.sort_by(|a, b| b.date_utc.cmp(&a.date_utc)),
        SortOrder::Asc => out.sort_by(|a, b| a.date_utc.cmp(&b.date_utc)),
    }
    out
}

/// Collection fetcher: one request for the whole launch list, re-derived
/// locally on every filter change.
pub struct LaunchService {
    client: Arc<dyn SpaceXApi>,
    retry: RetryPolicy,
    state: Mutex<FetchState<Arc<Vec<Launch>>>>,
    requests: RequestTracker,
}

impl LaunchService {
    pub fn new(client: Arc<dyn SpaceXApi>, retry: RetryPolicy) -> Self {
        Self {
            client,
            retry,
            state: Mutex::new(FetchState::Idle),
            requests: RequestTracker::default(),
        }
    }

    pub fn state(&self) -> FetchState<Arc<Vec<Launch>>> {
        self.lock_state().clone()
    }

    /// Fetch the collection (initial load or manual retry).
    ///
    /// A newer `refetch` or `cancel` makes this one return quietly without
    /// touching state.
    pub async fn refetch(&self) -> FetchState<Arc<Vec<Launch>>> {
        let (generation, token) = self.requests.begin();
        self.set_state(FetchState::Loading);

        let client = self.client.clone();
        let result = until_cancelled(
            &token,
            self.retry.run("launches", || {
                let client = client.clone();
                async move { client.fetch_launches().await }
            }),
        )
        .await;

        if !self.requests.is_current(generation) {
            debug!("Discarding stale launches response (generation {})", generation);
            return self.state();
        }

        match result {
            Ok(launches) => {
                info!("Loaded {} launches", launches.len());
                self.set_state(FetchState::Ready(Arc::new(launches)));
            }
            Err(ApiError::Cancelled) => {
                debug!("Launches request cancelled");
            }
            Err(e) => {
                error!("Launches fetch failed: {}", e);
                self.set_state(FetchState::Failed(e));
            }
        }
        self.state()
    }

    /// Abort the in-flight fetch; its completion will be ignored
    pub fn cancel(&self) {
        self.requests.abandon();
        let mut state = self.lock_state();
        if state.is_loading() {
            *state = FetchState::Idle;
        }
    }

    /// Filtered and sorted view of the fetched collection, empty until loaded
    pub fn launches(
        &self,
        filters: &LaunchFilters,
        favorites: &[String],
        sort: SortOrder,
    ) -> Vec<Launch> {
        match self.state() {
            FetchState::Ready(all) => filter_and_sort(&all, filters, favorites, sort),
            _ => Vec::new(),
        }
    }

    fn set_state(&self, next: FetchState<Arc<Vec<Launch>>>) {
        *self.lock_state() = next;
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, FetchState<Arc<Vec<Launch>>>> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
