/// Business logic services layer
mod details;
mod launches;
mod retry;

pub use details::{aggregate, DetailService, DetailState};
pub use launches::{filter_and_sort, LaunchService};
pub use retry::{until_cancelled, RetryPolicy};

use crate::errors::ApiError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// What a fetcher currently exposes to the view
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    Idle,
    Loading,
    Failed(ApiError),
    Ready(T),
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn error(&self) -> Option<&ApiError> {
        match self {
            FetchState::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            FetchState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Generation counter plus cancellation token of the request in flight.
///
/// Starting a request supersedes the previous one: its token fires and its
/// generation no longer matches, so a late completion is discarded.
#[derive(Default)]
pub(crate) struct RequestTracker {
    generation: AtomicU64,
    token: Mutex<CancellationToken>,
}

impl RequestTracker {
    pub(crate) fn begin(&self) -> (u64, CancellationToken) {
        let token = CancellationToken::new();
        let previous = match self.token.lock() {
            Ok(mut slot) => std::mem::replace(&mut *slot, token.clone()),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), token.clone()),
        };
        previous.cancel();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        (generation, token)
    }

    /// Cancel whatever is in flight without starting anything new
    pub(crate) fn abandon(&self) {
        let (generation, token) = self.begin();
        token.cancel();
        debug!("Request generation {} abandoned", generation);
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}
