//! Page-level composition of the fetchers, favorites and view state.

use crate::clients::{SpaceXApi, SpaceXClient};
use crate::config::AppConfig;
use crate::domain::{Launch, OutcomeFilter, SortOrder};
use crate::errors::{ApiResult, ErrorNotice};
use crate::repo::{FavoritesStore, FileStore, KeyValueStore};
use crate::services::{DetailService, DetailState, FetchState, LaunchService};
use crate::stats::{LaunchStatistics, Timeline};
use crate::view::{available_years, Debouncer, PageView, ViewState};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// What the list area shows
#[derive(Debug, Clone, PartialEq)]
pub enum ListView {
    Loading,
    Error(ErrorNotice),
    Empty { favorites_only: bool },
    Page(PageView),
}

pub struct Browser {
    launches: LaunchService,
    details: DetailService,
    favorites: Mutex<FavoritesStore>,
    view: Mutex<ViewState>,
    debouncer: Debouncer,
}

impl Browser {
    pub fn new(
        client: Arc<dyn SpaceXApi>,
        store: Arc<dyn KeyValueStore>,
        config: &AppConfig,
    ) -> Self {
        Self {
            launches: LaunchService::new(client.clone(), config.retry),
            details: DetailService::new(client, config.retry),
            favorites: Mutex::new(FavoritesStore::load(store)),
            view: Mutex::new(ViewState::from_query(
                &config.initial_query,
                config.page_size,
            )),
            debouncer: Debouncer::new(config.search_debounce),
        }
    }

    /// Wire the real SpaceX client and the favorites file from `config`
    pub fn from_config(config: &AppConfig) -> ApiResult<Self> {
        let client = SpaceXClient::new(config.api_url.clone(), config.http_timeout)?;
        info!(
            "Using {} with favorites at {}",
            client.base_url(),
            config.favorites_path.display()
        );
        let store = FileStore::new(config.favorites_path.clone());
        Ok(Self::new(Arc::new(client), Arc::new(store), config))
    }

    /// Initial load and the "try again" action share this path
    pub async fn load(&self) -> ListView {
        self.launches.refetch().await;
        self.list()
    }

    /// Stop caring about anything in flight
    pub fn unmount(&self) {
        self.launches.cancel();
        self.details.cancel();
    }

    /// Filtered and sorted collection under the current view state
    pub fn filtered(&self) -> Vec<Launch> {
        let filters = self.lock_view().effective_filters();
        let sort = self.lock_view().sort();
        let favorites = self.favorites();
        self.launches.launches(&filters, &favorites, sort)
    }

    pub fn list(&self) -> ListView {
        match self.launches.state() {
            FetchState::Idle | FetchState::Loading => ListView::Loading,
            FetchState::Failed(e) => ListView::Error(ErrorNotice::from(&e)),
            FetchState::Ready(_) => {
                let filtered = self.filtered();
                let mut view = self.lock_view();
                let page = view.paginate(&filtered);
                if page.items.is_empty() {
                    ListView::Empty {
                        favorites_only: page.favorites_only,
                    }
                } else {
                    ListView::Page(page)
                }
            }
        }
    }

    /// Apply `text` as the search filter once typing pauses.
    ///
    /// Returns `false` when a later keystroke superseded this one.
    pub async fn search(&self, text: &str) -> bool {
        match self.debouncer.settle(text.to_string()).await {
            Some(text) => {
                debug!("Search settled on {:?}", text);
                self.lock_view().set_search(text);
                true
            }
            None => false,
        }
    }

    pub fn set_year(&self, year: Option<i32>) {
        self.lock_view().set_year(year);
    }

    pub fn set_outcome(&self, outcome: OutcomeFilter) {
        self.lock_view().set_outcome(outcome);
    }

    pub fn set_sort(&self, sort: SortOrder) {
        self.lock_view().set_sort(sort);
    }

    pub fn toggle_show_favorites(&self) -> bool {
        let mut view = self.lock_view();
        let show = !view.show_favorites();
        view.set_show_favorites(show);
        show
    }

    pub fn go_to_page(&self, page: usize) {
        self.lock_view().go_to_page(page);
    }

    pub fn view_state(&self) -> ViewState {
        self.lock_view().clone()
    }

    /// Query string mirroring the active filters
    pub fn query_string(&self) -> String {
        self.lock_view().to_query()
    }

    /// Years offered by the year selector
    pub fn years(&self) -> Vec<i32> {
        match self.launches.state() {
            FetchState::Ready(all) => available_years(&all),
            _ => Vec::new(),
        }
    }

    pub fn favorites(&self) -> Vec<String> {
        self.lock_favorites().favorites().to_vec()
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.lock_favorites().is_favorite(id)
    }

    pub fn toggle_favorite(&self, id: &str) -> ApiResult<bool> {
        self.lock_favorites().toggle(id)
    }

    pub fn statistics(&self) -> LaunchStatistics {
        LaunchStatistics::compute(&self.filtered())
    }

    pub fn timeline(&self) -> Timeline {
        Timeline::build(&self.filtered())
    }

    pub fn details(&self) -> &DetailService {
        &self.details
    }

    pub async fn open_details(&self, id: &str) -> DetailState {
        self.details.select(Some(id)).await
    }

    pub async fn close_details(&self) {
        self.details.select(None).await;
    }

    fn lock_view(&self) -> MutexGuard<'_, ViewState> {
        self.view.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_favorites(&self) -> MutexGuard<'_, FavoritesStore> {
        self.favorites
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
