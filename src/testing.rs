//! Fixtures and an in-memory `SpaceXApi` with scripted failures.

use crate::clients::SpaceXApi;
use crate::domain::{Launch, LaunchLinks, Launchpad, Payload, Rocket};
use crate::errors::{ApiError, ApiResult, NetworkKind};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn launch(id: &str, name: &str, date_utc: &str, success: Option<bool>) -> Launch {
    let date_utc: chrono::DateTime<chrono::Utc> = date_utc.parse().unwrap();
    Launch {
        id: id.to_string(),
        name: name.to_string(),
        date_utc,
        date_local: date_utc.with_timezone(&chrono::FixedOffset::east_opt(0).unwrap()),
        success,
        upcoming: false,
        details: None,
        rocket: format!("rocket-{id}"),
        launchpad: format!("pad-{id}"),
        payloads: Vec::new(),
        links: LaunchLinks::default(),
    }
}

pub fn rocket(id: &str, name: &str) -> Rocket {
    serde_json::from_value(serde_json::json!({ "id": id, "name": name, "type": "rocket" })).unwrap()
}

pub fn launchpad(id: &str, name: &str) -> Launchpad {
    serde_json::from_value(serde_json::json!({ "id": id, "name": name })).unwrap()
}

pub fn payload(id: &str, name: &str) -> Payload {
    serde_json::from_value(serde_json::json!({ "id": id, "name": name, "type": "Satellite" }))
        .unwrap()
}

pub fn connect_error() -> ApiError {
    ApiError::network(NetworkKind::Connect, "connection refused")
}

#[derive(Default)]
pub struct FakeSpaceX {
    pub launches: Vec<Launch>,
    pub rockets: HashMap<String, Rocket>,
    pub launchpads: HashMap<String, Launchpad>,
    pub payloads: HashMap<String, Payload>,
    /// Per-launch latency for `fetch_launch`
    pub delays: HashMap<String, Duration>,
    /// Ids whose sub-resource lookups fail with a network error
    pub broken: HashSet<String>,
    collection_failures: Mutex<VecDeque<ApiError>>,
    launch_failures: Mutex<VecDeque<ApiError>>,
    pub collection_calls: AtomicUsize,
    pub launch_calls: AtomicUsize,
}

impl FakeSpaceX {
    pub fn with_launches(launches: Vec<Launch>) -> Self {
        Self {
            launches,
            ..Default::default()
        }
    }

    /// Queue errors returned by the next `fetch_launches` calls
    pub fn fail_collection(&self, errors: impl IntoIterator<Item = ApiError>) {
        self.collection_failures.lock().unwrap().extend(errors);
    }

    /// Queue errors returned by the next `fetch_launch` calls
    pub fn fail_launch(&self, errors: impl IntoIterator<Item = ApiError>) {
        self.launch_failures.lock().unwrap().extend(errors);
    }

    fn lookup<T: Clone>(&self, map: &HashMap<String, T>, id: &str) -> ApiResult<T> {
        if self.broken.contains(id) {
            return Err(connect_error());
        }
        map.get(id).cloned().ok_or_else(|| ApiError::HttpStatus {
            status: 404,
            url: format!("fake://{id}"),
        })
    }
}

#[async_trait]
impl SpaceXApi for FakeSpaceX {
    async fn fetch_launches(&self) -> ApiResult<Vec<Launch>> {
        self.collection_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.collection_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        Ok(self.launches.clone())
    }

    async fn fetch_launch(&self, id: &str) -> ApiResult<Launch> {
        self.launch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(id) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(err) = self.launch_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        self.launches
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| ApiError::HttpStatus {
                status: 404,
                url: format!("fake://launches/{id}"),
            })
    }

    async fn fetch_rocket(&self, id: &str) -> ApiResult<Rocket> {
        self.lookup(&self.rockets, id)
    }

    async fn fetch_launchpad(&self, id: &str) -> ApiResult<Launchpad> {
        self.lookup(&self.launchpads, id)
    }

    async fn fetch_payload(&self, id: &str) -> ApiResult<Payload> {
        self.lookup(&self.payloads, id)
    }
}
