//! Canned-response fetcher for tests and offline runs.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::{FetchError, FetchResult, UpstreamFetcher};

#[derive(Debug, Clone)]
enum Canned {
    Json(Value),
    Status(u16),
}

/// Serves fixed JSON bodies or error statuses keyed by path.
///
/// Unknown paths answer with HTTP 404, like a real REST API.
#[derive(Clone, Default)]
pub struct StaticFetcher {
    responses: Arc<HashMap<String, Canned>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `path`.
    pub fn with_json(mut self, path: impl Into<String>, body: Value) -> Self {
        Arc::make_mut(&mut self.responses).insert(normalize(&path.into()), Canned::Json(body));
        self
    }

    /// Fail `path` with `status`.
    pub fn with_status(mut self, path: impl Into<String>, status: u16) -> Self {
        Arc::make_mut(&mut self.responses).insert(normalize(&path.into()), Canned::Status(status));
        self
    }

    /// Paths requested so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

fn normalize(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

#[async_trait]
impl UpstreamFetcher for StaticFetcher {
    async fn fetch_json(&self, path: &str) -> FetchResult<Value> {
        let path = normalize(path);
        self.calls.lock().push(path.clone());

        match self.responses.get(&path) {
            Some(Canned::Json(body)) => Ok(body.clone()),
            Some(Canned::Status(status)) => Err(FetchError::Status {
                status: *status,
                url: path,
            }),
            None => Err(FetchError::Status {
                status: 404,
                url: path,
            }),
        }
    }
}
