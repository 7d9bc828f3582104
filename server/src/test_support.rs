//! Stub collaborators and cache helpers shared by unit tests

use crate::fetcher::{FetchError, MenuFetcher};
use crate::menu_cache::{CacheKey, CacheStore, LocalBlobStore};
use crate::parser::{MenuParser, ParseError};
use lunchmenu_model::{MenuItem, Weekday};
use reqwest::StatusCode;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

pub const PAGE_HTML: &str = "<h2>Viikko 42</h2><p>Maanantai: Lohikeitto</p>";

/// Cache rooted in a fresh temp directory with the default TTL
pub fn temp_cache() -> (CacheStore, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let cache = CacheStore::with_default_ttl(Arc::new(LocalBlobStore::new(temp_dir.path())));
    (cache, temp_dir)
}

/// Pretend an entry under `dir` was last written `hours` ago
pub fn backdate_entry(dir: &Path, key: CacheKey, hours: u64) {
    let file = std::fs::File::options()
        .write(true)
        .open(dir.join(key.entry_name()))
        .unwrap();
    file.set_modified(SystemTime::now() - Duration::from_secs(hours * 60 * 60))
        .unwrap();
}

/// What `StubParser` returns for a day
pub fn sample_items(weekday: Weekday) -> Vec<MenuItem> {
    vec![
        MenuItem {
            name: format!("{} soup", weekday),
            description: Some("with bread".to_string()),
            price: Some("11,90 €".to_string()),
            diets: vec!["L".to_string()],
        },
        MenuItem::new(format!("{} salad", weekday)),
    ]
}

/// Fetcher returning fixed HTML and counting calls
pub struct StubFetcher {
    html: Option<String>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn new(html: &str) -> Self {
        Self {
            html: Some(html.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Every fetch fails with a 502
    pub fn failing() -> Self {
        Self {
            html: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl MenuFetcher for StubFetcher {
    async fn fetch_html(&self) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.html
            .clone()
            .ok_or(FetchError::Status(StatusCode::BAD_GATEWAY))
    }
}

/// Parser returning `sample_items` and recording every call
#[derive(Default)]
pub struct StubParser {
    calls: Mutex<Vec<(String, Weekday)>>,
    fail_on: Option<Weekday>,
    delay: Option<Duration>,
}

impl StubParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, weekday: Weekday) -> Self {
        self.fail_on = Some(weekday);
        self
    }

    /// Simulate a slow model call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// (html, weekday) of every call, in call order
    pub fn calls(&self) -> Vec<(String, Weekday)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MenuParser for StubParser {
    async fn parse(&self, html: &str, weekday: Weekday) -> Result<Vec<MenuItem>, ParseError> {
        self.calls.lock().unwrap().push((html.to_string(), weekday));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_on == Some(weekday) {
            return Err(ParseError::EmptyResponse);
        }
        Ok(sample_items(weekday))
    }
}
