//! Menu pipeline: cached page HTML plus cached per-weekday parse results
//!
//! Each artifact (the page, and each weekday's items) moves through
//! miss -> fetching/parsing -> cached, and falls back to miss only when its
//! TTL runs out. Cache hits are returned as-is and never rewritten, so an
//! entry expires a fixed TTL after it was produced.

use crate::fetcher::{FetchError, MenuFetcher};
use crate::menu_cache::{CacheError, CacheKey, CacheStore, KeyLocks};
use crate::parser::{MenuParser, ParseError};
use lunchmenu_model::{MenuItem, WeekMenu, Weekday};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors surfaced by the pipeline. Cache read problems never show up here;
/// they are treated as misses.
#[derive(Error, Debug)]
pub enum MenuError {
    #[error("Failed to fetch menu page: {0}")]
    Transport(#[from] FetchError),

    #[error("Failed to parse menu: {0}")]
    Parse(#[from] ParseError),

    #[error("Failed to store cache entry: {0}")]
    Storage(#[from] CacheError),
}

pub struct MenuPipeline {
    cache: CacheStore,
    fetcher: Arc<dyn MenuFetcher>,
    parser: Arc<dyn MenuParser>,
    // At most one refill per cache entry in flight
    in_flight: KeyLocks,
}

impl std::fmt::Debug for MenuPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuPipeline")
            .field("cache", &self.cache)
            .field("fetcher", &"<dyn MenuFetcher>")
            .field("parser", &"<dyn MenuParser>")
            .finish()
    }
}

impl MenuPipeline {
    pub fn new(
        cache: CacheStore,
        fetcher: Arc<dyn MenuFetcher>,
        parser: Arc<dyn MenuParser>,
    ) -> Self {
        Self {
            cache,
            fetcher,
            parser,
            in_flight: KeyLocks::new(),
        }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Page HTML from cache, fetching and caching it on a miss
    pub async fn get_raw_html(&self) -> Result<String, MenuError> {
        let key = CacheKey::RawHtml;
        if let Some(html) = self.cache.read(key).await {
            debug!("Cache hit: menu page");
            return Ok(html);
        }

        let _guard = self.in_flight.acquire(key).await;
        // Another request may have refilled the entry while we waited
        if let Some(html) = self.cache.read(key).await {
            debug!("Cache hit after wait: menu page");
            return Ok(html);
        }

        let html = self.fetcher.fetch_html().await?;
        self.cache.write(key, &html).await?;
        info!("💾 Cached menu page ({} bytes)", html.len());

        Ok(html)
    }

    /// Items for `weekday`, parsing `html` only on a miss
    pub async fn get_weekday_items(
        &self,
        weekday: Weekday,
        html: &str,
    ) -> Result<Vec<MenuItem>, MenuError> {
        let key = CacheKey::Weekday(weekday);
        if let Some(items) = self.cache.read_json(key).await {
            debug!("Cache hit: {} menu", weekday);
            return Ok(items);
        }

        let _guard = self.in_flight.acquire(key).await;
        if let Some(items) = self.cache.read_json(key).await {
            debug!("Cache hit after wait: {} menu", weekday);
            return Ok(items);
        }

        let items = self.parser.parse(html, weekday).await?;
        self.cache.write_json(key, &items).await?;
        info!("💾 Cached {} menu ({} items)", weekday, items.len());

        Ok(items)
    }

    pub async fn get_and_parse_day_menu(&self, weekday: Weekday) -> Result<Vec<MenuItem>, MenuError> {
        let html = self.get_raw_html().await?;
        self.get_weekday_items(weekday, &html).await
    }

    /// All five weekdays, resolved one after another
    ///
    /// Fails as a whole if any single day fails.
    pub async fn get_and_parse_weekly_menu(&self) -> Result<WeekMenu, MenuError> {
        let html = self.get_raw_html().await?;

        let mut week = WeekMenu::new();
        for weekday in Weekday::ALL {
            let items = self.get_weekday_items(weekday, &html).await?;
            week.insert(weekday, items);
        }

        Ok(week)
    }
}
