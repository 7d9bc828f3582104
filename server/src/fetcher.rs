//! Menu page fetcher
//!
//! Downloads the lunch page and strips markup the parser has no use for
//! (scripts, inline SVG, images) before it is cached.

use regex::Regex;
use reqwest::{Client, StatusCode};
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Page the menu is published on
pub const DEFAULT_MENU_URL: &str = "https://blanko.net/lounas";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Menu page returned HTTP {0}")]
    Status(StatusCode),
}

/// Source of the raw menu HTML
#[async_trait::async_trait]
pub trait MenuFetcher: Send + Sync {
    /// Fetch the page with non-content markup already removed
    async fn fetch_html(&self) -> Result<String, FetchError>;
}

/// Fetches the menu page over HTTP
#[derive(Debug, Clone)]
pub struct HttpMenuFetcher {
    client: Client,
    url: String,
}

impl HttpMenuFetcher {
    pub fn new(url: impl Into<String>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(concat!("lunchmenu/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl MenuFetcher for HttpMenuFetcher {
    async fn fetch_html(&self) -> Result<String, FetchError> {
        info!("🌐 Fetching menu page: {}", self.url);

        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let page = response.text().await?;
        let html = strip_non_content(&page);
        debug!("Fetched {} bytes, {} after stripping", page.len(), html.len());

        Ok(html)
    }
}

static BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body\b[^>]*>(.*)</body\s*>").expect("valid regex"));
static SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*/>|<script\b[^>]*>.*?</script\s*>").expect("valid regex")
});
static SVG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<svg\b[^>]*/>|<svg\b[^>]*>.*?</svg\s*>").expect("valid regex")
});
static IMG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<img\b[^>]*>").expect("valid regex"));

/// Body inner HTML with `script`, `svg` and `img` elements removed
///
/// Falls back to the whole document when there is no `<body>`.
pub fn strip_non_content(page: &str) -> String {
    let body = BODY
        .captures(page)
        .and_then(|caps| caps.get(1))
        .map_or(page, |m| m.as_str());

    let without_scripts = SCRIPT.replace_all(body, "");
    let without_svg = SVG.replace_all(&without_scripts, "");
    IMG.replace_all(&without_svg, "").into_owned()
}
