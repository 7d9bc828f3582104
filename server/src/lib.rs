pub mod config;
pub mod fetcher;
pub mod menu_cache;
pub mod parser;
pub mod pipeline;
pub mod server;

// Re-export commonly used types
pub use config::{ConfigError, ServerConfig};
pub use fetcher::{FetchError, HttpMenuFetcher, MenuFetcher};
pub use menu_cache::{BlobStore, CacheError, CacheKey, CacheStore, LocalBlobStore};
pub use parser::{MenuParser, OpenAiMenuParser, ParseError};
pub use pipeline::{MenuError, MenuPipeline};

use std::sync::Arc;

pub type AppState = Arc<MenuPipeline>;

/// Wire the production collaborators together from configuration
pub fn build_pipeline(config: &ServerConfig) -> Result<MenuPipeline, StartupError> {
    let blobs = Arc::new(LocalBlobStore::new(&config.cache_dir));
    let cache = CacheStore::new(blobs, config.cache_ttl);

    let fetcher = Arc::new(HttpMenuFetcher::new(config.menu_url.clone())?);
    let parser = Arc::new(OpenAiMenuParser::new(
        config.openai.base_url.clone(),
        config.openai.model.clone(),
        config.openai.api_key.clone(),
    )?);

    Ok(MenuPipeline::new(cache, fetcher, parser))
}

/// Anything that keeps the service from starting
#[derive(thiserror::Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build menu fetcher: {0}")]
    Fetcher(#[from] FetchError),

    #[error("Failed to build menu parser: {0}")]
    Parser(#[from] ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod test_support;
