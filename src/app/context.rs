use std::sync::Arc;

use crate::app::error::Result;
use crate::config::Config;
use crate::fetcher::HttpFetcher;
use crate::fetcher::{Fetcher, SourceFetcher};
use crate::normalizer::Normalizer;
use crate::render::Renderer;
use crate::resolver::SourceResolver;

pub struct AppContext {
    pub config: Config,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub resolver: SourceResolver,
    pub normalizer: Normalizer,
    pub renderer: Renderer,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let http = HttpFetcher::with_options(&config.sources.user_agent, config.sources.timeout())?;
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(SourceFetcher::new(http));
        Self::with_fetcher(config, fetcher)
    }

    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher + Send + Sync>) -> Result<Self> {
        let resolver = SourceResolver::from_config(&config.sources)?;
        let normalizer = Normalizer::from_config(&config.feed);
        let renderer = Renderer::from_config(&config.render);

        Ok(Self {
            config,
            fetcher,
            resolver,
            normalizer,
            renderer,
        })
    }
}
