use std::sync::Arc;

use config::Config;
use crawler::{Aggregator, PageSource};

pub mod config;
pub mod crawler;
pub mod error;
pub mod export;
pub mod middleware;
pub mod models;
pub mod result;
pub mod router;
pub mod routes;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub aggregator: Aggregator,
}

impl AppState {
    pub fn new(config: Config, source: Arc<dyn PageSource>) -> Self {
        let aggregator = Aggregator::new(source, config.fetch_concurrency);
        Self { config, aggregator }
    }
}
