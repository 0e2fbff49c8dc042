//! Shared application state

use siteforge_builder::SitePipeline;
use std::sync::Arc;

use crate::generator::SiteGenerator;

/// State handed to every request handler
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SitePipeline>,
    pub generator: Arc<dyn SiteGenerator>,
}

impl AppState {
    pub fn new(pipeline: SitePipeline, generator: impl SiteGenerator + 'static) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            generator: Arc::new(generator),
        }
    }
}
