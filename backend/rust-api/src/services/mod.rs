use crate::config::Config;
use anyhow::Context;
use std::sync::Arc;

use catalog::Catalog;
use learner_repository::{InMemoryLearnerRepository, LearnerLocks, LearnerRepository};

pub struct AppState {
    pub config: Config,
    pub catalog: Arc<Catalog>,
    pub repository: Arc<dyn LearnerRepository>,
    pub learner_locks: Arc<LearnerLocks>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        tracing::info!("Loading catalog from {}", config.catalog_path);

        let catalog = Catalog::load(&config.catalog_path)
            .with_context(|| format!("Failed to load catalog {}", config.catalog_path))?;

        Ok(Self::with_catalog(config, catalog))
    }

    pub fn with_catalog(config: Config, catalog: Catalog) -> Self {
        Self {
            config,
            catalog: Arc::new(catalog),
            repository: Arc::new(InMemoryLearnerRepository::new()),
            learner_locks: Arc::new(LearnerLocks::new()),
        }
    }
}

pub mod catalog;
pub mod distractor_matcher;
pub mod feedback_composer;
pub mod learner_repository;
pub mod performance_tracker;
pub mod progress_service;
pub mod question_classifier;
pub mod response_service;
