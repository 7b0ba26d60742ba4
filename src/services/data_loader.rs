//! Unified data loading service for CLI and TUI
//!
//! Reads the CSV datasets, builds the aggregate tables and loads the map
//! boundaries in one place so both front ends share the same pipeline.

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::datasets::load_tables;
use crate::services::boundaries::{Boundaries, BoundaryService};
use crate::services::Aggregator;
use crate::types::{DashboardTables, LoadWarning, Result};

/// Pipeline step currently running, reported to the loading spinner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Reading,
    Aggregating,
    Boundaries,
}

impl LoadStage {
    pub fn message(self) -> &'static str {
        match self {
            Self::Reading => "Reading datasets...",
            Self::Aggregating => "Joining and aggregating...",
            Self::Boundaries => "Loading city boundaries...",
        }
    }
}

/// Result of the full loading pipeline
#[derive(Debug)]
pub struct LoadResult {
    pub tables: DashboardTables,
    /// None when the map is disabled
    pub boundaries: Option<Boundaries>,
    pub warnings: Vec<LoadWarning>,
}

/// Unified data loading service
pub struct DataLoaderService {
    config: AppConfig,
    boundary_service: BoundaryService,
}

impl DataLoaderService {
    pub fn new(config: AppConfig) -> Self {
        let boundary_service = BoundaryService::with_cache_dir(config.state_dir.clone());
        Self {
            config,
            boundary_service,
        }
    }

    /// Load everything without progress reporting
    pub fn load(&self) -> Result<LoadResult> {
        self.load_with_progress(|_| {})
    }

    /// Load everything, calling `on_stage` as each step starts
    pub fn load_with_progress(&self, mut on_stage: impl FnMut(LoadStage)) -> Result<LoadResult> {
        let mut warnings = Vec::new();

        on_stage(LoadStage::Reading);
        info!(data_dir = %self.config.data_dir.display(), "reading datasets");
        let raw = load_tables(&self.config.data_dir)?;

        on_stage(LoadStage::Aggregating);
        let (tables, orphans) = Aggregator::build(&raw);
        drop(raw);
        if orphans > 0 {
            warnings.push(LoadWarning::OrphanItems(orphans));
        }
        info!(
            rows = tables.orders_detail.len(),
            categories = tables.categories.len(),
            "tables ready"
        );

        let boundaries = if self.config.map_enabled {
            on_stage(LoadStage::Boundaries);
            let (boundaries, warning) = self.boundary_service.load(&self.config.boundaries)?;
            if let Some(w) = warning {
                warn!(warning = %w.message(), "boundary load degraded");
                warnings.push(w);
            }
            Some(boundaries)
        } else {
            warnings.push(LoadWarning::NoBoundaries);
            None
        };

        Ok(LoadResult {
            tables,
            boundaries,
            warnings,
        })
    }
}
