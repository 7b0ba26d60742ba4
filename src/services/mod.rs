//! Services for data loading, aggregation and querying

pub mod aggregator;
pub mod boundaries;
pub mod data_loader;
pub mod format;
pub mod normalizer;
pub mod query;

pub use aggregator::Aggregator;
pub use boundaries::{Boundaries, BoundaryService, BoundarySource};
pub use data_loader::{DataLoaderService, LoadResult, LoadStage};
pub use normalizer::{display_city_name, normalize_city_name};
pub use query::QueryService;
