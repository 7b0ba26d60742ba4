//! Type definitions for olistdash

mod error;
mod records;
mod tables;

pub use error::*;
pub use records::*;
pub use tables::*;

/// Non-fatal problems collected while loading, surfaced in the TUI footer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// Order items referencing an order id that is not in the orders file
    OrphanItems(usize),
    /// Boundary cache was stale and could not be refreshed
    StaleBoundaries(String),
    /// Map disabled or boundaries unavailable
    NoBoundaries,
}

impl LoadWarning {
    pub fn message(&self) -> String {
        match self {
            Self::OrphanItems(n) => format!("{} order items without a matching order", n),
            Self::StaleBoundaries(reason) => format!("using stale map cache ({})", reason),
            Self::NoBoundaries => "map disabled".to_string(),
        }
    }
}
