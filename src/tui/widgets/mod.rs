//! TUI widgets

pub mod cards;
pub mod choropleth;
pub mod filters;
pub mod help;
pub mod spinner;
pub mod top_cities;
