//! Derived tables and dashboard outputs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// City id used when a city has no match in the county lookup
pub const UNMATCHED_CITY_ID: &str = "0";

/// One row per order item, enriched with category and order attributes
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderDetail {
    pub order_id: String,
    pub customer_id: String,
    pub purchase_year: i32,
    pub category: Option<String>,
    pub total_value: f64,
    pub approved_at: Option<NaiveDateTime>,
    pub status: String,
}

/// One normalized city from the geolocation table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeoCity {
    /// Normalized (ASCII-folded, lowercase) city name
    pub name: String,
    pub state: String,
    /// Integer-valued municipality code, "0" when unmatched
    pub city_id: String,
}

/// Distinct order count per (city, year, category) group
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CustomerLocation {
    pub city_id: String,
    pub city_name: String,
    pub purchase_year: i32,
    pub category: String,
    pub order_count: u64,
}

/// All precomputed tables the query service filters over
#[derive(Debug, Clone, Default)]
pub struct DashboardTables {
    pub orders_detail: Vec<OrderDetail>,
    pub customers_loc: Vec<CustomerLocation>,
    pub categories: Vec<String>,
    pub years: Vec<i32>,
}

/// Ranked city row for the top cities table
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TopCity {
    pub city: String,
    pub orders: u64,
}

/// Display strings for the four summary cards
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SummaryCards {
    pub revenue: String,
    pub total_orders: String,
    pub avg_ticket: String,
    pub approval_rate: String,
}

/// Everything the dashboard shows for one (year, category) selection
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Summary {
    pub year: i32,
    pub category: String,
    pub revenue_brl: f64,
    pub total_orders: u64,
    pub approved_orders: u64,
    pub cards: SummaryCards,
    pub top_cities: Vec<TopCity>,
    pub map_data: Vec<CustomerLocation>,
}
