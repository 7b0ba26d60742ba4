//! Aggregator service for building the dashboard tables

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use rayon::prelude::*;
use tracing::{debug, warn};

use super::normalizer::normalize_city_name;
use crate::datasets::RawTables;
use crate::types::{
    CityIdRecord, CustomerLocation, CustomerRecord, DashboardTables, GeoCity, GeolocationRecord,
    OrderDetail, OrderItemRecord, OrderRecord, ProductRecord, UNMATCHED_CITY_ID,
};

/// Group key for `customers_loc`: (city id, city name, year, category)
type LocationKey = (String, String, i32, String);

/// Aggregator for the joined tables
pub struct Aggregator;

impl Aggregator {
    /// Build every derived table from the raw datasets.
    /// Returns the tables and the number of order items dropped for lacking an order.
    pub fn build(raw: &RawTables) -> (DashboardTables, usize) {
        let (orders_detail, orphans) =
            Self::orders_detail(&raw.order_items, &raw.products, &raw.orders);
        let geo_cities = Self::geo_cities(&raw.geolocation, &raw.city_ids);
        let customers_loc = Self::customers_loc(&raw.customers, &geo_cities, &orders_detail);
        let categories = Self::categories(&orders_detail);
        let years = Self::years(&orders_detail);

        debug!(
            orders_detail = orders_detail.len(),
            geo_cities = geo_cities.len(),
            customers_loc = customers_loc.len(),
            categories = categories.len(),
            "aggregation finished"
        );

        (
            DashboardTables {
                orders_detail,
                customers_loc,
                categories,
                years,
            },
            orphans,
        )
    }

    /// Join order items → products (category) → orders.
    /// Items whose order is unknown are dropped and counted.
    pub fn orders_detail(
        items: &[OrderItemRecord],
        products: &[ProductRecord],
        orders: &[OrderRecord],
    ) -> (Vec<OrderDetail>, usize) {
        let categories: HashMap<&str, Option<&str>> = products
            .iter()
            .map(|p| (p.product_id.as_str(), p.product_category_name.as_deref()))
            .collect();
        let orders_by_id: HashMap<&str, &OrderRecord> =
            orders.iter().map(|o| (o.order_id.as_str(), o)).collect();

        let mut orphans = 0usize;
        let mut detail = Vec::with_capacity(items.len());

        for item in items {
            let Some(order) = orders_by_id.get(item.order_id.as_str()) else {
                orphans += 1;
                continue;
            };

            let category = categories
                .get(item.product_id.as_str())
                .copied()
                .flatten()
                .map(String::from);

            detail.push(OrderDetail {
                order_id: item.order_id.clone(),
                customer_id: order.customer_id.clone(),
                purchase_year: order.purchase_year(),
                category,
                total_value: item.total_value(),
                approved_at: order.order_approved_at,
                status: order.order_status.clone(),
            });
        }

        if orphans > 0 {
            warn!(orphans, "order items reference unknown orders; dropped");
        }

        (detail, orphans)
    }

    /// Normalize geolocation names, attach county ids and collapse to one row per city.
    ///
    /// Per city the smallest state and the smallest id string win, matching a
    /// left join followed by a min aggregation.
    pub fn geo_cities(geolocation: &[GeolocationRecord], city_ids: &[CityIdRecord]) -> Vec<GeoCity> {
        // One normalized name may map to several counties (same name, different state)
        let mut ids_by_name: HashMap<String, Vec<String>> = HashMap::new();
        for row in city_ids {
            ids_by_name
                .entry(normalize_city_name(&row.geolocation_city))
                .or_default()
                .push(row.city_id.to_string());
        }

        let normalized: Vec<String> = geolocation
            .par_iter()
            .map(|g| normalize_city_name(&g.geolocation_city))
            .collect();

        // Smallest state per normalized name
        let mut by_name: BTreeMap<&str, &str> = BTreeMap::new();
        for (row, name) in geolocation.iter().zip(&normalized) {
            let state = by_name
                .entry(name.as_str())
                .or_insert(row.geolocation_state.as_str());
            if row.geolocation_state.as_str() < *state {
                *state = row.geolocation_state.as_str();
            }
        }

        by_name
            .into_iter()
            .map(|(name, state)| {
                let city_id = ids_by_name
                    .get(name)
                    .and_then(|ids| ids.iter().min())
                    .cloned()
                    .unwrap_or_else(|| UNMATCHED_CITY_ID.to_string());
                GeoCity {
                    name: name.to_string(),
                    state: state.to_string(),
                    city_id,
                }
            })
            .collect()
    }

    /// Count distinct orders per (city id, city name, year, category).
    ///
    /// Rows without a category, without a known customer, or whose customer
    /// city is missing from the geolocation table have no group and are skipped.
    pub fn customers_loc(
        customers: &[CustomerRecord],
        geo_cities: &[GeoCity],
        orders_detail: &[OrderDetail],
    ) -> Vec<CustomerLocation> {
        let geo_by_name: HashMap<&str, &GeoCity> =
            geo_cities.iter().map(|g| (g.name.as_str(), g)).collect();

        let city_by_customer: HashMap<&str, &GeoCity> = customers
            .iter()
            .filter_map(|c| {
                let name = normalize_city_name(&c.customer_city);
                geo_by_name
                    .get(name.as_str())
                    .map(|geo| (c.customer_id.as_str(), *geo))
            })
            .collect();

        let mut groups: BTreeMap<LocationKey, HashSet<&str>> = BTreeMap::new();
        for row in orders_detail {
            let Some(category) = row.category.as_ref() else {
                continue;
            };
            let Some(geo) = city_by_customer.get(row.customer_id.as_str()) else {
                continue;
            };
            groups
                .entry((
                    geo.city_id.clone(),
                    geo.name.clone(),
                    row.purchase_year,
                    category.clone(),
                ))
                .or_default()
                .insert(row.order_id.as_str());
        }

        groups
            .into_iter()
            .map(
                |((city_id, city_name, purchase_year, category), orders)| CustomerLocation {
                    city_id,
                    city_name,
                    purchase_year,
                    category,
                    order_count: orders.len() as u64,
                },
            )
            .collect()
    }

    /// Sorted distinct non-null categories
    pub fn categories(orders_detail: &[OrderDetail]) -> Vec<String> {
        orders_detail
            .iter()
            .filter_map(|d| d.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted distinct purchase years
    pub fn years(orders_detail: &[OrderDetail]) -> Vec<i32> {
        orders_detail
            .iter()
            .map(|d| d.purchase_year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
