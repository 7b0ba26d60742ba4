//! Query service: filters the precomputed tables for one (year, category) selection

use std::collections::HashSet;

use super::format::{format_amount, format_number, format_percent, format_revenue, ratio_or_placeholder};
use crate::types::{CustomerLocation, DashboardTables, Summary, SummaryCards, TopCity};

/// Years offered by the year selector
pub const AVAILABLE_YEARS: [i32; 3] = [2016, 2017, 2018];

/// Initial year selection
pub const DEFAULT_YEAR: i32 = 2017;

/// Initial category selection (falls back to the first category when absent)
pub const DEFAULT_CATEGORY: &str = "cama_mesa_banho";

/// Rows in the top cities table
pub const TOP_CITIES_LIMIT: usize = 10;

/// Read-only view over the dashboard tables
pub struct QueryService {
    tables: DashboardTables,
}

impl QueryService {
    pub fn new(tables: DashboardTables) -> Self {
        Self { tables }
    }

    /// Selectable categories (sorted, no nulls)
    pub fn categories(&self) -> &[String] {
        &self.tables.categories
    }

    /// Purchase years present in the data
    pub fn years(&self) -> &[i32] {
        &self.tables.years
    }

    /// Category to preselect
    pub fn default_category(&self) -> Option<&str> {
        self.tables
            .categories
            .iter()
            .find(|c| c.as_str() == DEFAULT_CATEGORY)
            .or_else(|| self.tables.categories.first())
            .map(String::as_str)
    }

    /// Compute the cards, ranking and map rows for a selection
    pub fn summarize(&self, year: i32, category: &str) -> Summary {
        let mut revenue = 0.0;
        let mut orders: HashSet<&str> = HashSet::new();
        let mut approved: HashSet<&str> = HashSet::new();

        for row in self
            .tables
            .orders_detail
            .iter()
            .filter(|d| d.purchase_year == year && d.category.as_deref() == Some(category))
        {
            revenue += row.total_value;
            orders.insert(row.order_id.as_str());
            if row.approved_at.is_some() {
                approved.insert(row.order_id.as_str());
            }
        }

        let total_orders = orders.len() as u64;
        let approved_orders = approved.len() as u64;

        let cards = SummaryCards {
            revenue: format_revenue(revenue),
            total_orders: format_number(total_orders),
            avg_ticket: ratio_or_placeholder(revenue, total_orders, format_amount),
            approval_rate: ratio_or_placeholder(
                approved_orders as f64,
                total_orders,
                format_percent,
            ),
        };

        let map_data: Vec<CustomerLocation> = self
            .tables
            .customers_loc
            .iter()
            .filter(|l| l.purchase_year == year && l.category == category)
            .cloned()
            .collect();

        Summary {
            year,
            category: category.to_string(),
            revenue_brl: revenue,
            total_orders,
            approved_orders,
            cards,
            top_cities: top_cities(&map_data, TOP_CITIES_LIMIT),
            map_data,
        }
    }
}

/// Largest `limit` rows by order count; ties keep their table order
pub fn top_cities(rows: &[CustomerLocation], limit: usize) -> Vec<TopCity> {
    let mut ranked: Vec<&CustomerLocation> = rows.iter().collect();
    // Stable sort keeps group-key order among equal counts
    ranked.sort_by(|a, b| b.order_count.cmp(&a.order_count));
    ranked
        .into_iter()
        .take(limit)
        .map(|l| TopCity {
            city: l.city_name.clone(),
            orders: l.order_count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderDetail;
    use chrono::NaiveDate;

    fn detail(order_id: &str, year: i32, category: &str, value: f64, approved: bool) -> OrderDetail {
        OrderDetail {
            order_id: order_id.into(),
            customer_id: format!("cust-{}", order_id),
            purchase_year: year,
            category: Some(category.into()),
            total_value: value,
            approved_at: approved.then(|| {
                NaiveDate::from_ymd_opt(year, 1, 2)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            }),
            status: "delivered".into(),
        }
    }

    fn loc(city: &str, year: i32, category: &str, count: u64) -> CustomerLocation {
        CustomerLocation {
            city_id: format!("id-{}", city),
            city_name: city.into(),
            purchase_year: year,
            category: category.into(),
            order_count: count,
        }
    }

    fn service(orders_detail: Vec<OrderDetail>, customers_loc: Vec<CustomerLocation>) -> QueryService {
        QueryService::new(DashboardTables {
            orders_detail,
            customers_loc,
            categories: vec!["X".into(), "cama_mesa_banho".into()],
            years: vec![2017],
        })
    }

    #[test]
    fn test_summarize_single_order() {
        let svc = service(
            vec![detail("o1", 2017, "X", 110.0, true)],
            vec![loc("santos", 2017, "X", 1)],
        );

        let s = svc.summarize(2017, "X");

        assert_eq!(s.cards.revenue, "0k");
        assert_eq!(s.cards.total_orders, "1");
        assert_eq!(s.cards.avg_ticket, "110.00");
        assert_eq!(s.cards.approval_rate, "100.00%");
        assert_eq!(s.total_orders, 1);
        assert_eq!(s.top_cities, vec![TopCity { city: "santos".into(), orders: 1 }]);
        assert_eq!(s.map_data.len(), 1);
    }

    #[test]
    fn test_summarize_no_match_renders_placeholders() {
        let svc = service(vec![detail("o1", 2017, "X", 110.0, true)], vec![]);

        let s = svc.summarize(2016, "X");

        assert_eq!(s.cards.revenue, "0k");
        assert_eq!(s.cards.total_orders, "0");
        assert_eq!(s.cards.avg_ticket, "-");
        assert_eq!(s.cards.approval_rate, "-");
        assert!(s.top_cities.is_empty());
        assert!(s.map_data.is_empty());
    }

    #[test]
    fn test_summarize_counts_distinct_orders() {
        // Two items of o1, one of o2; o2 not approved
        let svc = service(
            vec![
                detail("o1", 2018, "X", 600.0, true),
                detail("o1", 2018, "X", 600.0, true),
                detail("o2", 2018, "X", 300.0, false),
                detail("o3", 2018, "other", 5000.0, true),
            ],
            vec![],
        );

        let s = svc.summarize(2018, "X");

        assert_eq!(s.total_orders, 2);
        assert_eq!(s.approved_orders, 1);
        assert_eq!(s.cards.revenue, "1k");
        assert_eq!(s.cards.avg_ticket, "750.00");
        assert_eq!(s.cards.approval_rate, "50.00%");
    }

    #[test]
    fn test_summarize_non_negative() {
        let svc = service(
            vec![detail("o1", 2017, "X", 12.5, false), detail("o2", 2017, "X", 0.0, false)],
            vec![],
        );
        for year in AVAILABLE_YEARS {
            let s = svc.summarize(year, "X");
            assert!(s.revenue_brl >= 0.0);
            assert!(s.approved_orders <= s.total_orders);
        }
    }

    #[test]
    fn test_top_cities_limited_and_sorted() {
        let rows: Vec<CustomerLocation> = (1..=15)
            .map(|i| loc(&format!("city{:02}", i), 2017, "X", (i * 7 % 11) as u64))
            .collect();

        let top = top_cities(&rows, TOP_CITIES_LIMIT);

        assert_eq!(top.len(), 10);
        assert!(top.windows(2).all(|w| w[0].orders >= w[1].orders));
    }

    #[test]
    fn test_top_cities_ties_keep_table_order() {
        let rows = vec![loc("a", 2017, "X", 3), loc("b", 2017, "X", 5), loc("c", 2017, "X", 3)];

        let top = top_cities(&rows, 10);

        let names: Vec<&str> = top.iter().map(|t| t.city.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_default_category_prefers_cama_mesa_banho() {
        let svc = service(vec![], vec![]);
        assert_eq!(svc.default_category(), Some("cama_mesa_banho"));
    }

    #[test]
    fn test_default_category_falls_back_to_first() {
        let svc = QueryService::new(DashboardTables {
            categories: vec!["artes".into(), "bebes".into()],
            ..Default::default()
        });
        assert_eq!(svc.default_category(), Some("artes"));

        let empty = QueryService::new(DashboardTables::default());
        assert_eq!(empty.default_category(), None);
    }
}
