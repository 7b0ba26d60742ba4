//! Raw records as they appear in the Olist CSV files

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

use super::{OlistError, Result};

/// Timestamp layouts seen in the Olist exports
const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse an Olist timestamp, accepting a bare date as midnight.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| OlistError::Parse(format!("invalid timestamp: {:?}", raw)))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => parse_timestamp(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// Row of `olist_orders_dataset.csv`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OrderRecord {
    pub order_id: String,
    pub customer_id: String,
    pub order_status: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub order_purchase_timestamp: NaiveDateTime,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub order_approved_at: Option<NaiveDateTime>,
}

impl OrderRecord {
    pub fn purchase_year(&self) -> i32 {
        self.order_purchase_timestamp.year()
    }
}

/// Row of `olist_order_items_dataset.csv`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct OrderItemRecord {
    pub order_id: String,
    pub product_id: String,
    pub price: f64,
    pub freight_value: f64,
}

impl OrderItemRecord {
    /// Item price plus freight
    pub fn total_value(&self) -> f64 {
        self.price + self.freight_value
    }
}

/// Row of `olist_products_dataset.csv`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProductRecord {
    pub product_id: String,
    #[serde(default)]
    pub product_category_name: Option<String>,
}

/// Row of `olist_customers_dataset.csv`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CustomerRecord {
    pub customer_id: String,
    pub customer_city: String,
}

/// Row of `olist_geolocation_dataset.csv`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GeolocationRecord {
    pub geolocation_city: String,
    pub geolocation_state: String,
}

/// Row of `id_counties_BR.csv` (city name → IBGE municipality code)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CityIdRecord {
    pub geolocation_city: String,
    pub city_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_space_separated() {
        let ts = parse_timestamp("2017-10-02 10:56:33").unwrap();
        assert_eq!(ts.year(), 2017);
        assert_eq!(ts.to_string(), "2017-10-02 10:56:33");
    }

    #[test]
    fn test_parse_timestamp_iso() {
        let ts = parse_timestamp("2018-01-15T08:00:00").unwrap();
        assert_eq!(ts.year(), 2018);
    }

    #[test]
    fn test_parse_timestamp_date_only() {
        let ts = parse_timestamp("2016-09-04").unwrap();
        assert_eq!(ts.to_string(), "2016-09-04 00:00:00");
    }

    #[test]
    fn test_parse_timestamp_invalid() {
        let err = parse_timestamp("yesterday").unwrap_err();
        assert!(err.to_string().contains("invalid timestamp"));
    }

    #[test]
    fn test_order_record_from_csv_with_null_approval() {
        let data = "order_id,customer_id,order_status,order_purchase_timestamp,order_approved_at,order_delivered_carrier_date\n\
                    o1,c1,canceled,2016-10-04 12:00:00,,\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<OrderRecord> = reader.deserialize().collect::<std::result::Result<_, _>>().unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].purchase_year(), 2016);
        assert!(rows[0].order_approved_at.is_none());
        assert_eq!(rows[0].order_status, "canceled");
    }

    #[test]
    fn test_order_item_total_value() {
        let item = OrderItemRecord {
            order_id: "o1".into(),
            product_id: "p1".into(),
            price: 100.0,
            freight_value: 10.5,
        };
        assert!((item.total_value() - 110.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_product_missing_category_is_none() {
        let data = "product_id,product_category_name,product_weight_g\np1,,300\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<ProductRecord> = reader.deserialize().collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(rows[0].product_category_name, None);
    }
}
