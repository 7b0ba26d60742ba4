//! CSV dataset readers for the Olist export

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::types::{
    CityIdRecord, CustomerRecord, GeolocationRecord, OlistError, OrderItemRecord, OrderRecord,
    ProductRecord, Result,
};

/// A CSV file in the data directory whose rows deserialize into `Self`
pub trait Dataset: DeserializeOwned + Send {
    /// File name inside the data directory
    const FILE_NAME: &'static str;

    /// Full path of this dataset under `data_dir`
    fn path_in(data_dir: &Path) -> PathBuf {
        data_dir.join(Self::FILE_NAME)
    }
}

impl Dataset for OrderRecord {
    const FILE_NAME: &'static str = "olist_orders_dataset.csv";
}

impl Dataset for OrderItemRecord {
    const FILE_NAME: &'static str = "olist_order_items_dataset.csv";
}

impl Dataset for ProductRecord {
    const FILE_NAME: &'static str = "olist_products_dataset.csv";
}

impl Dataset for CustomerRecord {
    const FILE_NAME: &'static str = "olist_customers_dataset.csv";
}

impl Dataset for GeolocationRecord {
    const FILE_NAME: &'static str = "olist_geolocation_dataset.csv";
}

impl Dataset for CityIdRecord {
    const FILE_NAME: &'static str = "id_counties_BR.csv";
}

/// Read every row of a dataset file. Any malformed row fails the whole file.
pub fn read_dataset<T: Dataset>(path: &Path) -> Result<Vec<T>> {
    let csv_err = |source: csv::Error| OlistError::Csv {
        file: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|e| csv_err(csv::Error::from(e)))?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(BufReader::new(file));

    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(csv_err)?;

    debug!(file = T::FILE_NAME, rows = rows.len(), "dataset loaded");
    Ok(rows)
}

/// The six source tables, as read from disk
#[derive(Debug, Default)]
pub struct RawTables {
    pub orders: Vec<OrderRecord>,
    pub order_items: Vec<OrderItemRecord>,
    pub products: Vec<ProductRecord>,
    pub customers: Vec<CustomerRecord>,
    pub geolocation: Vec<GeolocationRecord>,
    pub city_ids: Vec<CityIdRecord>,
}

/// Read all datasets from `data_dir` in parallel
pub fn load_tables(data_dir: &Path) -> Result<RawTables> {
    let ((orders, order_items), (products, customers)) = rayon::join(
        || {
            rayon::join(
                || read_dataset::<OrderRecord>(&OrderRecord::path_in(data_dir)),
                || read_dataset::<OrderItemRecord>(&OrderItemRecord::path_in(data_dir)),
            )
        },
        || {
            rayon::join(
                || read_dataset::<ProductRecord>(&ProductRecord::path_in(data_dir)),
                || read_dataset::<CustomerRecord>(&CustomerRecord::path_in(data_dir)),
            )
        },
    );
    let (geolocation, city_ids) = rayon::join(
        || read_dataset::<GeolocationRecord>(&GeolocationRecord::path_in(data_dir)),
        || read_dataset::<CityIdRecord>(&CityIdRecord::path_in(data_dir)),
    );

    Ok(RawTables {
        orders: orders?,
        order_items: order_items?,
        products: products?,
        customers: customers?,
        geolocation: geolocation?,
        city_ids: city_ids?,
    })
}
