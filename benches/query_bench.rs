//! Criterion benchmarks for aggregation and the selection query

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use std::path::PathBuf;

use chrono::NaiveDate;
use olistdash::datasets::{load_tables, RawTables};
use olistdash::services::{Aggregator, QueryService};
use olistdash::types::{
    CityIdRecord, CustomerRecord, GeolocationRecord, OrderItemRecord, OrderRecord, ProductRecord,
};

const CATEGORIES: &[&str] = &[
    "cama_mesa_banho",
    "beleza_saude",
    "esporte_lazer",
    "moveis_decoracao",
    "informatica_acessorios",
    "utilidades_domesticas",
    "relogios_presentes",
    "telefonia",
];

const CITIES: &[&str] = &[
    "São Paulo",
    "rio de janeiro",
    "belo horizonte",
    "brasília",
    "curitiba",
    "campinas",
    "porto alegre",
    "salvador",
    "guarulhos",
    "são bernardo do campo",
    "niterói",
    "santo andré",
];

/// Deterministic tables shaped like the Olist export
fn synthetic_tables(orders: usize) -> RawTables {
    let mut raw = RawTables::default();

    for (i, city) in CITIES.iter().enumerate() {
        for _ in 0..20 {
            raw.geolocation.push(GeolocationRecord {
                geolocation_city: city.to_string(),
                geolocation_state: "SP".into(),
            });
        }
        if i % 4 != 3 {
            raw.city_ids.push(CityIdRecord {
                geolocation_city: city.to_lowercase(),
                city_id: 3_500_000 + i as u64,
            });
        }
    }

    for (i, category) in CATEGORIES.iter().enumerate() {
        raw.products.push(ProductRecord {
            product_id: format!("p{}", i),
            product_category_name: Some(category.to_string()),
        });
    }

    let base = NaiveDate::from_ymd_opt(2016, 9, 1)
        .and_then(|d| d.and_hms_opt(10, 0, 0))
        .unwrap();
    for i in 0..orders {
        let customer_id = format!("c{}", i);
        raw.customers.push(CustomerRecord {
            customer_id: customer_id.clone(),
            customer_city: CITIES[i % CITIES.len()].to_string(),
        });

        let purchased = base + chrono::Duration::hours((i * 13 % 17_000) as i64);
        raw.orders.push(OrderRecord {
            order_id: format!("o{}", i),
            customer_id,
            order_status: "delivered".into(),
            order_purchase_timestamp: purchased,
            order_approved_at: (i % 20 != 0).then_some(purchased),
        });

        for item in 0..(1 + i % 3) {
            raw.order_items.push(OrderItemRecord {
                order_id: format!("o{}", i),
                product_id: format!("p{}", (i + item) % CATEGORIES.len()),
                price: 20.0 + (i % 500) as f64,
                freight_value: 5.0 + (i % 30) as f64,
            });
        }
    }

    raw
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for orders in [1_000usize, 20_000] {
        let raw = synthetic_tables(orders);
        group.throughput(Throughput::Elements(raw.order_items.len() as u64));
        group.bench_with_input(BenchmarkId::new("build", orders), &raw, |b, raw| {
            b.iter(|| Aggregator::build(black_box(raw)));
        });
    }

    group.finish();
}

fn bench_summarize(c: &mut Criterion) {
    let (tables, _) = Aggregator::build(&synthetic_tables(20_000));
    let query = QueryService::new(tables);

    let mut group = c.benchmark_group("query");
    group.bench_function("summarize", |b| {
        b.iter(|| query.summarize(black_box(2017), black_box("cama_mesa_banho")));
    });
    group.bench_function("summarize_empty", |b| {
        b.iter(|| query.summarize(black_box(2016), black_box("not_a_category")));
    });
    group.finish();
}

/// Full load over a real export when OLISTDASH_DATA_DIR points at one
fn bench_real_data(c: &mut Criterion) {
    let Some(data_dir) = std::env::var_os("OLISTDASH_DATA_DIR").map(PathBuf::from) else {
        eprintln!("Skipping real_data: OLISTDASH_DATA_DIR not set");
        return;
    };

    let mut group = c.benchmark_group("real_data");
    group.sample_size(10);
    group.bench_function("load_and_build", |b| {
        b.iter(|| {
            if let Ok(raw) = load_tables(black_box(&data_dir)) {
                let _ = Aggregator::build(&raw);
            }
        });
    });
    group.finish();
}

criterion_group!(benches, bench_aggregate, bench_summarize, bench_real_data);
criterion_main!(benches);
