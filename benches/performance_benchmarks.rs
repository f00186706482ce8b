use bodytrack::dataset::Dataset;
use bodytrack::models::{self, MuscleBalance, Quantity, RegionMeasurement};
use bodytrack::{comparison, series};
use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Performance benchmarks for the metrics engine
///
/// Scan histories are small in practice; the larger sizes check that series
/// building and projection stay linear.

fn bench_series_building(c: &mut Criterion) {
    let profile = create_benchmark_profile();
    let mut group = c.benchmark_group("Series Building");

    for &size in &[10, 100, 1000] {
        let records = create_record_history(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("build_all", size), &records, |b, records| {
            b.iter(|| series::build_all(black_box(records), &profile));
        });
    }

    group.finish();
}

fn bench_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("Record Projection");

    for &size in &[10, 100, 1000] {
        let dataset = Dataset::new(create_benchmark_profile(), create_record_history(size))
            .expect("valid benchmark dataset");

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("project_all", size), &dataset, |b, dataset| {
            b.iter(|| black_box(dataset).project_all());
        });
    }

    group.finish();
}

fn bench_comparison(c: &mut Criterion) {
    c.bench_function("compare", |b| {
        b.iter(|| comparison::compare(black_box(71.04), black_box(Some(72.4)), Some("kg")));
    });
}

fn bench_data_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("Data Serialization");

    for &size in &[10, 100, 1000] {
        let records = create_record_history(size);

        group.throughput(Throughput::Elements(size as u64));
        let json_data = serde_json::to_string(&records).unwrap();
        group.bench_with_input(
            BenchmarkId::new("json_deserialize", size),
            &json_data,
            |b, json| {
                b.iter(|| {
                    let _: Result<Vec<models::Record>, _> = serde_json::from_str(json);
                });
            },
        );
    }

    group.finish();
}

fn create_benchmark_profile() -> models::Profile {
    let json = r#"{
        "name": "Benchmark",
        "birthday": "1990-01-01",
        "sex": "female",
        "height_cm": 165.0,
        "ranges": {
            "weight": [45.1, 61.0],
            "body_fat_percentage": [18.0, 28.0],
            "bmi": [18.5, 24.0],
            "extracellular_water_ratio": [0.36, 0.39]
        }
    }"#;
    serde_json::from_str(json).expect("valid benchmark profile")
}

fn region(weight: f64, percent: f64) -> RegionMeasurement {
    RegionMeasurement {
        weight: Quantity::kg(weight),
        percent_of_standard: percent,
    }
}

fn create_record_history(count: usize) -> Vec<models::Record> {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();

    (0..count)
        .map(|i| {
            let drift = (i % 17) as f64 * 0.1;
            let weight = 58.0 + drift;
            models::Record {
                date: start + Duration::days(i as i64 * 7),
                score: (60 + i % 40) as u8,
                weight: Quantity::kg(weight),
                body_fat_mass: Quantity::kg(15.0 + drift / 2.0),
                muscle_mass: Quantity::kg(40.2),
                lean_body_mass: Quantity::kg(weight - 15.0),
                total_body_water: Quantity::new(31.5, "L"),
                protein: Quantity::kg(8.4),
                inorganic_salt: Quantity::kg(2.9),
                skeletal_muscle: Quantity::kg(23.8 + drift / 4.0),
                extracellular_water_ratio: 0.38,
                muscle_balance: MuscleBalance {
                    left_upper_arm: region(2.1, 98.0),
                    right_upper_arm: region(2.2, 99.5),
                    trunk: region(18.6, 100.2),
                    left_lower_limb: region(6.9, 96.4),
                    right_lower_limb: region(7.0, 97.1),
                },
            }
        })
        .collect()
}

criterion_group!(
    benches,
    bench_series_building,
    bench_projection,
    bench_comparison,
    bench_data_serialization
);

criterion_main!(benches);
