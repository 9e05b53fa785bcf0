use chrono::{Duration, NaiveDate};
use criterion::{Criterion, criterion_group, criterion_main};
use sales_chart::api::{ColorAllocator, build_chart_request};
use sales_chart::core::{Row, StartDatePolicy, decode_history};
use std::hint::black_box;

fn history_payload(days: usize) -> String {
    let start = NaiveDate::from_ymd_opt(2021, 1, 1).expect("valid date");
    let days_list: Vec<String> = (0..days)
        .map(|i| {
            (start + Duration::days(i as i64))
                .format("%Y/%m/%d")
                .to_string()
        })
        .collect();
    let sales: Vec<Option<u64>> = (0..days as u64)
        .map(|i| if i % 7 == 0 { None } else { Some(i * 3 % 500) })
        .collect();
    let payload = serde_json::json!({ "days": days_list, "sales": sales }).to_string();
    // Spreadsheet exports wrap long cells with escaped newlines.
    payload.replace(",\"sales\"", ",&#10;\"sales\"")
}

fn bench_decode_two_years(c: &mut Criterion) {
    let raw = history_payload(730);
    c.bench_function("decode_history_730_days", |b| {
        b.iter(|| decode_history(black_box("B0BENCH"), black_box(&raw)).expect("decode"))
    });
}

fn bench_build_twenty_rows(c: &mut Criterion) {
    let launch = NaiveDate::from_ymd_opt(2021, 3, 1).expect("valid date");
    let rows: Vec<Row> = (0..20)
        .map(|i| {
            Row::new(
                format!("B0{i:04}"),
                launch,
                format!("https://img.example/{i}.jpg"),
                history_payload(365),
            )
        })
        .collect();
    let selected: Vec<&Row> = rows.iter().collect();

    c.bench_function("build_chart_request_20x365", |b| {
        let mut colors = ColorAllocator::default();
        b.iter(|| {
            build_chart_request(
                black_box(&selected),
                StartDatePolicy::EarliestRecord,
                &mut colors,
            )
            .expect("build")
        })
    });
}

criterion_group!(benches, bench_decode_two_years, bench_build_twenty_rows);
criterion_main!(benches);
