use chrono::{Duration, NaiveDate};
use sales_chart::ChartError;
use sales_chart::core::decode_history;
use proptest::prelude::*;

fn payload(days: &[NaiveDate], sales: &[Option<u32>]) -> String {
    let days: Vec<String> = days
        .iter()
        .map(|day| day.format("%Y/%m/%d").to_string())
        .collect();
    serde_json::json!({ "days": days, "sales": sales }).to_string()
}

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date")
}

proptest! {
    #[test]
    fn decoded_point_count_matches_day_count(
        entries in proptest::collection::vec((0i64..2_000, proptest::option::of(0u32..100_000)), 0..64)
    ) {
        let days: Vec<NaiveDate> = entries
            .iter()
            .map(|(offset, _)| base_date() + Duration::days(*offset))
            .collect();
        let sales: Vec<Option<u32>> = entries.iter().map(|(_, value)| *value).collect();

        let series = decode_history("P", &payload(&days, &sales)).expect("decode");
        prop_assert_eq!(series.points.len(), days.len());

        for pair in series.points.windows(2) {
            prop_assert!(pair[0].date <= pair[1].date);
        }

        let null_count = sales.iter().filter(|value| value.is_none()).count();
        let zero_inputs = sales.iter().filter(|value| **value == Some(0)).count();
        let zero_outputs = series.points.iter().filter(|p| p.value == 0).count();
        prop_assert_eq!(zero_outputs, null_count + zero_inputs);

        let input_total: u64 = sales.iter().map(|value| u64::from(value.unwrap_or(0))).sum();
        let output_total: u64 = series.points.iter().map(|p| p.value).sum();
        prop_assert_eq!(input_total, output_total);
    }

    #[test]
    fn length_mismatch_always_fails(
        day_count in 0usize..16,
        extra in 1usize..8
    ) {
        let days: Vec<NaiveDate> = (0..day_count)
            .map(|i| base_date() + Duration::days(i as i64))
            .collect();
        let sales: Vec<Option<u32>> = vec![Some(1); day_count + extra];

        let err = decode_history("P", &payload(&days, &sales)).expect_err("must fail");
        prop_assert!(matches!(err, ChartError::MalformedHistory(_)));
    }
}
