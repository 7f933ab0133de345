//! Property-based tests for partition folding, merging and rounding.

use basicstats::codec::{JsonCodec, PipeCodec, SummaryCodec};
use basicstats::rounding::round_half_down;
use basicstats::{PartialSummary, PartitionAggregator, SummaryMerger};
use proptest::prelude::*;

fn fold(values: &[f64]) -> PartialSummary {
    values
        .iter()
        .copied()
        .fold(PartialSummary::empty(), PartialSummary::with_value)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

fn values_and_cuts() -> impl Strategy<Value = (Vec<f64>, Vec<usize>)> {
    prop::collection::vec(-1e6f64..1e6, 1..200).prop_flat_map(|values| {
        let len = values.len();
        (Just(values), prop::collection::vec(0..=len, 0..10))
    })
}

fn split(values: &[f64], mut cuts: Vec<usize>) -> Vec<PartialSummary> {
    cuts.push(0);
    cuts.push(values.len());
    cuts.sort_unstable();
    cuts.dedup();
    cuts.windows(2).map(|w| fold(&values[w[0]..w[1]])).collect()
}

proptest! {
    #[test]
    fn prop_any_partitioning_merges_to_single_chunk((values, cuts) in values_and_cuts()) {
        let whole = fold(&values);
        let merged = SummaryMerger::default().combine(split(&values, cuts));

        prop_assert_eq!(merged.count(), whole.count());
        prop_assert_eq!(merged.min(), whole.min());
        prop_assert_eq!(merged.max(), whole.max());
        prop_assert!(close(merged.sum(), whole.sum()));
        prop_assert!(close(merged.sum_of_squares(), whole.sum_of_squares()));
    }

    #[test]
    fn prop_merge_order_does_not_matter((values, cuts) in values_and_cuts()) {
        let partials = split(&values, cuts);
        let mut reversed = partials.clone();
        reversed.reverse();

        let forward = SummaryMerger::default().combine(partials);
        let backward = SummaryMerger::default().combine(reversed);

        prop_assert_eq!(forward.count(), backward.count());
        prop_assert_eq!(forward.min(), backward.min());
        prop_assert_eq!(forward.max(), backward.max());
        prop_assert!(close(forward.sum(), backward.sum()));
    }

    #[test]
    fn prop_merging_empty_is_identity(values in prop::collection::vec(-1e3f64..1e3, 0..50)) {
        let summary = fold(&values);
        prop_assert_eq!(summary.combine(PartialSummary::empty()), summary);
        prop_assert_eq!(PartialSummary::empty().combine(summary), summary);
    }

    #[test]
    fn prop_stddev_is_never_negative(values in prop::collection::vec(-1e6f64..1e6, 1..100)) {
        let stats = SummaryMerger::default().merge([fold(&values)]).unwrap();
        prop_assert!(stats.stddev >= 0.0);
        prop_assert!(stats.min <= stats.mean + 0.01 && stats.mean <= stats.max + 0.01);
    }

    #[test]
    fn prop_constant_data_has_zero_stddev(value in -1e4f64..1e4, n in 1usize..300) {
        let stats = SummaryMerger::default().merge([fold(&vec![value; n])]).unwrap();
        prop_assert_eq!(stats.stddev, 0.0);
    }

    #[test]
    fn prop_pipe_codec_is_exact(values in prop::collection::vec(any::<f64>().prop_filter("finite", |v| v.is_finite() && v.abs() < 1e150), 0..20)) {
        let summary = fold(&values);
        let codec = PipeCodec;
        let decoded = codec.decode(&codec.encode(&summary).unwrap()).unwrap();
        prop_assert_eq!(decoded, summary);
    }

    #[test]
    fn prop_json_codec_is_exact(values in prop::collection::vec(any::<f64>().prop_filter("finite", |v| v.is_finite() && v.abs() < 1e150), 0..20)) {
        let summary = fold(&values);
        let codec = JsonCodec;
        let decoded = codec.decode(&codec.encode(&summary).unwrap()).unwrap();
        prop_assert_eq!(decoded, summary);
    }

    #[test]
    fn prop_aggregate_matches_fold(values in prop::collection::vec(-1e6f64..1e6, 0..100)) {
        let records: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        let summary = PartitionAggregator::default().aggregate(1, &records).unwrap();
        prop_assert_eq!(summary, fold(&values));
    }

    #[test]
    fn prop_rounding_moves_at_most_half_a_unit(value in -1e6f64..1e6, scale in 0u32..6) {
        let rounded = round_half_down(value, scale);
        let unit = 10f64.powi(scale as i32);
        prop_assert!((rounded - value).abs() <= 1.0 / unit * 0.5 + 1e-9);
    }

    #[test]
    fn prop_rounding_is_idempotent(value in -1e6f64..1e6, scale in 0u32..6) {
        let once = round_half_down(value, scale);
        prop_assert_eq!(round_half_down(once, scale), once);
    }

    #[test]
    fn prop_rounding_is_symmetric(value in 0f64..1e6, scale in 0u32..6) {
        prop_assert_eq!(round_half_down(-value, scale), -round_half_down(value, scale));
    }
}

#[test]
fn test_rounding_laws() {
    assert_eq!(round_half_down(1.005, 2), 1.0);
    assert_eq!(round_half_down(0.125, 2), 0.12);
    assert_eq!(round_half_down(-0.125, 2), -0.12);
    assert_eq!(round_half_down(1.006, 2), 1.01);
}
