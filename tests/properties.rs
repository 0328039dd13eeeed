use chrono::{Duration, NaiveDate};
use mood_stats::correlation::{correlation_matrix, pearson};
use mood_stats::stats::{DailyQuery, daily_averages};
use mood_stats::{Entry, Metric, Rating, Weather};
use proptest::prelude::*;

fn ratings(len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1u8..=10, len)
        .prop_map(|values| values.into_iter().map(f64::from).collect())
}

fn paired_series() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (2usize..40).prop_flat_map(|len| (ratings(len), ratings(len)))
}

fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|value| *value == values[0])
}

// Every metric rated; offsets repeat so some days hold several entries.
fn entries_strategy(min: usize) -> impl Strategy<Value = Vec<Entry>> {
    prop::collection::vec(
        (0i64..20, prop::collection::vec(1i64..=10, Metric::COUNT)),
        min..60,
    )
    .prop_map(|rows| {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        rows.into_iter()
            .map(|(offset, values)| {
                Metric::ALL.into_iter().zip(values).fold(
                    Entry::new(start + Duration::days(offset), Weather::Sunny),
                    |entry, (metric, value)| entry.with_rating(metric, Rating::new(value).unwrap()),
                )
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn pearson_stays_in_range((xs, ys) in paired_series()) {
        let r = pearson(&xs, &ys).unwrap();
        prop_assert!((-1.0..=1.0).contains(&r));
    }

    #[test]
    fn pearson_is_scale_and_shift_invariant(
        (xs, ys) in paired_series(),
        a in 0.1f64..50.0,
        b in -100.0f64..100.0,
        c in 0.1f64..50.0,
        d in -100.0f64..100.0,
    ) {
        prop_assume!(!is_constant(&xs) && !is_constant(&ys));
        let base = pearson(&xs, &ys).unwrap();
        let xs2: Vec<f64> = xs.iter().map(|x| a * x + b).collect();
        let ys2: Vec<f64> = ys.iter().map(|y| c * y + d).collect();
        let transformed = pearson(&xs2, &ys2).unwrap();
        prop_assert!((base - transformed).abs() < 1e-9, "{base} vs {transformed}");
    }

    #[test]
    fn pearson_self_correlation_is_one(xs in (2usize..40).prop_flat_map(ratings)) {
        prop_assume!(!is_constant(&xs));
        prop_assert_eq!(pearson(&xs, &xs).unwrap(), 1.0);
    }

    #[test]
    fn constant_series_correlates_with_nothing(
        value in 1u8..=10,
        ys in (2usize..40).prop_flat_map(ratings),
    ) {
        let xs = vec![f64::from(value); ys.len()];
        prop_assert_eq!(pearson(&xs, &ys).unwrap(), 0.0);
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal(entries in entries_strategy(5)) {
        let matrix = correlation_matrix(&entries).unwrap();
        for i in 0..Metric::COUNT {
            prop_assert_eq!(matrix.values[i][i], 1.0);
            for j in 0..Metric::COUNT {
                prop_assert_eq!(matrix.values[i][j], matrix.values[j][i]);
            }
        }
    }

    #[test]
    fn regrouping_a_daily_series_is_idempotent(entries in entries_strategy(0)) {
        let once = daily_averages(&entries, DailyQuery::default());
        let twice = daily_averages(&once, DailyQuery::default());

        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(
            once.iter().map(|point| point.entry_count).sum::<usize>(),
            entries.len()
        );
    }

    #[test]
    fn one_entry_per_day_groups_to_itself(moods in prop::collection::vec(1i64..=10, 0..30)) {
        let start = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let entries: Vec<Entry> = moods
            .iter()
            .enumerate()
            .map(|(offset, &mood)| {
                Entry::new(start + Duration::days(offset as i64), Weather::Cloudy)
                    .with_rating(Metric::Mood, Rating::new(mood).unwrap())
            })
            .collect();

        let once = daily_averages(&entries, DailyQuery::default());
        let twice = daily_averages(&once, DailyQuery::default());
        prop_assert_eq!(&once, &twice);
        for (point, mood) in once.iter().zip(&moods) {
            prop_assert_eq!(point.averages[&Metric::Mood], *mood as f64);
        }
    }
}
