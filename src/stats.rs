use crate::errors::AnalysisError;
use crate::models::{
    CategoryBreakdown, CategoryStat, DailyAverage, Entry, Metric, RatingAverages, RatingBucket,
    RatingDistribution, TrendDelta, Weather,
};
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeMap;

pub const DESKTOP_WINDOW_DAYS: usize = 90;
pub const COMPACT_WINDOW_DAYS: usize = 30;
pub const DEFAULT_TREND_WINDOW: usize = 7;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub trait DailyObservation {
    fn day(&self) -> NaiveDate;
    fn metric_value(&self, metric: Metric) -> Option<f64>;
    fn weight(&self) -> usize;
}

impl DailyObservation for Entry {
    fn day(&self) -> NaiveDate {
        self.date
    }

    fn metric_value(&self, metric: Metric) -> Option<f64> {
        self.value(metric)
    }

    fn weight(&self) -> usize {
        1
    }
}

impl DailyObservation for DailyAverage {
    fn day(&self) -> NaiveDate {
        self.date
    }

    fn metric_value(&self, metric: Metric) -> Option<f64> {
        self.averages.get(&metric).copied()
    }

    fn weight(&self) -> usize {
        self.entry_count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DailyQuery {
    pub window: Option<usize>,
    pub order: SortOrder,
}

impl DailyQuery {
    pub fn chart(window: usize) -> Self {
        Self {
            window: Some(window),
            order: SortOrder::Ascending,
        }
    }

    pub fn table() -> Self {
        Self {
            window: None,
            order: SortOrder::Descending,
        }
    }
}

#[derive(Default)]
struct DayAccumulator {
    observations: usize,
    sums: [f64; Metric::COUNT],
    counts: [usize; Metric::COUNT],
}

impl DayAccumulator {
    fn push<T: DailyObservation>(&mut self, observation: &T) {
        self.observations += observation.weight();
        for metric in Metric::ALL {
            if let Some(value) = observation.metric_value(metric) {
                self.sums[metric.index()] += value;
                self.counts[metric.index()] += 1;
            }
        }
    }

    fn finish(self, date: NaiveDate) -> DailyAverage {
        let averages = Metric::ALL
            .into_iter()
            .filter(|metric| self.counts[metric.index()] > 0)
            .map(|metric| {
                let i = metric.index();
                (metric, self.sums[i] / self.counts[i] as f64)
            })
            .collect();

        DailyAverage {
            date,
            entry_count: self.observations,
            averages,
        }
    }
}

/// Averages each metric per calendar day over the values present; a window
/// keeps the most recent N days.
pub fn daily_averages<T: DailyObservation>(
    observations: &[T],
    query: DailyQuery,
) -> Vec<DailyAverage> {
    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();
    for observation in observations {
        days.entry(observation.day()).or_default().push(observation);
    }

    let mut series: Vec<DailyAverage> = days
        .into_iter()
        .map(|(date, accumulator)| accumulator.finish(date))
        .collect();

    if let Some(window) = query.window {
        if series.len() > window {
            series.drain(..series.len() - window);
        }
    }
    if query.order == SortOrder::Descending {
        series.reverse();
    }
    series
}

pub fn distinct_days(entries: &[Entry]) -> usize {
    let mut dates: Vec<NaiveDate> = entries.iter().map(|entry| entry.date).collect();
    dates.sort_unstable();
    dates.dedup();
    dates.len()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn metric_values<'a>(entries: impl IntoIterator<Item = &'a Entry>, metric: Metric) -> Vec<f64> {
    entries
        .into_iter()
        .filter_map(|entry| entry.value(metric))
        .collect()
}

pub fn overall_averages(entries: &[Entry]) -> BTreeMap<Metric, f64> {
    Metric::ALL
        .into_iter()
        .filter_map(|metric| mean(&metric_values(entries, metric)).map(|avg| (metric, avg)))
        .collect()
}

pub fn breakdown_by<C, F>(
    entries: &[Entry],
    target: Metric,
    categories: &[C],
    category_of: F,
) -> CategoryBreakdown<C>
where
    C: Copy + PartialEq,
    F: Fn(&Entry) -> C,
{
    let categories: Vec<CategoryStat<C>> = categories
        .iter()
        .map(|&category| {
            let values = metric_values(
                entries.iter().filter(|entry| category_of(*entry) == category),
                target,
            );
            CategoryStat {
                category,
                count: values.len(),
                mean: mean(&values),
                has_data: !values.is_empty(),
            }
        })
        .collect();

    let has_real_data = categories.iter().any(|stat| stat.has_data);
    CategoryBreakdown {
        target,
        categories,
        has_real_data,
    }
}

pub fn weather_breakdown(entries: &[Entry], target: Metric) -> CategoryBreakdown<Weather> {
    breakdown_by(entries, target, &Weather::ALL, |entry| entry.weather)
}

pub fn weekday_breakdown(entries: &[Entry], target: Metric) -> CategoryBreakdown<Weekday> {
    breakdown_by(entries, target, &WEEK, |entry| entry.date.weekday())
}

// Entries lacking the metric are skipped; same-day entries keep input order.
pub fn trend_delta(
    entries: &[Entry],
    metric: Metric,
    window: usize,
) -> Result<TrendDelta, AnalysisError> {
    let mut dated: Vec<(NaiveDate, f64)> = entries
        .iter()
        .filter_map(|entry| entry.value(metric).map(|value| (entry.date, value)))
        .collect();
    dated.sort_by_key(|(date, _)| *date);

    let values: Vec<f64> = dated.into_iter().map(|(_, value)| value).collect();
    window_delta(metric, &values, window)
}

fn window_delta(
    metric: Metric,
    values: &[f64],
    window: usize,
) -> Result<TrendDelta, AnalysisError> {
    if window == 0 {
        return Err(AnalysisError::InvalidWindow);
    }
    let Some(required) = window.checked_mul(2) else {
        return Err(AnalysisError::insufficient(usize::MAX, values.len()));
    };
    if values.len() < required {
        return Err(AnalysisError::insufficient(required, values.len()));
    }

    let tail = &values[values.len() - required..];
    let (previous, recent) = tail.split_at(window);
    let previous_mean = previous.iter().sum::<f64>() / window as f64;
    let recent_mean = recent.iter().sum::<f64>() / window as f64;
    let absolute_change = recent_mean - previous_mean;

    let percent_change = if previous_mean == 0.0 {
        None
    } else {
        Some(absolute_change * 100.0 / previous_mean).filter(|change| change.is_finite())
    };

    Ok(TrendDelta {
        metric,
        window,
        recent_mean,
        previous_mean,
        absolute_change,
        percent_change,
    })
}

pub fn rating_distribution(entries: &[Entry], metric: Metric) -> RatingDistribution {
    let mut counts = [0usize; 10];
    for rating in entries.iter().filter_map(|entry| entry.rating(metric)) {
        counts[usize::from(rating.get() - 1)] += 1;
    }

    let buckets = counts
        .iter()
        .zip(1u8..)
        .map(|(&count, rating)| RatingBucket { rating, count })
        .collect();

    RatingDistribution { metric, buckets }
}

pub fn averages_by_rating(
    entries: &[Entry],
    target: Metric,
    metrics: &[Metric],
) -> Vec<RatingAverages> {
    let mut groups: BTreeMap<u8, Vec<&Entry>> = BTreeMap::new();
    for entry in entries {
        if let Some(rating) = entry.rating(target) {
            groups.entry(rating.get()).or_default().push(entry);
        }
    }

    groups
        .into_iter()
        .map(|(rating, group)| {
            let averages = metrics
                .iter()
                .filter(|metric| **metric != target)
                .filter_map(|&metric| {
                    mean(&metric_values(group.iter().copied(), metric)).map(|avg| (metric, avg))
                })
                .collect();
            RatingAverages {
                rating,
                entry_count: group.len(),
                averages,
            }
        })
        .collect()
}
