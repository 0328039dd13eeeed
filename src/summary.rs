use crate::correlation::{
    MIN_MATRIX_ENTRIES, correlation_matrix, correlations_with, rank_correlations,
};
use crate::models::{
    CategoryBreakdown, CorrelationMatrix, CorrelationPair, DailyAverage, Entry, Metric,
    RankedCorrelations, RatingAverages, RatingDistribution, TrendDelta, Weather,
};
use crate::stats::{
    DEFAULT_TREND_WINDOW, DESKTOP_WINDOW_DAYS, DailyQuery, averages_by_rating, daily_averages,
    distinct_days, overall_averages, rating_distribution, trend_delta, weather_breakdown,
    weekday_breakdown,
};
use chrono::{Local, NaiveDate, Weekday};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions {
    pub target: Metric,
    pub display_window: usize,
    pub trend_window: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            target: Metric::Mood,
            display_window: DESKTOP_WINDOW_DAYS,
            trend_window: DEFAULT_TREND_WINDOW,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationSection {
    pub matrix: CorrelationMatrix,
    pub top_pairs: RankedCorrelations,
    pub with_target: Vec<CorrelationPair>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub generated_on: NaiveDate,
    pub total_entries: usize,
    pub distinct_days: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub overall_averages: BTreeMap<Metric, f64>,
    pub daily: Vec<DailyAverage>,
    pub correlations: Option<CorrelationSection>,
    pub weather: CategoryBreakdown<Weather>,
    pub day_of_week: CategoryBreakdown<Weekday>,
    pub trend: Option<TrendDelta>,
    pub rating_distribution: RatingDistribution,
    pub by_rating: Vec<RatingAverages>,
}

pub fn build_summary(entries: &[Entry], options: SummaryOptions) -> Summary {
    build_summary_at(Local::now().date_naive(), entries, options)
}

pub fn build_summary_at(today: NaiveDate, entries: &[Entry], options: SummaryOptions) -> Summary {
    let daily = daily_averages(entries, DailyQuery::chart(options.display_window));

    let correlations = correlation_matrix(entries).ok().map(|matrix| CorrelationSection {
        top_pairs: rank_correlations(&matrix),
        with_target: correlations_with(&matrix, options.target),
        matrix,
    });

    let trend = match trend_delta(entries, options.target, options.trend_window) {
        Ok(trend) => Some(trend),
        Err(err) => {
            debug!("trend omitted: {err}");
            None
        }
    };

    if correlations.is_none() && !entries.is_empty() {
        warn!(
            entries = entries.len(),
            required = MIN_MATRIX_ENTRIES,
            "too few entries to correlate"
        );
    }

    Summary {
        generated_on: today,
        total_entries: entries.len(),
        distinct_days: distinct_days(entries),
        first_date: entries.iter().map(|entry| entry.date).min(),
        last_date: entries.iter().map(|entry| entry.date).max(),
        overall_averages: overall_averages(entries),
        daily,
        correlations,
        weather: weather_breakdown(entries, options.target),
        day_of_week: weekday_breakdown(entries, options.target),
        trend,
        rating_distribution: rating_distribution(entries, options.target),
        by_rating: averages_by_rating(entries, options.target, &Metric::ALL),
    }
}

impl Summary {
    pub fn digest(&self) -> String {
        let target = self.weather.target;
        let mut lines = vec![format!("Summary generated {}", self.generated_on)];

        lines.push(match (self.first_date, self.last_date) {
            (Some(first), Some(last)) => format!(
                "Entries: {} across {} days ({first} to {last})",
                self.total_entries, self.distinct_days
            ),
            _ => "Entries: none".to_string(),
        });

        if !self.overall_averages.is_empty() {
            lines.push(format!(
                "Average ratings: {}",
                average_list(&self.overall_averages)
            ));
        }

        match &self.correlations {
            Some(section) => {
                lines.push(format!(
                    "Strongest positive correlations: {}",
                    pair_list(&section.top_pairs.positive)
                ));
                lines.push(format!(
                    "Strongest negative correlations: {}",
                    pair_list(&section.top_pairs.negative)
                ));
                lines.push(format!(
                    "Correlations with {target}: {}",
                    pair_list(&section.with_target)
                ));
            }
            None => lines.push(format!(
                "Correlations: not enough data (need {MIN_MATRIX_ENTRIES} entries, have {})",
                self.total_entries
            )),
        }

        lines.push(format!("{target} by weather: {}", category_list(&self.weather)));
        lines.push(format!(
            "{target} by day of week: {}",
            category_list(&self.day_of_week)
        ));

        lines.push(match &self.trend {
            Some(trend) => {
                let percent = trend
                    .percent_change
                    .map(|change| format!("{change:+.2}%"))
                    .unwrap_or_else(|| "n/a".to_string());
                format!(
                    "Trend (last {w} vs previous {w} entries): {:.2} vs {:.2}, {}",
                    trend.recent_mean,
                    trend.previous_mean,
                    format_args!("change {:+.2} ({percent})", trend.absolute_change),
                    w = trend.window
                )
            }
            None => "Trend: not enough data".to_string(),
        });

        let buckets: Vec<String> = self
            .rating_distribution
            .buckets
            .iter()
            .map(|bucket| format!("{}:{}", bucket.rating, bucket.count))
            .collect();
        lines.push(format!(
            "{} ratings: {}",
            self.rating_distribution.metric,
            buckets.join(" ")
        ));

        for row in &self.by_rating {
            lines.push(format!(
                "When {target} was {} ({} entries): {}",
                row.rating,
                row.entry_count,
                average_list(&row.averages)
            ));
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

fn average_list(averages: &BTreeMap<Metric, f64>) -> String {
    averages
        .iter()
        .map(|(metric, avg)| format!("{metric} {avg:.2}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn pair_list(pairs: &[CorrelationPair]) -> String {
    if pairs.is_empty() {
        return "none".to_string();
    }
    pairs
        .iter()
        .map(|pair| format!("{} & {} {:.2}", pair.first, pair.second, pair.coefficient))
        .collect::<Vec<_>>()
        .join(", ")
}

fn category_list<C: std::fmt::Display>(breakdown: &CategoryBreakdown<C>) -> String {
    breakdown
        .categories
        .iter()
        .map(|stat| match stat.mean {
            Some(mean) => format!("{} {mean:.2} ({})", stat.category, stat.count),
            None => format!("{} no data", stat.category),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rating;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
    }

    fn series(moods: &[i64]) -> Vec<Entry> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        moods
            .iter()
            .enumerate()
            .map(|(offset, &mood)| {
                let weather = if offset % 2 == 0 { Weather::Sunny } else { Weather::Rainy };
                Entry::new(start + Duration::days(offset as i64), weather)
                    .with_rating(Metric::Mood, Rating::new(mood).unwrap())
                    .with_rating(Metric::Sleep, Rating::new(11 - mood).unwrap())
            })
            .collect()
    }

    #[test]
    fn empty_input_produces_empty_summary() {
        let summary = build_summary_at(today(), &[], SummaryOptions::default());
        assert_eq!(summary.total_entries, 0);
        assert_eq!(summary.first_date, None);
        assert!(summary.daily.is_empty());
        assert!(summary.correlations.is_none());
        assert!(summary.trend.is_none());
        assert!(!summary.weather.has_real_data);

        let digest = summary.digest();
        assert!(digest.contains("Entries: none"));
        assert!(digest.contains("sunny no data"));
        assert!(digest.contains("Trend: not enough data"));
    }

    #[test]
    fn small_input_omits_correlations() {
        let summary = build_summary_at(today(), &series(&[3, 5, 7, 9]), SummaryOptions::default());
        assert_eq!(summary.distinct_days, 4);
        assert!(summary.correlations.is_none());
        assert!(
            summary
                .digest()
                .contains("Correlations: not enough data (need 5 entries, have 4)")
        );
    }

    #[test]
    fn full_summary_includes_every_section() {
        let moods = [5, 5, 5, 5, 5, 5, 5, 7, 7, 7, 7, 7, 7, 7];
        let options = SummaryOptions {
            display_window: 10,
            ..SummaryOptions::default()
        };
        let summary = build_summary_at(today(), &series(&moods), options);

        assert_eq!(summary.daily.len(), 10);
        assert_eq!(summary.last_date, NaiveDate::from_ymd_opt(2024, 1, 14));

        let section = summary.correlations.as_ref().unwrap();
        assert_eq!(section.matrix.get(Metric::Mood, Metric::Sleep), Some(-1.0));
        assert_eq!(section.top_pairs.negative[0].coefficient, -1.0);
        assert!(section.top_pairs.positive.is_empty());

        let trend = summary.trend.as_ref().unwrap();
        assert_eq!(trend.percent_change, Some(40.0));

        let ratings: Vec<u8> = summary.by_rating.iter().map(|row| row.rating).collect();
        assert_eq!(ratings, vec![5, 7]);
        assert_eq!(summary.by_rating[0].averages[&Metric::Sleep], 6.0);

        let digest = summary.digest();
        assert!(digest.contains("Strongest negative correlations: mood & sleep -1.00"));
        assert!(digest.contains("change +2.00 (+40.00%)"));
        assert!(digest.contains("snowy no data"));
        assert!(digest.contains("mood ratings: 1:0 2:0 3:0 4:0 5:7 6:0 7:7 8:0 9:0 10:0"));
        assert!(digest.contains("When mood was 5 (7 entries): sleep 6.00"));
        assert!(digest.contains("When mood was 7 (7 entries): sleep 4.00"));
        assert!(digest.ends_with("sleep 4.00\n"));
    }

    #[test]
    fn summary_serializes_nulls_not_zeros() {
        let summary = build_summary_at(today(), &series(&[4, 6]), SummaryOptions::default());
        let json = serde_json::to_value(&summary).unwrap();

        assert!(json["trend"].is_null());
        assert!(json["correlations"].is_null());
        let stormy = &json["weather"]["categories"][4];
        assert_eq!(stormy["category"], "stormy");
        assert!(stormy["mean"].is_null());
        assert_eq!(stormy["has_data"], false);
        assert_eq!(json["rating_distribution"]["metric"], "mood");
        assert_eq!(json["rating_distribution"]["buckets"][3]["count"], 1);
    }
}
