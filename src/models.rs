use crate::errors::EntryError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};

// Canonical order. Alcohol is stored inverted: 10 means none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Mood,
    Exercise,
    Sleep,
    Diet,
    Portfolio,
    Job,
    Social,
    Alcohol,
    Sunlight,
}

impl Metric {
    pub const COUNT: usize = 9;

    pub const ALL: [Metric; Metric::COUNT] = [
        Metric::Mood,
        Metric::Exercise,
        Metric::Sleep,
        Metric::Diet,
        Metric::Portfolio,
        Metric::Job,
        Metric::Social,
        Metric::Alcohol,
        Metric::Sunlight,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Mood => "mood",
            Metric::Exercise => "exercise",
            Metric::Sleep => "sleep",
            Metric::Diet => "diet",
            Metric::Portfolio => "portfolio",
            Metric::Job => "job",
            Metric::Social => "social",
            Metric::Alcohol => "alcohol",
            Metric::Sunlight => "sunlight",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Sunny,
    Cloudy,
    Rainy,
    Snowy,
    Stormy,
}

impl Weather {
    pub const ALL: [Weather; 5] = [
        Weather::Sunny,
        Weather::Cloudy,
        Weather::Rainy,
        Weather::Snowy,
        Weather::Stormy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Weather::Sunny => "sunny",
            Weather::Cloudy => "cloudy",
            Weather::Rainy => "rainy",
            Weather::Snowy => "snowy",
            Weather::Stormy => "stormy",
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weather {
    type Err = EntryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Weather::ALL
            .into_iter()
            .find(|weather| weather.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| EntryError::UnknownWeather(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(value: i64) -> Option<Self> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Some(Self(value as u8))
        } else {
            None
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEntry {
    #[serde(default)]
    pub id: Option<i64>,
    pub date: String,
    #[serde(default)]
    pub mood: Option<i64>,
    #[serde(default)]
    pub exercise: Option<i64>,
    #[serde(default)]
    pub sleep: Option<i64>,
    #[serde(default)]
    pub diet: Option<i64>,
    #[serde(default)]
    pub portfolio: Option<i64>,
    #[serde(default)]
    pub job: Option<i64>,
    #[serde(default)]
    pub social: Option<i64>,
    #[serde(default)]
    pub alcohol: Option<i64>,
    #[serde(default)]
    pub sunlight: Option<i64>,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RawEntry {
    pub fn metric(&self, metric: Metric) -> Option<i64> {
        match metric {
            Metric::Mood => self.mood,
            Metric::Exercise => self.exercise,
            Metric::Sleep => self.sleep,
            Metric::Diet => self.diet,
            Metric::Portfolio => self.portfolio,
            Metric::Job => self.job,
            Metric::Social => self.social,
            Metric::Alcohol => self.alcohol,
            Metric::Sunlight => self.sunlight,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub weather: Weather,
    pub notes: Option<String>,
    ratings: [Option<Rating>; Metric::COUNT],
}

impl Entry {
    pub fn new(date: NaiveDate, weather: Weather) -> Self {
        Self {
            id: None,
            date,
            weather,
            notes: None,
            ratings: [None; Metric::COUNT],
        }
    }

    pub fn with_rating(mut self, metric: Metric, rating: Rating) -> Self {
        self.ratings[metric.index()] = Some(rating);
        self
    }

    pub fn rating(&self, metric: Metric) -> Option<Rating> {
        self.ratings[metric.index()]
    }

    pub fn value(&self, metric: Metric) -> Option<f64> {
        self.rating(metric).map(|rating| f64::from(rating.get()))
    }
}

impl TryFrom<RawEntry> for Entry {
    type Error = EntryError;

    fn try_from(raw: RawEntry) -> Result<Self, Self::Error> {
        let date = parse_entry_date(&raw.date)?;
        let weather: Weather = raw.weather.as_deref().unwrap_or_default().parse()?;

        let mut entry = Entry::new(date, weather);
        for metric in Metric::ALL {
            if let Some(value) = raw.metric(metric) {
                let rating =
                    Rating::new(value).ok_or(EntryError::RatingOutOfRange { metric, value })?;
                entry = entry.with_rating(metric, rating);
            }
        }
        entry.id = raw.id;
        entry.notes = raw.notes.filter(|notes| !notes.trim().is_empty());
        Ok(entry)
    }
}

/// Parses `YYYY-MM-DD`, or the date portion of an ISO date-time taken
/// literally (no timezone shift).
pub fn parse_entry_date(input: &str) -> Result<NaiveDate, EntryError> {
    let invalid = || EntryError::InvalidDate(input.to_string());
    let trimmed = input.trim();
    let day = trimmed
        .get(..10)
        .filter(|day| is_calendar_shape(day))
        .ok_or_else(invalid)?;
    let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| invalid())?;

    match trimmed.get(10..11) {
        None => Ok(date),
        Some("T" | " ") if is_time_of_day(&format!("{day}T{}", &trimmed[11..])) => Ok(date),
        Some(_) => Err(invalid()),
    }
}

fn is_calendar_shape(day: &str) -> bool {
    day.bytes().enumerate().all(|(i, b)| match i {
        4 | 7 => b == b'-',
        _ => b.is_ascii_digit(),
    })
}

fn is_time_of_day(candidate: &str) -> bool {
    DateTime::parse_from_rfc3339(candidate).is_ok()
        || ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(candidate, format).is_ok())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyAverage {
    pub date: NaiveDate,
    pub entry_count: usize,
    pub averages: BTreeMap<Metric, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub metrics: Vec<Metric>,
    pub values: Vec<Vec<f64>>,
    pub sample_size: usize,
}

impl CorrelationMatrix {
    pub fn get(&self, row: Metric, column: Metric) -> Option<f64> {
        let i = self.metrics.iter().position(|metric| *metric == row)?;
        let j = self.metrics.iter().position(|metric| *metric == column)?;
        Some(self.values[i][j])
    }

    pub fn pairs(&self) -> Vec<CorrelationPair> {
        let mut pairs = Vec::new();
        for (i, first) in self.metrics.iter().enumerate() {
            for (j, second) in self.metrics.iter().enumerate().skip(i + 1) {
                pairs.push(CorrelationPair {
                    first: *first,
                    second: *second,
                    coefficient: self.values[i][j],
                });
            }
        }
        pairs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CorrelationPair {
    pub first: Metric,
    pub second: Metric,
    pub coefficient: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct RankedCorrelations {
    pub positive: Vec<CorrelationPair>,
    pub negative: Vec<CorrelationPair>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStat<C> {
    pub category: C,
    pub count: usize,
    pub mean: Option<f64>,
    pub has_data: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown<C> {
    pub target: Metric,
    pub categories: Vec<CategoryStat<C>>,
    pub has_real_data: bool,
}

impl<C: PartialEq> CategoryBreakdown<C> {
    pub fn stat(&self, category: &C) -> Option<&CategoryStat<C>> {
        self.categories.iter().find(|stat| stat.category == *category)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendDelta {
    pub metric: Metric,
    pub window: usize,
    pub recent_mean: f64,
    pub previous_mean: f64,
    pub absolute_change: f64,
    pub percent_change: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RatingBucket {
    pub rating: u8,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RatingDistribution {
    pub metric: Metric,
    pub buckets: Vec<RatingBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingAverages {
    pub rating: u8,
    pub entry_count: usize,
    pub averages: BTreeMap<Metric, f64>,
}
