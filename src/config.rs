use crate::models::Metric;
use crate::stats::{DEFAULT_TREND_WINDOW, DESKTOP_WINDOW_DAYS};
use crate::summary::SummaryOptions;
use std::{env, path::PathBuf};
use tracing::warn;

pub const DEFAULT_DATA_PATH: &str = "data/entries.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Digest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub data_path: PathBuf,
    pub display_window: usize,
    pub trend_window: usize,
    pub output: OutputFormat,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            display_window: DESKTOP_WINDOW_DAYS,
            trend_window: DEFAULT_TREND_WINDOW,
            output: OutputFormat::Json,
        }
    }
}

impl AnalysisConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let data_path = lookup("MOOD_DATA_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);

        let output = match lookup("MOOD_OUTPUT").as_deref().map(str::trim) {
            None | Some("") | Some("json") => OutputFormat::Json,
            Some("digest") => OutputFormat::Digest,
            Some(other) => {
                warn!("unknown MOOD_OUTPUT '{other}', using json");
                OutputFormat::Json
            }
        };

        Self {
            data_path,
            display_window: window_var(&lookup, "MOOD_DISPLAY_WINDOW", defaults.display_window),
            trend_window: window_var(&lookup, "MOOD_TREND_WINDOW", defaults.trend_window),
            output,
        }
    }

    pub fn summary_options(&self) -> SummaryOptions {
        SummaryOptions {
            target: Metric::Mood,
            display_window: self.display_window,
            trend_window: self.trend_window,
        }
    }
}

fn window_var(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: usize) -> usize {
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 => value,
        _ => {
            warn!("invalid {key}='{raw}', using {default}");
            default
        }
    }
}
