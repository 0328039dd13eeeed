pub mod config;
pub mod correlation;
pub mod errors;
pub mod models;
pub mod stats;
pub mod storage;
pub mod summary;

pub use config::{AnalysisConfig, OutputFormat};
pub use errors::{AnalysisError, EntryError};
pub use models::{Entry, Metric, Rating, RawEntry, Weather};
pub use storage::{Intake, load_entries, validate_entries};
pub use summary::{Summary, SummaryOptions, build_summary, build_summary_at};
