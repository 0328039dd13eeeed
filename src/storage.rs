use crate::errors::EntryError;
use crate::models::{Entry, RawEntry};
use serde_json::Value;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    pub index: usize,
    pub id: Option<i64>,
    pub reason: EntryError,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Intake {
    pub entries: Vec<Entry>,
    pub rejected: Vec<Rejected>,
}

/// Reads a JSON array snapshot of stored entries. A missing file is an
/// empty history; a broken one is logged and treated the same way.
pub async fn load_entries(path: &Path) -> Intake {
    let records = match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<Vec<Value>>(&bytes) {
            Ok(records) => records,
            Err(err) => {
                error!("failed to parse entries file {}: {err}", path.display());
                Vec::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!("no entries file at {}", path.display());
            Vec::new()
        }
        Err(err) => {
            error!("failed to read entries file {}: {err}", path.display());
            Vec::new()
        }
    };

    validate_entries(records)
}

pub fn validate_entries(records: Vec<Value>) -> Intake {
    let mut intake = Intake::default();
    for (index, record) in records.into_iter().enumerate() {
        let id = record.get("id").and_then(Value::as_i64);
        match parse_record(record) {
            Ok(entry) => intake.entries.push(entry),
            Err(reason) => {
                warn!(index, ?id, "skipping entry: {reason}");
                intake.rejected.push(Rejected { index, id, reason });
            }
        }
    }
    intake
}

fn parse_record(record: Value) -> Result<Entry, EntryError> {
    let raw: RawEntry =
        serde_json::from_value(record).map_err(|err| EntryError::Unreadable(err.to_string()))?;
    Entry::try_from(raw)
}
