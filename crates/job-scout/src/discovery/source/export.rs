use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;

use super::StaticSource;
use crate::discovery::domain::CandidateItem;

#[derive(Debug, thiserror::Error)]
pub enum CandidateImportError {
    #[error("failed to read candidate export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid candidate CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: missing required field '{field}'")]
    MissingField { row: usize, field: &'static str },
    #[error("row {row}: unrecognized timestamp '{value}'")]
    InvalidTimestamp { row: usize, value: String },
}

/// Loads a source's candidates from a CSV export with the columns
/// `id,title,body,created_at,upvotes,comments,url`.
pub struct CsvCandidateImporter;

impl CsvCandidateImporter {
    pub fn from_path<P: AsRef<Path>>(
        source_name: &str,
        path: P,
    ) -> Result<StaticSource, CandidateImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(source_name, file)
    }

    pub fn from_reader<R: Read>(
        source_name: &str,
        reader: R,
    ) -> Result<StaticSource, CandidateImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut items = Vec::new();

        for (index, record) in csv_reader.deserialize::<CandidateRow>().enumerate() {
            let row_number = index + 1;
            let row = record?;
            items.push(row.into_candidate(row_number, source_name)?);
        }

        Ok(StaticSource::new(source_name, items))
    }
}

#[derive(Debug, Deserialize)]
struct CandidateRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    body: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    created_at: Option<String>,
    #[serde(default)]
    upvotes: Option<u32>,
    #[serde(default)]
    comments: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    url: Option<String>,
}

impl CandidateRow {
    fn into_candidate(
        self,
        row: usize,
        source_name: &str,
    ) -> Result<CandidateItem, CandidateImportError> {
        let id = self
            .id
            .ok_or(CandidateImportError::MissingField { row, field: "id" })?;
        let raw_created_at = self.created_at.ok_or(CandidateImportError::MissingField {
            row,
            field: "created_at",
        })?;
        let created_at = parse_datetime(&raw_created_at).ok_or_else(|| {
            CandidateImportError::InvalidTimestamp {
                row,
                value: raw_created_at.clone(),
            }
        })?;

        Ok(CandidateItem {
            id,
            title: self.title,
            body: self.body.unwrap_or_default(),
            source_name: source_name.to_string(),
            created_at,
            upvote_count: self.upvotes,
            comment_count: self.comments,
            source_url: self.url.unwrap_or_default(),
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC), `YYYY-MM-DD`, or unix seconds.
pub(crate) fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive));
    }

    if let Ok(seconds) = trimmed.parse::<i64>() {
        return Utc.timestamp_opt(seconds, 0).single();
    }

    None
}
