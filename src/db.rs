use crate::error::FeedbackError;
use anyhow::{Context, Result};
use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use tracing::{debug, info};

/// Number of entries returned by [`FeedbackStore::recent`].
pub const RECENT_LIMIT: u32 = 10;

/// Longest free-text rating accepted by [`FeedbackStore::append`], in characters.
pub const MAX_RATING_CHARS: usize = 20;

/// Header row of the CSV export.
pub const CSV_HEADER: [&str; 5] = [
    "original_text",
    "generated_summary",
    "user_feedback",
    "improved_summary",
    "timestamp",
];

/// Display format for timestamps in exports and listings.
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// The user's verdict on a generated summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackRating {
    Good,
    Bad,
    /// Anything else the form sent, trimmed
    Other(String),
}

impl FeedbackRating {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_lowercase().as_str() {
            "good" => FeedbackRating::Good,
            "bad" => FeedbackRating::Bad,
            _ => FeedbackRating::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FeedbackRating::Good => "good",
            FeedbackRating::Bad => "bad",
            FeedbackRating::Other(text) => text,
        }
    }
}

impl Serialize for FeedbackRating {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Feedback as submitted, before the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub original_text: String,
    pub generated_summary: String,
    pub user_feedback: FeedbackRating,
    pub improved_summary: Option<String>,
}

impl NewFeedback {
    pub fn new(
        original_text: impl Into<String>,
        generated_summary: impl Into<String>,
        user_feedback: &str,
        improved_summary: Option<String>,
    ) -> Self {
        Self {
            original_text: original_text.into(),
            generated_summary: generated_summary.into(),
            user_feedback: FeedbackRating::parse(user_feedback),
            improved_summary: improved_summary.filter(|text| !text.trim().is_empty()),
        }
    }

    fn validate(&self) -> Result<(), FeedbackError> {
        if self.original_text.trim().is_empty() {
            return Err(FeedbackError::MissingField("original_text"));
        }
        if self.generated_summary.trim().is_empty() {
            return Err(FeedbackError::MissingField("generated_summary"));
        }
        if self.user_feedback.as_str().chars().count() > MAX_RATING_CHARS {
            return Err(FeedbackError::RatingTooLong {
                max: MAX_RATING_CHARS,
            });
        }
        Ok(())
    }
}

/// A stored feedback entry.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackRecord {
    pub id: i64,
    pub original_text: String,
    pub generated_summary: String,
    pub user_feedback: FeedbackRating,
    pub improved_summary: Option<String>,
    #[serde(serialize_with = "serialize_display_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl FeedbackRecord {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let raw_timestamp: String = row.try_get("timestamp")?;
        let timestamp = DateTime::parse_from_rfc3339(&raw_timestamp)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
            .with_timezone(&Utc);
        let user_feedback: Option<String> = row.try_get("user_feedback")?;

        Ok(Self {
            id: row.try_get("id")?,
            original_text: row.try_get("original_text")?,
            generated_summary: row.try_get("generated_summary")?,
            user_feedback: FeedbackRating::parse(user_feedback.as_deref().unwrap_or_default()),
            improved_summary: row.try_get("improved_summary")?,
            timestamp,
        })
    }

    /// Timestamp in local time, minute precision.
    pub fn display_timestamp(&self) -> String {
        format_display_timestamp(&self.timestamp)
    }
}

pub fn format_display_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format(DISPLAY_TIMESTAMP_FORMAT)
        .to_string()
}

fn serialize_display_timestamp<S: serde::Serializer>(
    timestamp: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_display_timestamp(timestamp))
}

/// Append-only store of summary feedback.
#[derive(Debug, Clone)]
pub struct FeedbackStore {
    pool: SqlitePool,
}

impl FeedbackStore {
    /// Open (or create) the database and make sure the table exists.
    ///
    /// The pool holds a single connection for its whole lifetime, which keeps
    /// appends serialized and lets `sqlite::memory:` survive between queries.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database URL: {}", database_url))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to open database at {}", database_url))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS summaries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                original_text TEXT NOT NULL,
                generated_summary TEXT NOT NULL,
                user_feedback TEXT,
                improved_summary TEXT,
                timestamp TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .context("Failed to create summaries table")?;

        info!("Feedback store ready at {}", database_url);
        Ok(Self { pool })
    }

    /// Persist one feedback entry. Nothing is written when a required field
    /// is blank.
    pub async fn append(&self, feedback: NewFeedback) -> Result<FeedbackRecord, FeedbackError> {
        feedback.validate()?;

        let timestamp = Utc::now();
        let result = sqlx::query(
            "INSERT INTO summaries (original_text, generated_summary, user_feedback, improved_summary, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&feedback.original_text)
        .bind(&feedback.generated_summary)
        .bind(feedback.user_feedback.as_str())
        .bind(feedback.improved_summary.as_deref())
        .bind(timestamp.to_rfc3339_opts(SecondsFormat::Micros, true))
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(
            "Stored feedback #{} (rating '{}')",
            id,
            feedback.user_feedback.as_str()
        );

        Ok(FeedbackRecord {
            id,
            original_text: feedback.original_text,
            generated_summary: feedback.generated_summary,
            user_feedback: feedback.user_feedback,
            improved_summary: feedback.improved_summary,
            timestamp,
        })
    }

    /// Entries newest first; ties broken by id, newest first.
    pub async fn list_descending(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<FeedbackRecord>, FeedbackError> {
        // SQLite treats a negative LIMIT as "no limit"
        let limit = limit.map(i64::from).unwrap_or(-1);

        let rows = sqlx::query(
            "SELECT id, original_text, generated_summary, user_feedback, improved_summary, timestamp
             FROM summaries
             ORDER BY timestamp DESC, id DESC
             LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let records = rows
            .iter()
            .map(FeedbackRecord::from_row)
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Loaded {} feedback entries", records.len());
        Ok(records)
    }

    pub async fn recent(&self) -> Result<Vec<FeedbackRecord>, FeedbackError> {
        self.list_descending(Some(RECENT_LIMIT)).await
    }

    pub async fn count(&self) -> Result<i64, FeedbackError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM summaries")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Every entry as CSV, in [`FeedbackStore::list_descending`] order.
    pub async fn export_csv(&self) -> Result<Vec<u8>, FeedbackError> {
        let records = self.list_descending(None).await?;
        let csv = write_csv(&records).map_err(|e| FeedbackError::Export(e.to_string()))?;
        info!("Exported {} feedback entries", records.len());
        Ok(csv)
    }
}

fn write_csv(records: &[FeedbackRecord]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for record in records {
        let timestamp = record.display_timestamp();
        writer.write_record([
            record.original_text.as_str(),
            record.generated_summary.as_str(),
            record.user_feedback.as_str(),
            record.improved_summary.as_deref().unwrap_or(""),
            timestamp.as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}
