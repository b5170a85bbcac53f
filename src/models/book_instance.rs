//! Book instance (physical copy) model and related types

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};
use utoipa::ToSchema;

use super::{Book, Resource};

/// Copy status (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum CopyStatus {
    Available,
    Maintenance,
    Loaned,
    Reserved,
}

impl CopyStatus {
    /// Every status, in the order forms offer them
    pub const NAMES: &'static [&'static str] = &["Available", "Maintenance", "Loaned", "Reserved"];

    pub fn as_str(&self) -> &'static str {
        match self {
            CopyStatus::Available => "Available",
            CopyStatus::Maintenance => "Maintenance",
            CopyStatus::Loaned => "Loaned",
            CopyStatus::Reserved => "Reserved",
        }
    }
}

impl Default for CopyStatus {
    fn default() -> Self {
        CopyStatus::Maintenance
    }
}

impl FromStr for CopyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(CopyStatus::Available),
            "Maintenance" => Ok(CopyStatus::Maintenance),
            "Loaned" => Ok(CopyStatus::Loaned),
            "Reserved" => Ok(CopyStatus::Reserved),
            other => Err(format!("unknown copy status: {}", other)),
        }
    }
}

impl fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn decode_status(row: &PgRow) -> Result<CopyStatus, sqlx::Error> {
    let raw: String = row.try_get("status")?;
    raw.parse().map_err(|e: String| sqlx::Error::ColumnDecode {
        index: "status".to_string(),
        source: e.into(),
    })
}

/// Full book instance model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookInstance {
    pub id: i32,
    /// Reference to the copied book
    pub book_id: i32,
    pub imprint: String,
    pub status: CopyStatus,
    pub due_back: Option<NaiveDate>,
}

impl<'r> FromRow<'r, PgRow> for BookInstance {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            book_id: row.try_get("book_id")?,
            imprint: row.try_get("imprint")?,
            status: decode_status(row)?,
            due_back: row.try_get("due_back")?,
        })
    }
}

impl Resource for BookInstance {
    fn url(&self) -> String {
        format!("/catalog/bookinstance/{}", self.id)
    }
}

/// Book instance with its book resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookInstanceDetails {
    pub id: i32,
    /// `None` when the stored reference no longer resolves
    pub book: Option<Book>,
    pub imprint: String,
    pub status: CopyStatus,
    pub due_back: Option<NaiveDate>,
}

impl Resource for BookInstanceDetails {
    fn url(&self) -> String {
        format!("/catalog/bookinstance/{}", self.id)
    }
}

/// Book instance fields written on create / update (full replace)
#[derive(Debug, Clone, PartialEq)]
pub struct BookInstanceData {
    pub book_id: i32,
    pub imprint: String,
    pub status: CopyStatus,
    pub due_back: Option<NaiveDate>,
}

/// Filter for book instance queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookInstanceFilter {
    pub book_id: Option<i32>,
    pub status: Option<CopyStatus>,
}

impl BookInstanceFilter {
    pub fn by_book(book_id: i32) -> Self {
        Self { book_id: Some(book_id), ..Default::default() }
    }

    pub fn by_status(status: CopyStatus) -> Self {
        Self { status: Some(status), ..Default::default() }
    }
}

/// Book instance as submitted through the form, kept verbatim for re-display
#[derive(Debug, Clone, Default, Serialize)]
pub struct BookInstanceForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub book: String,
    pub imprint: String,
    pub status: String,
    pub due_back: String,
}

impl From<&BookInstance> for BookInstanceForm {
    fn from(instance: &BookInstance) -> Self {
        Self {
            id: Some(instance.id),
            book: instance.book_id.to_string(),
            imprint: instance.imprint.clone(),
            status: instance.status.to_string(),
            due_back: instance.due_back.map(|d| d.to_string()).unwrap_or_default(),
        }
    }
}
