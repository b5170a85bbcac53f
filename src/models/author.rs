//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::Resource;

/// Full author model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// Display name, family name first
    pub fn name(&self) -> String {
        format!("{}, {}", self.family_name, self.first_name)
    }

    /// "birth - death", leaving unknown ends blank
    pub fn lifespan(&self) -> String {
        let fmt = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
        format!("{} - {}", fmt(self.date_of_birth), fmt(self.date_of_death))
    }
}

impl Resource for Author {
    fn url(&self) -> String {
        format!("/catalog/author/{}", self.id)
    }
}

/// Author fields written on create / update
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorData {
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

/// Author as submitted through the form, kept verbatim for re-display
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuthorForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: String,
    pub date_of_death: String,
}

impl From<&Author> for AuthorForm {
    fn from(author: &Author) -> Self {
        let fmt = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
        Self {
            id: Some(author.id),
            first_name: author.first_name.clone(),
            family_name: author.family_name.clone(),
            date_of_birth: fmt(author.date_of_birth),
            date_of_death: fmt(author.date_of_death),
        }
    }
}
