//! Genre model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::Resource;
use crate::views::Linked;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

impl Resource for Genre {
    fn url(&self) -> String {
        format!("/catalog/genre/{}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenreData {
    pub name: String,
}

/// A genre offered on the book form, with its selection state.
///
/// View-only: never written back to the store.
#[derive(Debug, Clone, Serialize)]
pub struct GenreOption {
    #[serde(flatten)]
    pub genre: Linked<Genre>,
    pub checked: bool,
}

impl GenreOption {
    /// Mark each genre whose identity appears in `selected`.
    ///
    /// Identities are compared as strings so that raw form values and stored
    /// references are matched the same way.
    pub fn mark<S: AsRef<str>>(genres: Vec<Genre>, selected: &[S]) -> Vec<GenreOption> {
        genres
            .into_iter()
            .map(|genre| {
                let id = genre.id.to_string();
                let checked = selected.iter().any(|s| s.as_ref() == id);
                GenreOption {
                    genre: genre.into(),
                    checked,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genre(id: i32, name: &str) -> Genre {
        Genre { id, name: name.into() }
    }

    #[test]
    fn test_mark_checked_by_identity() {
        let genres = vec![genre(1, "Fantasy"), genre(2, "Science Fiction"), genre(12, "Poetry")];
        let options = GenreOption::mark(genres, &["2", "12"]);
        let checked: Vec<bool> = options.iter().map(|o| o.checked).collect();
        assert_eq!(checked, vec![false, true, true]);
        assert_eq!(options[1].genre.url, "/catalog/genre/2");
    }

    #[test]
    fn test_mark_with_nothing_selected() {
        let options = GenreOption::mark(vec![genre(1, "Fantasy")], &[] as &[String]);
        assert!(!options[0].checked);
    }
}
