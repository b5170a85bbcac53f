//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::{Author, Genre, Resource};

/// Full book model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    /// Reference to the book's author
    pub author_id: i32,
    pub summary: String,
    pub isbn: String,
    /// References to genres; the store does not deduplicate them
    pub genre_ids: Vec<i32>,
}

/// Book fields written on create / update (full replace)
#[derive(Debug, Clone, PartialEq)]
pub struct BookData {
    pub title: String,
    pub author_id: i32,
    pub summary: String,
    pub isbn: String,
    pub genre_ids: Vec<i32>,
}

impl From<Book> for BookData {
    fn from(book: Book) -> Self {
        Self {
            title: book.title,
            author_id: book.author_id,
            summary: book.summary,
            isbn: book.isbn,
            genre_ids: book.genre_ids,
        }
    }
}

/// Listing projection: title and resolved author only
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookListing {
    pub id: i32,
    pub title: String,
    /// `None` when the stored reference no longer resolves
    pub author: Option<Author>,
}

/// Book with author and genres resolved, for detail and edit pages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookDetails {
    pub id: i32,
    pub title: String,
    /// Stored author reference, kept even when it no longer resolves
    pub author_id: i32,
    pub author: Option<Author>,
    pub summary: String,
    pub isbn: String,
    pub genres: Vec<Genre>,
}

/// Filter for book queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub author_id: Option<i32>,
    pub genre_id: Option<i32>,
}

impl BookFilter {
    pub fn by_author(author_id: i32) -> Self {
        Self { author_id: Some(author_id), ..Default::default() }
    }

    pub fn by_genre(genre_id: i32) -> Self {
        Self { genre_id: Some(genre_id), ..Default::default() }
    }
}

/// Book as submitted through the form, kept verbatim for re-display
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub title: String,
    pub author: String,
    pub summary: String,
    pub isbn: String,
    pub genre: Vec<String>,
}

impl From<&BookDetails> for BookForm {
    fn from(book: &BookDetails) -> Self {
        Self {
            id: Some(book.id),
            title: book.title.clone(),
            author: book.author_id.to_string(),
            summary: book.summary.clone(),
            isbn: book.isbn.clone(),
            genre: book.genres.iter().map(|g| g.id.to_string()).collect(),
        }
    }
}

fn book_url(id: i32) -> String {
    format!("/catalog/book/{}", id)
}

impl Resource for Book {
    fn url(&self) -> String {
        book_url(self.id)
    }
}

impl Resource for BookListing {
    fn url(&self) -> String {
        book_url(self.id)
    }
}

impl Resource for BookDetails {
    fn url(&self) -> String {
        book_url(self.id)
    }
}
