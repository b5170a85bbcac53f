//! Repository layer for database operations
//!
//! Each entity kind is reached through a store trait so that controllers can be
//! exercised without a database. Every call is a single independent statement
//! (or a short sequence of reads); nothing is cached between calls.

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod genres;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        Author, AuthorData, Book, BookData, BookDetails, BookFilter, BookInstance,
        BookInstanceData, BookInstanceDetails, BookInstanceFilter, BookListing, Genre, GenreData,
    },
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorStore: Send + Sync {
    async fn find_by_id(&self, id: i32) -> AppResult<Author>;
    /// All authors, ordered by family name
    async fn find_all(&self) -> AppResult<Vec<Author>>;
    async fn count(&self) -> AppResult<i64>;
    async fn save(&self, data: &AuthorData) -> AppResult<Author>;
    async fn update_by_id(&self, id: i32, data: &AuthorData) -> AppResult<Author>;
    async fn delete_by_id(&self, id: i32) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenreStore: Send + Sync {
    async fn find_by_id(&self, id: i32) -> AppResult<Genre>;
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Genre>>;
    /// All genres, ordered by name
    async fn find_all(&self) -> AppResult<Vec<Genre>>;
    async fn count(&self) -> AppResult<i64>;
    async fn save(&self, data: &GenreData) -> AppResult<Genre>;
    async fn update_by_id(&self, id: i32, data: &GenreData) -> AppResult<Genre>;
    async fn delete_by_id(&self, id: i32) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    async fn find_by_id(&self, id: i32) -> AppResult<Book>;
    /// Book with author and genres resolved
    async fn find_by_id_populated(&self, id: i32) -> AppResult<BookDetails>;
    async fn find_all(&self, filter: BookFilter) -> AppResult<Vec<Book>>;
    /// Title and resolved author of every book, ordered by title
    async fn find_all_listing(&self) -> AppResult<Vec<BookListing>>;
    async fn count(&self, filter: BookFilter) -> AppResult<i64>;
    async fn save(&self, data: &BookData) -> AppResult<Book>;
    async fn update_by_id(&self, id: i32, data: &BookData) -> AppResult<Book>;
    async fn delete_by_id(&self, id: i32) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookInstanceStore: Send + Sync {
    async fn find_by_id(&self, id: i32) -> AppResult<BookInstance>;
    /// Copy with its book resolved
    async fn find_by_id_populated(&self, id: i32) -> AppResult<BookInstanceDetails>;
    async fn find_all(&self, filter: BookInstanceFilter) -> AppResult<Vec<BookInstance>>;
    /// Every copy with its book resolved
    async fn find_all_populated(&self) -> AppResult<Vec<BookInstanceDetails>>;
    async fn count(&self, filter: BookInstanceFilter) -> AppResult<i64>;
    async fn save(&self, data: &BookInstanceData) -> AppResult<BookInstance>;
    async fn update_by_id(&self, id: i32, data: &BookInstanceData) -> AppResult<BookInstance>;
    async fn delete_by_id(&self, id: i32) -> AppResult<()>;
}

/// Main repository struct holding one store per entity kind
#[derive(Clone)]
pub struct Repository {
    pub authors: Arc<dyn AuthorStore>,
    pub genres: Arc<dyn GenreStore>,
    pub books: Arc<dyn BookStore>,
    pub book_instances: Arc<dyn BookInstanceStore>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            authors: Arc::new(authors::AuthorsRepository::new(pool.clone())),
            genres: Arc::new(genres::GenresRepository::new(pool.clone())),
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            book_instances: Arc::new(book_instances::BookInstancesRepository::new(pool)),
        }
    }
}
