//! Home page: counts across every entity kind

use serde::Serialize;

use super::aggregate::Aggregate;
use crate::{
    error::AppResult,
    models::{BookFilter, BookInstanceFilter, CopyStatus},
    repository::Repository,
};

/// Record counts shown on the home page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogCounts {
    pub book_count: i64,
    pub book_instance_count: i64,
    pub book_instance_available_count: i64,
    pub author_count: i64,
    pub genre_count: i64,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Round-trip to the store; fails when the database is unreachable
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.genres.count().await.map(|_| ())
    }

    /// Count every entity kind concurrently
    pub async fn counts(&self) -> AppResult<CatalogCounts> {
        let books = self.repository.books.clone();
        let instances = self.repository.book_instances.clone();
        let available = self.repository.book_instances.clone();
        let authors = self.repository.authors.clone();
        let genres = self.repository.genres.clone();

        let mut joined = Aggregate::new()
            .query("book_count", async move { books.count(BookFilter::default()).await })
            .query("book_instance_count", async move {
                instances.count(BookInstanceFilter::default()).await
            })
            .query("book_instance_available_count", async move {
                available.count(BookInstanceFilter::by_status(CopyStatus::Available)).await
            })
            .query("author_count", async move { authors.count().await })
            .query("genre_count", async move { genres.count().await })
            .run()
            .await?;

        Ok(CatalogCounts {
            book_count: joined.take("book_count")?,
            book_instance_count: joined.take("book_instance_count")?,
            book_instance_available_count: joined.take("book_instance_available_count")?,
            author_count: joined.take("author_count")?,
            genre_count: joined.take("genre_count")?,
        })
    }
}
