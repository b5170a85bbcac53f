//! Books repository

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};

use super::BookStore;
use crate::{
    error::{AppError, AppResult},
    models::{Author, Book, BookData, BookDetails, BookFilter, BookListing, Genre},
};

/// Read an author joined under the `author_` column prefix, if any matched
fn joined_author(row: &PgRow) -> Result<Option<Author>, sqlx::Error> {
    let id: Option<i32> = row.try_get("author_id")?;
    let Some(id) = id else {
        return Ok(None);
    };
    Ok(Some(Author {
        id,
        first_name: row.try_get("author_first_name")?,
        family_name: row.try_get("author_family_name")?,
        date_of_birth: row.try_get("author_date_of_birth")?,
        date_of_death: row.try_get("author_date_of_death")?,
    }))
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    async fn find_by_id_populated(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.find_by_id(id).await?;

        let author = sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1")
            .bind(book.author_id)
            .fetch_optional(&self.pool)
            .await?;

        let genres = sqlx::query_as::<_, Genre>(
            "SELECT id, name FROM genres WHERE id = ANY($1) ORDER BY name"
        )
        .bind(&book.genre_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(BookDetails {
            id: book.id,
            title: book.title,
            author_id: book.author_id,
            author,
            summary: book.summary,
            isbn: book.isbn,
            genres,
        })
    }

    async fn find_all(&self, filter: BookFilter) -> AppResult<Vec<Book>> {
        let rows = sqlx::query_as::<_, Book>(
            r#"
            SELECT * FROM books
            WHERE ($1::int IS NULL OR author_id = $1)
              AND ($2::int IS NULL OR $2 = ANY(genre_ids))
            ORDER BY title
            "#,
        )
        .bind(filter.author_id)
        .bind(filter.genre_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_all_listing(&self) -> AppResult<Vec<BookListing>> {
        let rows = sqlx::query(
            r#"
            SELECT b.id, b.title,
                   a.id AS author_id,
                   a.first_name AS author_first_name,
                   a.family_name AS author_family_name,
                   a.date_of_birth AS author_date_of_birth,
                   a.date_of_death AS author_date_of_death
            FROM books b
            LEFT JOIN authors a ON a.id = b.author_id
            ORDER BY b.title
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let listing = rows
            .iter()
            .map(|row| {
                Ok(BookListing {
                    id: row.try_get("id")?,
                    title: row.try_get("title")?,
                    author: joined_author(row)?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(listing)
    }

    async fn count(&self, filter: BookFilter) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM books
            WHERE ($1::int IS NULL OR author_id = $1)
              AND ($2::int IS NULL OR $2 = ANY(genre_ids))
            "#,
        )
        .bind(filter.author_id)
        .bind(filter.genre_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn save(&self, data: &BookData) -> AppResult<Book> {
        let row = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author_id, summary, isbn, genre_ids)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(data.author_id)
        .bind(&data.summary)
        .bind(&data.isbn)
        .bind(&data.genre_ids)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_by_id(&self, id: i32, data: &BookData) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $2, author_id = $3, summary = $4, isbn = $5, genre_ids = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.title)
        .bind(data.author_id)
        .bind(&data.summary)
        .bind(&data.isbn)
        .bind(&data.genre_ids)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    async fn delete_by_id(&self, id: i32) -> AppResult<()> {
        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
