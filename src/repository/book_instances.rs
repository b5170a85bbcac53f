//! Book instances (copies) repository

use async_trait::async_trait;
use sqlx::{postgres::PgRow, FromRow, Pool, Postgres, Row};

use super::BookInstanceStore;
use crate::{
    error::{AppError, AppResult},
    models::{Book, BookInstance, BookInstanceData, BookInstanceDetails, BookInstanceFilter},
};

const POPULATED_SELECT: &str = r#"
    SELECT bi.id, bi.book_id, bi.imprint, bi.status, bi.due_back,
           b.id AS b_id, b.title AS b_title, b.author_id AS b_author_id,
           b.summary AS b_summary, b.isbn AS b_isbn, b.genre_ids AS b_genre_ids
    FROM book_instances bi
    LEFT JOIN books b ON b.id = bi.book_id
"#;

fn populated(row: &PgRow) -> Result<BookInstanceDetails, sqlx::Error> {
    let instance = BookInstance::from_row(row)?;
    let book_id: Option<i32> = row.try_get("b_id")?;
    let book = match book_id {
        Some(id) => Some(Book {
            id,
            title: row.try_get("b_title")?,
            author_id: row.try_get("b_author_id")?,
            summary: row.try_get("b_summary")?,
            isbn: row.try_get("b_isbn")?,
            genre_ids: row.try_get("b_genre_ids")?,
        }),
        None => None,
    };
    Ok(BookInstanceDetails {
        id: instance.id,
        book,
        imprint: instance.imprint,
        status: instance.status,
        due_back: instance.due_back,
    })
}

#[derive(Clone)]
pub struct BookInstancesRepository {
    pool: Pool<Postgres>,
}

impl BookInstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookInstanceStore for BookInstancesRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>("SELECT * FROM book_instances WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book copy {} not found", id)))
    }

    async fn find_by_id_populated(&self, id: i32) -> AppResult<BookInstanceDetails> {
        let query = format!("{} WHERE bi.id = $1", POPULATED_SELECT);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book copy {} not found", id)))?;
        Ok(populated(&row)?)
    }

    async fn find_all(&self, filter: BookInstanceFilter) -> AppResult<Vec<BookInstance>> {
        let rows = sqlx::query_as::<_, BookInstance>(
            r#"
            SELECT * FROM book_instances
            WHERE ($1::int IS NULL OR book_id = $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY id
            "#,
        )
        .bind(filter.book_id)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_all_populated(&self) -> AppResult<Vec<BookInstanceDetails>> {
        let query = format!("{} ORDER BY b.title, bi.id", POPULATED_SELECT);
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        let instances = rows
            .iter()
            .map(populated)
            .collect::<Result<Vec<_>, sqlx::Error>>()?;
        Ok(instances)
    }

    async fn count(&self, filter: BookInstanceFilter) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM book_instances
            WHERE ($1::int IS NULL OR book_id = $1)
              AND ($2::text IS NULL OR status = $2)
            "#,
        )
        .bind(filter.book_id)
        .bind(filter.status.map(|s| s.as_str()))
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn save(&self, data: &BookInstanceData) -> AppResult<BookInstance> {
        let row = sqlx::query_as::<_, BookInstance>(
            r#"
            INSERT INTO book_instances (book_id, imprint, status, due_back)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(data.book_id)
        .bind(&data.imprint)
        .bind(data.status.as_str())
        .bind(data.due_back)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_by_id(&self, id: i32, data: &BookInstanceData) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>(
            r#"
            UPDATE book_instances
            SET book_id = $2, imprint = $3, status = $4, due_back = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.book_id)
        .bind(&data.imprint)
        .bind(data.status.as_str())
        .bind(data.due_back)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book copy {} not found", id)))
    }

    async fn delete_by_id(&self, id: i32) -> AppResult<()> {
        sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
