//! Books repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book::{AvailabilityReport, Book, BookQuery, CreateBook, UpdateBook},
};

/// Hard cap on page size
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Find book by ID, None when it no longer exists
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    /// Create a new book; available copies start equal to total copies
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let copies = book.total_copies.unwrap_or(1);

        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, isbn, publication_date, genre, total_copies, available_copies)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.publication_date)
        .bind(&book.genre)
        .bind(copies)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update a book; a change to total_copies moves available_copies by the
    /// same delta, floored at zero and capped at the new total
    pub async fn update(&self, id: Uuid, update: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        let total_copies = update.total_copies.unwrap_or(book.total_copies);
        let delta = total_copies - book.total_copies;
        let available_copies = (book.available_copies + delta).max(0).min(total_copies);

        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $2, author = $3, isbn = $4, publication_date = $5, genre = $6,
                total_copies = $7, available_copies = $8, updated_at = $9
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.title.as_ref().unwrap_or(&book.title))
        .bind(update.author.as_ref().unwrap_or(&book.author))
        .bind(update.isbn.as_ref().or(book.isbn.as_ref()))
        .bind(update.publication_date.or(book.publication_date))
        .bind(update.genre.as_ref().or(book.genre.as_ref()))
        .bind(total_copies)
        .bind(available_copies)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Delete a book
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        Ok(())
    }

    /// Search books with pagination and filters, newest first
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(10).clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1) * limit;

        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(ref genre) = query.genre {
            params.push(genre.clone());
            conditions.push(format!("genre = ${}", params.len()));
        }
        if let Some(ref author) = query.author {
            params.push(format!("%{}%", author));
            conditions.push(format!("author ILIKE ${}", params.len()));
        }
        if let Some(ref title) = query.title {
            params.push(format!("%{}%", title));
            conditions.push(format!("title ILIKE ${}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let count_sql = format!("SELECT COUNT(*) FROM books {}", where_clause);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for param in &params {
            count_query = count_query.bind(param.as_str());
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let list_sql = format!(
            "SELECT * FROM books {} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            where_clause,
            params.len() + 1,
            params.len() + 2,
        );
        let mut list_query = sqlx::query_as::<_, Book>(&list_sql);
        for param in &params {
            list_query = list_query.bind(param.as_str());
        }
        let books = list_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((books, total))
    }

    /// Copy-count totals across the catalog
    pub async fn availability_report(&self) -> AppResult<AvailabilityReport> {
        let report = sqlx::query_as::<_, AvailabilityReport>(
            r#"
            SELECT COALESCE(SUM(total_copies), 0) AS total_books,
                   COALESCE(SUM(available_copies), 0) AS available_books,
                   COALESCE(SUM(total_copies - available_copies), 0) AS borrowed_books
            FROM books
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(report)
    }
}
