//! Borrows repository for database operations
//!
//! Holds the circulation state transition: the ledger write and the
//! copy-count mutation commit in one transaction, with a conditional
//! decrement so two requests cannot take the last copy of a book.

use chrono::Utc;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        borrow::{ActiveMember, BookSummary, Borrow, BorrowDetails, MostBorrowedBook},
    },
};

/// Number of rows in the report queries
const REPORT_LIMIT: i64 = 10;

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get borrow record by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Borrow> {
        sqlx::query_as::<_, Borrow>("SELECT * FROM borrows WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Borrow record not found".to_string()))
    }

    /// Borrow a book: write the ledger entry and take one available copy
    ///
    /// Both writes commit together. The decrement is conditional on
    /// `available_copies > 0`; when a concurrent request already took the
    /// last copy, the transaction rolls back and no ledger entry survives.
    pub async fn borrow(&self, user_id: Uuid, book_id: Uuid) -> AppResult<Borrow> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(book_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        if book.available_copies <= 0 {
            return Err(AppError::Conflict("No copies available".to_string()));
        }

        let borrow = sqlx::query_as::<_, Borrow>(
            r#"
            INSERT INTO borrows (user_id, book_id, borrow_date)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        let updated = sqlx::query(
            r#"
            UPDATE books
            SET available_copies = available_copies - 1, updated_at = $2
            WHERE id = $1 AND available_copies > 0
            "#,
        )
        .bind(book_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        // Lost the race for the last copy; dropping the transaction rolls
        // back the ledger insert
        if updated.rows_affected() == 0 {
            return Err(AppError::Conflict("No copies available".to_string()));
        }

        tx.commit().await?;

        Ok(borrow)
    }

    /// Return a borrowed book
    ///
    /// Only the borrowing user may return it, and only once. The copy-count
    /// restore is best-effort: a book deleted while on loan leaves the
    /// counter untouched and the return still succeeds.
    pub async fn return_borrow(&self, borrow_id: Uuid, user_id: Uuid) -> AppResult<Borrow> {
        let mut tx = self.pool.begin().await?;

        let borrow = sqlx::query_as::<_, Borrow>("SELECT * FROM borrows WHERE id = $1")
            .bind(borrow_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Borrow record not found".to_string()))?;

        if borrow.user_id != user_id {
            return Err(AppError::Authorization(
                "Not allowed to return this book".to_string(),
            ));
        }

        if borrow.return_date.is_some() {
            return Err(AppError::Conflict("Book already returned".to_string()));
        }

        let returned = sqlx::query_as::<_, Borrow>(
            r#"
            UPDATE borrows
            SET return_date = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(borrow_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        // Never push the counter past total_copies, even if the ledger and
        // the catalog drifted
        sqlx::query(
            r#"
            UPDATE books
            SET available_copies = available_copies + 1, updated_at = $2
            WHERE id = $1 AND available_copies < total_copies
            "#,
        )
        .bind(borrow.book_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(returned)
    }

    /// Borrow history for a user, newest first; survives deleted books
    pub async fn user_history(&self, user_id: Uuid) -> AppResult<Vec<BorrowDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT br.id, br.borrow_date, br.return_date,
                   b.id AS book_id, b.title, b.author
            FROM borrows br
            LEFT JOIN books b ON br.book_id = b.id
            WHERE br.user_id = $1
            ORDER BY br.borrow_date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let history = rows
            .into_iter()
            .map(|row| {
                let book = row.get::<Option<Uuid>, _>("book_id").map(|id| BookSummary {
                    id,
                    title: row.get::<Option<String>, _>("title").unwrap_or_default(),
                    author: row.get::<Option<String>, _>("author").unwrap_or_default(),
                });
                BorrowDetails {
                    id: row.get("id"),
                    book,
                    borrow_date: row.get("borrow_date"),
                    return_date: row.get("return_date"),
                }
            })
            .collect();

        Ok(history)
    }

    /// Top borrowed books with counts
    pub async fn most_borrowed(&self) -> AppResult<Vec<MostBorrowedBook>> {
        let rows = sqlx::query_as::<_, MostBorrowedBook>(
            r#"
            SELECT br.book_id, b.title, b.author, COUNT(*) AS borrow_count
            FROM borrows br
            JOIN books b ON br.book_id = b.id
            GROUP BY br.book_id, b.title, b.author
            ORDER BY borrow_count DESC
            LIMIT $1
            "#,
        )
        .bind(REPORT_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Top borrowed books as full catalog rows (GraphQL report shape)
    pub async fn most_borrowed_books(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT b.*
            FROM books b
            JOIN (
                SELECT book_id, COUNT(*) AS borrow_count
                FROM borrows
                GROUP BY book_id
                ORDER BY borrow_count DESC
                LIMIT $1
            ) top ON b.id = top.book_id
            ORDER BY top.borrow_count DESC
            "#,
        )
        .bind(REPORT_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Top borrowers with counts
    pub async fn active_members(&self) -> AppResult<Vec<ActiveMember>> {
        let rows = sqlx::query_as::<_, ActiveMember>(
            r#"
            SELECT br.user_id, u.name, u.email, COUNT(*) AS borrow_count
            FROM borrows br
            JOIN users u ON br.user_id = u.id
            GROUP BY br.user_id, u.name, u.email
            ORDER BY borrow_count DESC
            LIMIT $1
            "#,
        )
        .bind(REPORT_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
