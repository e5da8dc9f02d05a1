//! Borrow (ledger) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Borrow record from database
///
/// A record transitions borrowed -> returned exactly once; `return_date`
/// stays null while the loan is open and the record is immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Borrow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub borrow_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}

/// Short book representation joined into history entries
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    pub id: Uuid,
    pub title: String,
    pub author: String,
}

/// Borrow record with the referenced book joined for display
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowDetails {
    pub id: Uuid,
    /// None when the book has since been removed from the catalog
    pub book: Option<BookSummary>,
    pub borrow_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}

/// Borrow request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRequest {
    pub book_id: Uuid,
}

/// Return request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    pub borrow_id: Uuid,
}

/// Report row: most borrowed books
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MostBorrowedBook {
    pub book_id: Uuid,
    pub title: String,
    pub author: String,
    pub borrow_count: i64,
}

/// Report row: most active borrowers
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveMember {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub borrow_count: i64,
}
