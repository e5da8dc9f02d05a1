//! Book (catalog) model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Book model from database
///
/// Invariant: `0 <= available_copies <= total_copies`, enforced both here and
/// by CHECK constraints on the table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub genre: Option<String>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title and author required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Title and author required"))]
    pub author: String,
    pub isbn: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub genre: Option<String>,
    /// Defaults to 1 when omitted
    #[validate(range(min = 0, message = "totalCopies must not be negative"))]
    pub total_copies: Option<i32>,
}

/// Update book request; omitted fields are left unchanged
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub genre: Option<String>,
    #[validate(range(min = 0, message = "totalCopies must not be negative"))]
    pub total_copies: Option<i32>,
}

/// Book search parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Exact genre match
    pub genre: Option<String>,
    /// Case-insensitive substring match
    pub author: Option<String>,
    /// Case-insensitive substring match
    pub title: Option<String>,
}

/// Copy-count aggregate across the whole catalog
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityReport {
    pub total_books: i64,
    pub available_books: i64,
    pub borrowed_books: i64,
}
