//! Book (catalog) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::AppResult,
    models::book::{AvailabilityReport, Book, BookQuery, CreateBook, UpdateBook},
};

use super::AuthenticatedUser;

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Current page number
    pub page: i64,
    /// Items per page
    pub limit: i64,
    /// Total number of pages
    pub total_pages: i64,
    /// Total number of items
    pub total: i64,
    /// List of items
    pub items: Vec<T>,
}

impl<T> PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub fn new(page: i64, limit: i64, total: i64, items: Vec<T>) -> Self {
        Self {
            page,
            limit,
            total_pages: (total + limit - 1) / limit,
            total,
            items,
        }
    }
}

/// Deletion confirmation
#[derive(Serialize, ToSchema)]
pub struct DeleteResponse {
    pub message: String,
}

/// List books with pagination and filters
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default: 10, max: 100)"),
        ("genre" = Option<String>, Query, description = "Exact genre match"),
        ("author" = Option<String>, Query, description = "Case-insensitive author substring"),
        ("title" = Option<String>, Query, description = "Case-insensitive title substring")
    ),
    responses(
        (status = 200, description = "List of books", body = PaginatedResponse<Book>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<PaginatedResponse<Book>>> {
    let (books, total) = state.services.catalog.list(&query).await?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);

    Ok(Json(PaginatedResponse::new(page, limit, total, books)))
}

/// Add a book to the catalog (admin only)
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Admin privileges required")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(book): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    user.require_admin()?;
    book.validate()?;

    let created = state.services.catalog.create(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a catalog entry (admin only)
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(update): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    user.require_admin()?;
    update.validate()?;

    let updated = state.services.catalog.update(id, update).await?;
    Ok(Json(updated))
}

/// Remove a book from the catalog (admin only)
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book removed", body = DeleteResponse),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<DeleteResponse>> {
    user.require_admin()?;

    state.services.catalog.delete(id).await?;
    Ok(Json(DeleteResponse {
        message: "Book removed".to_string(),
    }))
}

/// Copy-count totals across the catalog
#[utoipa::path(
    get,
    path = "/books/reports/availability",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Availability report", body = AvailabilityReport),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn availability_report(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
) -> AppResult<Json<AvailabilityReport>> {
    let report = state.services.catalog.availability_report().await?;
    Ok(Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::book::Book as BookModel;

    fn pages(total: i64, limit: i64) -> i64 {
        PaginatedResponse::<BookModel>::new(1, limit, total, Vec::new()).total_pages
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(pages(0, 10), 0);
        assert_eq!(pages(1, 10), 1);
        assert_eq!(pages(10, 10), 1);
        assert_eq!(pages(11, 10), 2);
    }
}
