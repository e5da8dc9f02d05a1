//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, borrows, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Librarium API",
        version = "1.0.0",
        description = "Library Management Backend REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "REST API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        // Books
        books::list_books,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::availability_report,
        // Borrowing
        borrows::borrow_book,
        borrows::return_book,
        borrows::my_history,
        borrows::most_borrowed,
        borrows::active_members,
    ),
    components(
        schemas(
            // Auth
            crate::models::user::User,
            crate::models::user::Role,
            crate::models::user::RegisterRequest,
            crate::models::user::LoginRequest,
            crate::models::user::AuthResponse,
            // Books
            crate::models::book::Book,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::BookQuery,
            crate::models::book::AvailabilityReport,
            // Borrowing
            crate::models::borrow::Borrow,
            crate::models::borrow::BorrowDetails,
            crate::models::borrow::BookSummary,
            crate::models::borrow::BorrowRequest,
            crate::models::borrow::ReturnRequest,
            crate::models::borrow::MostBorrowedBook,
            crate::models::borrow::ActiveMember,
            books::DeleteResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Catalog management"),
        (name = "borrow", description = "Borrowing and reports")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
