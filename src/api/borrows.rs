//! Borrow and return endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{
        borrow::{ActiveMember, Borrow, BorrowDetails, BorrowRequest, MostBorrowedBook, ReturnRequest},
        user::Role,
    },
};

use super::AuthenticatedUser;

/// Borrow a book (members)
#[utoipa::path(
    post,
    path = "/borrow/borrow",
    tag = "borrow",
    security(("bearer_auth" = [])),
    request_body = BorrowRequest,
    responses(
        (status = 201, description = "Borrow recorded", body = Borrow),
        (status = 403, description = "Member role required"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "No copies available")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(request): Json<BorrowRequest>,
) -> AppResult<(StatusCode, Json<Borrow>)> {
    user.require_role(&[Role::Member])?;

    let borrow = state
        .services
        .circulation
        .borrow(user.id, request.book_id)
        .await?;

    Ok((StatusCode::CREATED, Json(borrow)))
}

/// Return a borrowed book (members)
#[utoipa::path(
    post,
    path = "/borrow/return",
    tag = "borrow",
    security(("bearer_auth" = [])),
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Return recorded", body = Borrow),
        (status = 403, description = "Not the borrower"),
        (status = 404, description = "Borrow record not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(request): Json<ReturnRequest>,
) -> AppResult<Json<Borrow>> {
    user.require_role(&[Role::Member])?;

    let returned = state
        .services
        .circulation
        .return_book(request.borrow_id, user.id)
        .await?;

    Ok(Json(returned))
}

/// Borrow history of the authenticated member, newest first
#[utoipa::path(
    get,
    path = "/borrow/history/me",
    tag = "borrow",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Borrow history", body = Vec<BorrowDetails>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> AppResult<Json<Vec<BorrowDetails>>> {
    user.require_role(&[Role::Member])?;

    let history = state.services.circulation.history(user.id).await?;
    Ok(Json(history))
}

/// Report: most borrowed books
#[utoipa::path(
    get,
    path = "/borrow/reports/most-borrowed",
    tag = "borrow",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Most borrowed books", body = Vec<MostBorrowedBook>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn most_borrowed(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> AppResult<Json<Vec<MostBorrowedBook>>> {
    user.require_role(&[Role::Admin, Role::Member])?;

    let report = state.services.circulation.most_borrowed().await?;
    Ok(Json(report))
}

/// Report: most active borrowers (admin only)
#[utoipa::path(
    get,
    path = "/borrow/reports/active-members",
    tag = "borrow",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Most active members", body = Vec<ActiveMember>),
        (status = 403, description = "Admin privileges required")
    )
)]
pub async fn active_members(
    State(state): State<crate::AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> AppResult<Json<Vec<ActiveMember>>> {
    user.require_admin()?;

    let report = state.services.circulation.active_members().await?;
    Ok(Json(report))
}
