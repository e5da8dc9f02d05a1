//! GraphQL schema: query and mutation roots

use std::sync::Arc;

use async_graphql::{Context, EmptySubscription, Object, Result, Schema};
use axum::{extract::State, Json};
use chrono::NaiveDate;
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::AuthenticatedUser,
    models::{
        book::{BookQuery, CreateBook},
        user::{LoginRequest, RegisterRequest, Role, User},
    },
    services::Services,
    AppState,
};

use super::types::{AvailabilityReportType, BookType, BorrowType, UserType};

pub type LibrariumSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the schema with the shared services attached
pub fn build_schema(services: Arc<Services>) -> LibrariumSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(services)
        .finish()
}

/// Axum handler executing GraphQL requests
///
/// The identity, when the request carries a valid transport token, rides
/// along in the request data; resolvers that need it look it up there.
pub async fn graphql_handler(
    State(state): State<AppState>,
    identity: Option<AuthenticatedUser>,
    Json(request): Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    let mut request = request;
    if let Some(AuthenticatedUser(user)) = identity {
        request = request.data(user);
    }

    Json(state.schema.execute(request).await)
}

fn services<'a>(ctx: &Context<'a>) -> Result<&'a Arc<Services>> {
    ctx.data::<Arc<Services>>()
}

fn identity<'a>(ctx: &Context<'a>) -> Result<&'a User> {
    ctx.data_opt::<User>()
        .ok_or_else(|| async_graphql::Error::new("Not authorized"))
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Currently authenticated user, if any
    async fn me(&self, ctx: &Context<'_>) -> Option<UserType> {
        ctx.data_opt::<User>().map(UserType::from_user)
    }

    /// Browse the catalog with pagination and filters
    async fn books(
        &self,
        ctx: &Context<'_>,
        page: Option<i64>,
        limit: Option<i64>,
        genre: Option<String>,
        author: Option<String>,
        title: Option<String>,
    ) -> Result<Vec<BookType>> {
        let query = BookQuery {
            page,
            limit,
            genre,
            author,
            title,
        };
        let (books, _total) = services(ctx)?.catalog.list(&query).await?;

        Ok(books.into_iter().map(BookType::from).collect())
    }

    /// Copy-count totals across the catalog
    async fn availability_report(&self, ctx: &Context<'_>) -> Result<AvailabilityReportType> {
        let report = services(ctx)?.catalog.availability_report().await?;
        Ok(report.into())
    }

    /// Top borrowed books
    async fn most_borrowed_books(&self, ctx: &Context<'_>) -> Result<Vec<BookType>> {
        let books = services(ctx)?.circulation.most_borrowed_books().await?;
        Ok(books.into_iter().map(BookType::from).collect())
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Register a new account
    async fn register(
        &self,
        ctx: &Context<'_>,
        name: String,
        email: String,
        password: String,
        role: Option<String>,
    ) -> Result<UserType> {
        let role = role
            .map(|r| r.parse::<Role>())
            .transpose()
            .map_err(async_graphql::Error::new)?;

        let request = RegisterRequest {
            name,
            email,
            password,
            role,
        };
        request.validate()?;

        let auth = services(ctx)?.auth.register(request).await?;
        Ok(auth.into())
    }

    /// Log in with email and password
    async fn login(&self, ctx: &Context<'_>, email: String, password: String) -> Result<UserType> {
        let request = LoginRequest { email, password };
        request.validate()?;

        let auth = services(ctx)?.auth.login(request).await?;
        Ok(auth.into())
    }

    /// Add a book to the catalog (admin only)
    async fn add_book(
        &self,
        ctx: &Context<'_>,
        title: String,
        author: String,
        isbn: Option<String>,
        publication_date: Option<NaiveDate>,
        genre: Option<String>,
        total_copies: Option<i32>,
    ) -> Result<BookType> {
        identity(ctx)?.require_admin()?;

        let book = CreateBook {
            title,
            author,
            isbn,
            publication_date,
            genre,
            total_copies,
        };
        book.validate()?;

        let created = services(ctx)?.catalog.create(book).await?;
        Ok(created.into())
    }

    /// Borrow a book (members)
    async fn borrow_book(&self, ctx: &Context<'_>, book_id: Uuid) -> Result<BorrowType> {
        let user = identity(ctx)?;
        user.require_role(&[Role::Member])?;

        let services = services(ctx)?;
        let borrow = services.circulation.borrow(user.id, book_id).await?;
        let book = services.catalog.find(borrow.book_id).await?;

        Ok(BorrowType {
            id: borrow.id,
            user: UserType::from_user(user),
            book: book.map(BookType::from),
            borrow_date: borrow.borrow_date,
            return_date: borrow.return_date,
        })
    }

    /// Return a borrowed book (members)
    async fn return_book(&self, ctx: &Context<'_>, borrow_id: Uuid) -> Result<BorrowType> {
        let user = identity(ctx)?;
        user.require_role(&[Role::Member])?;

        let services = services(ctx)?;
        let returned = services.circulation.return_book(borrow_id, user.id).await?;
        let book = services.catalog.find(returned.book_id).await?;

        Ok(BorrowType {
            id: returned.id,
            user: UserType::from_user(user),
            book: book.map(BookType::from),
            borrow_date: returned.borrow_date,
            return_date: returned.return_date,
        })
    }
}
