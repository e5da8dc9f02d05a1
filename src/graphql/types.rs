//! GraphQL object types

use async_graphql::SimpleObject;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{
    book::{AvailabilityReport, Book},
    user::{AuthResponse, User},
};

/// User as exposed through GraphQL, optionally carrying a fresh transport
/// token after register/login
#[derive(SimpleObject)]
pub struct UserType {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub token: Option<String>,
}

impl UserType {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.to_string(),
            token: None,
        }
    }
}

impl From<AuthResponse> for UserType {
    fn from(auth: AuthResponse) -> Self {
        Self {
            id: auth.id,
            name: auth.name,
            email: auth.email,
            role: auth.role.to_string(),
            token: Some(auth.token),
        }
    }
}

#[derive(SimpleObject)]
pub struct BookType {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub genre: Option<String>,
    pub total_copies: i32,
    pub available_copies: i32,
}

impl From<Book> for BookType {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            publication_date: book.publication_date,
            genre: book.genre,
            total_copies: book.total_copies,
            available_copies: book.available_copies,
        }
    }
}

#[derive(SimpleObject)]
pub struct BorrowType {
    pub id: Uuid,
    pub user: UserType,
    /// None when the book has since been removed from the catalog
    pub book: Option<BookType>,
    pub borrow_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}

#[derive(SimpleObject)]
pub struct AvailabilityReportType {
    pub total_books: i64,
    pub available_books: i64,
    pub borrowed_books: i64,
}

impl From<AvailabilityReport> for AvailabilityReportType {
    fn from(report: AvailabilityReport) -> Self {
        Self {
            total_books: report.total_books,
            available_books: report.available_books,
            borrowed_books: report.borrowed_books,
        }
    }
}
