//! Catalog management service

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::book::{AvailabilityReport, Book, BookQuery, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List books with pagination and filters
    pub async fn list(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        self.repository.books.search(query).await
    }

    /// Find a book by ID, None when it no longer exists
    pub async fn find(&self, id: Uuid) -> AppResult<Option<Book>> {
        self.repository.books.find_by_id(id).await
    }

    /// Add a book to the catalog
    pub async fn create(&self, book: CreateBook) -> AppResult<Book> {
        self.repository.books.create(&book).await
    }

    /// Update a catalog entry
    pub async fn update(&self, id: Uuid, update: UpdateBook) -> AppResult<Book> {
        self.repository.books.update(id, &update).await
    }

    /// Remove a book from the catalog
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.repository.books.delete(id).await
    }

    /// Copy-count totals across the catalog
    pub async fn availability_report(&self) -> AppResult<AvailabilityReport> {
        self.repository.books.availability_report().await
    }
}
