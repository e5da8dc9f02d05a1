//! Circulation service
//!
//! Borrow/return orchestration over the ledger. Owns no records itself;
//! the repository transaction keeps the copy counter in step with the
//! ledger writes.

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book::Book,
        borrow::{ActiveMember, Borrow, BorrowDetails, MostBorrowedBook},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
}

impl CirculationService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow a book for a user
    pub async fn borrow(&self, user_id: Uuid, book_id: Uuid) -> AppResult<Borrow> {
        self.repository.borrows.borrow(user_id, book_id).await
    }

    /// Return a borrowed book; only the borrower may return it
    pub async fn return_book(&self, borrow_id: Uuid, user_id: Uuid) -> AppResult<Borrow> {
        self.repository
            .borrows
            .return_borrow(borrow_id, user_id)
            .await
    }

    /// Borrow history for a user, newest first
    pub async fn history(&self, user_id: Uuid) -> AppResult<Vec<BorrowDetails>> {
        self.repository.borrows.user_history(user_id).await
    }

    /// Report: most borrowed books with counts
    pub async fn most_borrowed(&self) -> AppResult<Vec<MostBorrowedBook>> {
        self.repository.borrows.most_borrowed().await
    }

    /// Report: most borrowed books as catalog rows
    pub async fn most_borrowed_books(&self) -> AppResult<Vec<Book>> {
        self.repository.borrows.most_borrowed_books().await
    }

    /// Report: most active borrowers with counts
    pub async fn active_members(&self) -> AppResult<Vec<ActiveMember>> {
        self.repository.borrows.active_members().await
    }
}
