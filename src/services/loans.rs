//! Loan lifecycle service
//!
//! Orchestrates borrow and return operations across books, members and
//! loans. All mutation goes through a single unit-of-work commit on the
//! gateway; nothing is written outside that boundary.

use std::sync::Arc;

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::loan::{LoanView, NewLoan},
    repository::{Gateway, UnitOfWork},
};

#[derive(Clone)]
pub struct LoansService {
    gateway: Arc<dyn Gateway>,
}

impl LoansService {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// Borrow a book for a member.
    ///
    /// Checks run in order, first failure wins: the book must exist, a copy
    /// must be available, the member must exist, and the member must not
    /// already hold an outstanding loan for the same book. On success the
    /// loan insert and the copy-count decrement commit as one unit.
    pub async fn create_loan(&self, book_id: i32, member_id: i32) -> AppResult<LoanView> {
        let book = self
            .gateway
            .get_book(book_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))?;

        let lent = book.lend().ok_or_else(|| {
            AppError::Conflict("No available copies of this book".to_string())
        })?;

        let member = self
            .gateway
            .get_member(member_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", member_id)))?;

        let existing = self.gateway.get_loans_by_member(member.id).await?;
        if existing
            .iter()
            .any(|l| l.book_id == book.id && l.is_outstanding())
        {
            return Err(AppError::Conflict(
                "This book is already borrowed by the member".to_string(),
            ));
        }

        let loan = NewLoan::new(book.id, member.id, Utc::now())?;

        let unit = UnitOfWork::new()
            .insert_loan(loan)
            .update_copies(book.id, book.available_copies, lent.available_copies);

        let loan_ids = self.gateway.commit(unit).await?;
        let loan_id = loan_ids
            .first()
            .copied()
            .ok_or_else(|| AppError::Internal("Commit returned no loan id".to_string()))?;

        tracing::info!(loan_id, book_id, member_id, "loan created");

        self.gateway
            .get_loan_view(loan_id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Created loan {} not readable", loan_id)))
    }

    /// Return a borrowed book.
    ///
    /// An unknown loan id is reported as `NotFound` for both operations; the
    /// web layer maps it to a 404. Returning twice fails with `Conflict`
    /// rather than silently no-op'ing, and the copy-count increment commits
    /// together with the return date in one unit.
    pub async fn return_book(&self, loan_id: i32) -> AppResult<LoanView> {
        let loan = self
            .gateway
            .get_loan(loan_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;

        if !loan.is_outstanding() {
            return Err(AppError::Conflict(
                "This loan has already been returned".to_string(),
            ));
        }

        // Books and loans are independently mutable rows, so the reference
        // is re-checked even though the schema restricts deletion.
        let book = self.gateway.get_book(loan.book_id).await?.ok_or_else(|| {
            AppError::NotFound("The book associated with this loan does not exist".to_string())
        })?;

        let restored = book.restore();

        let unit = UnitOfWork::new()
            .return_loan(loan.id, Utc::now())
            .update_copies(book.id, book.available_copies, restored.available_copies);

        self.gateway.commit(unit).await?;

        tracing::info!(loan_id, book_id = book.id, "loan returned");

        self.gateway
            .get_loan_view(loan.id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("Returned loan {} not readable", loan.id)))
    }

    /// List all loans
    pub async fn list_loans(&self) -> AppResult<Vec<LoanView>> {
        self.gateway.list_loan_views().await
    }

    /// Get a loan by id
    pub async fn get_loan(&self, id: i32) -> AppResult<LoanView> {
        self.gateway
            .get_loan_view(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// List loans of a member
    pub async fn list_member_loans(&self, member_id: i32) -> AppResult<Vec<LoanView>> {
        // Verify member exists
        self.gateway
            .get_member(member_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", member_id)))?;

        self.gateway.list_loan_views_by_member(member_id).await
    }
}
