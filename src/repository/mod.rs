//! Persistence gateway for database operations

pub mod books;
pub mod loans;
pub mod members;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        book::{Book, CreateBook},
        loan::{Loan, LoanView, NewLoan},
        member::{Member, NewMember},
    },
};

/// A pending copy-count change, compare-and-swap guarded on the old value
#[derive(Debug, Clone, PartialEq)]
pub struct CopiesUpdate {
    pub book_id: i32,
    pub expected: i32,
    pub new: i32,
}

/// A pending loan return
#[derive(Debug, Clone, PartialEq)]
pub struct LoanReturn {
    pub loan_id: i32,
    pub returned_at: DateTime<Utc>,
}

/// A group of writes committed atomically in one database transaction
#[derive(Debug, Default)]
pub struct UnitOfWork {
    pub new_loans: Vec<NewLoan>,
    pub loan_returns: Vec<LoanReturn>,
    pub copies_updates: Vec<CopiesUpdate>,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_loan(mut self, loan: NewLoan) -> Self {
        self.new_loans.push(loan);
        self
    }

    pub fn return_loan(mut self, loan_id: i32, returned_at: DateTime<Utc>) -> Self {
        self.loan_returns.push(LoanReturn {
            loan_id,
            returned_at,
        });
        self
    }

    pub fn update_copies(mut self, book_id: i32, expected: i32, new: i32) -> Self {
        self.copies_updates.push(CopiesUpdate {
            book_id,
            expected,
            new,
        });
        self
    }
}

/// Durable storage and transactional commit for books, members and loans.
///
/// Services receive this as `Arc<dyn Gateway>` so the core can be exercised
/// against mocks without a database.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Gateway: Send + Sync {
    // Books
    async fn list_books(&self) -> AppResult<Vec<Book>>;
    async fn get_book(&self, id: i32) -> AppResult<Option<Book>>;
    async fn get_book_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>>;
    async fn insert_book(&self, book: &CreateBook) -> AppResult<Book>;
    async fn save_book(&self, book: &Book) -> AppResult<()>;
    async fn delete_book(&self, id: i32) -> AppResult<()>;

    // Members
    async fn list_members(&self) -> AppResult<Vec<Member>>;
    async fn get_member(&self, id: i32) -> AppResult<Option<Member>>;
    async fn get_member_by_username(&self, username: &str) -> AppResult<Option<Member>>;
    async fn insert_member(&self, member: &NewMember) -> AppResult<Member>;
    async fn save_member(&self, member: &Member) -> AppResult<()>;
    async fn delete_member(&self, id: i32) -> AppResult<()>;

    // Loans
    async fn get_loan(&self, id: i32) -> AppResult<Option<Loan>>;
    async fn get_loans_by_member(&self, member_id: i32) -> AppResult<Vec<Loan>>;
    async fn get_loan_view(&self, id: i32) -> AppResult<Option<LoanView>>;
    async fn list_loan_views(&self) -> AppResult<Vec<LoanView>>;
    async fn list_loan_views_by_member(&self, member_id: i32) -> AppResult<Vec<LoanView>>;
    async fn has_loans_for_book(&self, book_id: i32) -> AppResult<bool>;
    async fn has_loans_for_member(&self, member_id: i32) -> AppResult<bool>;

    /// Commit a unit of work atomically, returning the ids assigned to
    /// inserted loans in order.
    async fn commit(&self, unit: UnitOfWork) -> AppResult<Vec<i32>>;

    /// Check that the backing store answers
    async fn ping(&self) -> AppResult<()>;
}

/// Postgres-backed gateway holding the per-entity repositories
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub members: members::MembersRepository,
    pub loans: loans::LoansRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            members: members::MembersRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl Gateway for Repository {
    async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.books.list().await
    }

    async fn get_book(&self, id: i32) -> AppResult<Option<Book>> {
        self.books.get_by_id(id).await
    }

    async fn get_book_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        self.books.get_by_isbn(isbn).await
    }

    async fn insert_book(&self, book: &CreateBook) -> AppResult<Book> {
        self.books.insert(book).await
    }

    async fn save_book(&self, book: &Book) -> AppResult<()> {
        self.books.save(book).await
    }

    async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.books.delete(id).await
    }

    async fn list_members(&self) -> AppResult<Vec<Member>> {
        self.members.list().await
    }

    async fn get_member(&self, id: i32) -> AppResult<Option<Member>> {
        self.members.get_by_id(id).await
    }

    async fn get_member_by_username(&self, username: &str) -> AppResult<Option<Member>> {
        self.members.get_by_username(username).await
    }

    async fn insert_member(&self, member: &NewMember) -> AppResult<Member> {
        self.members.insert(member).await
    }

    async fn save_member(&self, member: &Member) -> AppResult<()> {
        self.members.save(member).await
    }

    async fn delete_member(&self, id: i32) -> AppResult<()> {
        self.members.delete(id).await
    }

    async fn get_loan(&self, id: i32) -> AppResult<Option<Loan>> {
        self.loans.get_by_id(id).await
    }

    async fn get_loans_by_member(&self, member_id: i32) -> AppResult<Vec<Loan>> {
        self.loans.get_by_member(member_id).await
    }

    async fn get_loan_view(&self, id: i32) -> AppResult<Option<LoanView>> {
        self.loans.get_view(id).await
    }

    async fn list_loan_views(&self) -> AppResult<Vec<LoanView>> {
        self.loans.list_views().await
    }

    async fn list_loan_views_by_member(&self, member_id: i32) -> AppResult<Vec<LoanView>> {
        self.loans.list_views_by_member(member_id).await
    }

    async fn has_loans_for_book(&self, book_id: i32) -> AppResult<bool> {
        self.loans.exists_for_book(book_id).await
    }

    async fn has_loans_for_member(&self, member_id: i32) -> AppResult<bool> {
        self.loans.exists_for_member(member_id).await
    }

    async fn commit(&self, unit: UnitOfWork) -> AppResult<Vec<i32>> {
        self.loans.commit(unit).await
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
