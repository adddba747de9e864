//! Loans repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::loan::{Loan, LoanView},
};

use super::UnitOfWork;

const LOAN_VIEW_SELECT: &str = r#"
    SELECT l.id, l.book_id, b.title AS book_title,
           l.member_id, m.name AS member_name,
           l.loan_date, l.due_date, l.return_date
    FROM loans l
    JOIN books b ON l.book_id = b.id
    JOIN members m ON l.member_id = m.id
"#;

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<Loan>> {
        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(loan)
    }

    /// Get all loans of a member, outstanding and returned
    pub async fn get_by_member(&self, member_id: i32) -> AppResult<Vec<Loan>> {
        let loans =
            sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE member_id = $1 ORDER BY loan_date")
                .bind(member_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(loans)
    }

    /// Get a loan projection with book title and member name
    pub async fn get_view(&self, id: i32) -> AppResult<Option<LoanView>> {
        let view =
            sqlx::query_as::<_, LoanView>(&format!("{} WHERE l.id = $1", LOAN_VIEW_SELECT))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(view)
    }

    /// List all loan projections
    pub async fn list_views(&self) -> AppResult<Vec<LoanView>> {
        let views =
            sqlx::query_as::<_, LoanView>(&format!("{} ORDER BY l.loan_date", LOAN_VIEW_SELECT))
                .fetch_all(&self.pool)
                .await?;
        Ok(views)
    }

    /// List loan projections for a member
    pub async fn list_views_by_member(&self, member_id: i32) -> AppResult<Vec<LoanView>> {
        let views = sqlx::query_as::<_, LoanView>(&format!(
            "{} WHERE l.member_id = $1 ORDER BY l.loan_date",
            LOAN_VIEW_SELECT
        ))
        .bind(member_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(views)
    }

    /// Whether any loan references the book
    pub async fn exists_for_book(&self, book_id: i32) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM loans WHERE book_id = $1)")
                .bind(book_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Whether any loan references the member
    pub async fn exists_for_member(&self, member_id: i32) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM loans WHERE member_id = $1)")
                .bind(member_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Commit a unit of work in one transaction.
    ///
    /// Copy-count updates are guarded on the previously observed value and
    /// loan returns on the return date still being absent, so a concurrent
    /// writer aborts the whole transaction with a conflict instead of
    /// overshooting the counters.
    pub async fn commit(&self, unit: UnitOfWork) -> AppResult<Vec<i32>> {
        let mut tx = self.pool.begin().await?;
        let mut loan_ids = Vec::with_capacity(unit.new_loans.len());

        for loan in &unit.new_loans {
            let id: i32 = sqlx::query_scalar(
                r#"
                INSERT INTO loans (book_id, member_id, loan_date, due_date, return_date)
                VALUES ($1, $2, $3, $4, NULL)
                RETURNING id
                "#,
            )
            .bind(loan.book_id)
            .bind(loan.member_id)
            .bind(loan.loan_date)
            .bind(loan.due_date)
            .fetch_one(&mut *tx)
            .await?;
            loan_ids.push(id);
        }

        for ret in &unit.loan_returns {
            let updated = sqlx::query(
                "UPDATE loans SET return_date = $1 WHERE id = $2 AND return_date IS NULL",
            )
            .bind(ret.returned_at)
            .bind(ret.loan_id)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(AppError::Conflict(
                    "This loan has already been returned".to_string(),
                ));
            }
        }

        for update in &unit.copies_updates {
            let updated = sqlx::query(
                "UPDATE books SET available_copies = $1 WHERE id = $2 AND available_copies = $3",
            )
            .bind(update.new)
            .bind(update.book_id)
            .bind(update.expected)
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                return Err(AppError::Conflict(
                    "Book availability changed concurrently".to_string(),
                ));
            }
        }

        tx.commit().await?;
        Ok(loan_ids)
    }
}
