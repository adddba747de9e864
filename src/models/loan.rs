//! Loan model and related types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// Fixed loan period
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// Loan model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Loan {
    pub id: i32,
    pub book_id: i32,
    pub member_id: i32,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    /// Absent while the loan is outstanding
    pub return_date: Option<DateTime<Utc>>,
}

impl Loan {
    /// A loan is outstanding while its return date is absent.
    pub fn is_outstanding(&self) -> bool {
        self.return_date.is_none()
    }
}

/// A loan not yet persisted, pending insertion through a unit of work
#[derive(Debug, Clone, PartialEq)]
pub struct NewLoan {
    pub book_id: i32,
    pub member_id: i32,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}

impl NewLoan {
    /// Build a loan starting now, due after the fixed loan period.
    pub fn new(book_id: i32, member_id: i32, loan_date: DateTime<Utc>) -> AppResult<Self> {
        if book_id <= 0 {
            return Err(AppError::Validation("Invalid book ID for loan".to_string()));
        }
        if member_id <= 0 {
            return Err(AppError::Validation(
                "Invalid member ID for loan".to_string(),
            ));
        }

        Ok(Self {
            book_id,
            member_id,
            loan_date,
            due_date: loan_date + Duration::days(LOAN_PERIOD_DAYS),
        })
    }
}

/// Loan projection with denormalized book and member names
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanView {
    pub id: i32,
    pub book_id: i32,
    pub book_title: String,
    pub member_id: i32,
    pub member_name: String,
    pub loan_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}

/// Create loan request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLoanRequest {
    /// Book ID
    pub book_id: i32,
    /// Member ID
    pub member_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_loan_is_due_after_fixed_period() {
        let now = Utc::now();
        let loan = NewLoan::new(1, 7, now).unwrap();
        assert_eq!(loan.due_date, now + Duration::days(LOAN_PERIOD_DAYS));
        assert!(loan.due_date >= loan.loan_date);
    }

    #[test]
    fn new_loan_rejects_invalid_ids() {
        let now = Utc::now();
        assert!(matches!(
            NewLoan::new(0, 7, now),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            NewLoan::new(1, -1, now),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn loan_is_outstanding_until_returned() {
        let now = Utc::now();
        let mut loan = Loan {
            id: 1,
            book_id: 1,
            member_id: 7,
            loan_date: now,
            due_date: now + Duration::days(LOAN_PERIOD_DAYS),
            return_date: None,
        };
        assert!(loan.is_outstanding());

        loan.return_date = Some(now);
        assert!(!loan.is_outstanding());
    }
}
