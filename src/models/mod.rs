//! Data models for Libris

pub mod book;
pub mod loan;
pub mod member;

// Re-export commonly used types
pub use book::Book;
pub use loan::{Loan, LoanView};
pub use member::{Member, MembershipType};
