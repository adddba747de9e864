//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub genre: Option<String>,
    pub publication_year: i32,
    /// Copies currently on the shelf, never negative
    pub available_copies: i32,
}

impl Book {
    /// New state after lending one copy, or `None` if no copy is available.
    pub fn lend(&self) -> Option<Book> {
        if self.available_copies > 0 {
            Some(Book {
                available_copies: self.available_copies - 1,
                ..self.clone()
            })
        } else {
            None
        }
    }

    /// New state after a copy comes back.
    pub fn restore(&self) -> Book {
        Book {
            available_copies: self.available_copies + 1,
            ..self.clone()
        }
    }
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 200, message = "Author is required"))]
    pub author: String,
    #[validate(length(min = 1, max = 50, message = "ISBN is required"))]
    pub isbn: String,
    #[validate(length(max = 100))]
    pub genre: Option<String>,
    #[validate(range(min = 1, max = 9999, message = "Publication year must be between 1 and 9999"))]
    pub publication_year: i32,
    #[validate(range(min = 0, message = "Available copies cannot be negative"))]
    pub available_copies: i32,
}

/// Update book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 200, message = "Author is required"))]
    pub author: String,
    #[validate(length(min = 1, max = 50, message = "ISBN is required"))]
    pub isbn: String,
    #[validate(length(max = 100))]
    pub genre: Option<String>,
    #[validate(range(min = 1, max = 9999, message = "Publication year must be between 1 and 9999"))]
    pub publication_year: i32,
    #[validate(range(min = 0, message = "Available copies cannot be negative"))]
    pub available_copies: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(copies: i32) -> Book {
        Book {
            id: 1,
            title: "The Left Hand of Darkness".to_string(),
            author: "Ursula K. Le Guin".to_string(),
            isbn: "978-0441478125".to_string(),
            genre: Some("Science Fiction".to_string()),
            publication_year: 1969,
            available_copies: copies,
        }
    }

    #[test]
    fn lend_decrements_available_copies() {
        let lent = book(3).lend().unwrap();
        assert_eq!(lent.available_copies, 2);
    }

    #[test]
    fn lend_fails_when_no_copies_left() {
        assert!(book(0).lend().is_none());
    }

    #[test]
    fn restore_undoes_lend() {
        let b = book(1);
        let lent = b.lend().unwrap();
        assert_eq!(lent.restore().available_copies, b.available_copies);
    }
}
