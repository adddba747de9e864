//! Catalog service for book management

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
    repository::Gateway,
};

#[derive(Clone)]
pub struct BooksService {
    gateway: Arc<dyn Gateway>,
}

impl BooksService {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// List all books
    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.gateway.list_books().await
    }

    /// Get book by id
    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.gateway
            .get_book(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Get book by ISBN
    pub async fn get_book_by_isbn(&self, isbn: &str) -> AppResult<Book> {
        self.gateway
            .get_book_by_isbn(isbn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with ISBN {} not found", isbn)))
    }

    /// Add a new book to the catalog
    pub async fn add_book(&self, book: CreateBook) -> AppResult<Book> {
        if self.gateway.get_book_by_isbn(&book.isbn).await?.is_some() {
            return Err(AppError::Conflict(
                "A book with this ISBN already exists".to_string(),
            ));
        }

        let created = self.gateway.insert_book(&book).await?;
        tracing::info!(book_id = created.id, isbn = %created.isbn, "book added");
        Ok(created)
    }

    /// Update an existing book
    pub async fn update_book(&self, id: i32, update: UpdateBook) -> AppResult<Book> {
        let existing = self
            .gateway
            .get_book(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        // The new ISBN must not collide with a different book
        if let Some(other) = self.gateway.get_book_by_isbn(&update.isbn).await? {
            if other.id != id {
                return Err(AppError::Conflict(
                    "A book with this ISBN already exists".to_string(),
                ));
            }
        }

        let book = Book {
            id: existing.id,
            title: update.title,
            author: update.author,
            isbn: update.isbn,
            genre: update.genre,
            publication_year: update.publication_year,
            available_copies: update.available_copies,
        };

        self.gateway.save_book(&book).await?;
        Ok(book)
    }

    /// Delete a book, restricted while loans reference it
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.gateway
            .get_book(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        if self.gateway.has_loans_for_book(id).await? {
            return Err(AppError::Conflict(
                "Book cannot be deleted while loans reference it".to_string(),
            ));
        }

        self.gateway.delete_book(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockGateway;

    fn book(id: i32, isbn: &str) -> Book {
        Book {
            id,
            title: "Emma".to_string(),
            author: "Jane Austen".to_string(),
            isbn: isbn.to_string(),
            genre: None,
            publication_year: 1815,
            available_copies: 2,
        }
    }

    fn create_book(isbn: &str) -> CreateBook {
        CreateBook {
            title: "Emma".to_string(),
            author: "Jane Austen".to_string(),
            isbn: isbn.to_string(),
            genre: None,
            publication_year: 1815,
            available_copies: 2,
        }
    }

    #[tokio::test]
    async fn add_book_rejects_duplicate_isbn() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_get_book_by_isbn()
            .returning(|isbn| Ok(Some(book(1, isbn))));

        let service = BooksService::new(Arc::new(gateway));
        let err = service.add_book(create_book("978-1")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_book_allows_keeping_own_isbn() {
        let mut gateway = MockGateway::new();
        gateway.expect_get_book().returning(|id| Ok(Some(book(id, "978-1"))));
        gateway
            .expect_get_book_by_isbn()
            .returning(|isbn| Ok(Some(book(5, isbn))));
        gateway.expect_save_book().returning(|_| Ok(()));

        let service = BooksService::new(Arc::new(gateway));
        let update = UpdateBook {
            title: "Emma".to_string(),
            author: "Jane Austen".to_string(),
            isbn: "978-1".to_string(),
            genre: Some("Novel".to_string()),
            publication_year: 1815,
            available_copies: 3,
        };
        assert!(service.update_book(5, update).await.is_ok());
    }

    #[tokio::test]
    async fn delete_book_is_restricted_while_loans_reference_it() {
        let mut gateway = MockGateway::new();
        gateway.expect_get_book().returning(|id| Ok(Some(book(id, "978-1"))));
        gateway.expect_has_loans_for_book().returning(|_| Ok(true));

        let service = BooksService::new(Arc::new(gateway));
        let err = service.delete_book(5).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
