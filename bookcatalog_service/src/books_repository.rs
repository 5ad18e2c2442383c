pub use in_memory_books_repository::InMemoryBooksRepository;

use crate::api::{Book, BookDraft, BookId, BookStatus, StatusTransition};
use crate::validation::ValidationErrors;

mod in_memory_books_repository;

#[derive(thiserror::Error, Debug)]
pub enum BooksRepositoryError {
    #[error("Book {0} not found")]
    NotFound(BookId),

    #[error("{0}")]
    InvalidBook(ValidationErrors),

    #[error("Book with isbn {0} already exists")]
    DuplicateIsbn(String),

    #[error("Book {book_id} is {status} and cannot be {}", .transition.past_tense())]
    IllegalTransition {
        book_id: BookId,
        status: BookStatus,
        transition: StatusTransition,
    },

    #[error("A new book cannot start out {0}")]
    IllegalInitialStatus(BookStatus),

    #[error("Failed to deserialize book: {0}")]
    DeserializationError(#[from] serde_json::Error),
}

#[async_trait::async_trait]
pub trait BooksRepository: Send + Sync {
    /// Validates and stores a new book, returns it with the assigned id
    async fn add_book(&self, draft: BookDraft) -> Result<Book, BooksRepositoryError>;
    /// Merges present draft fields into the stored book, returns the updated book
    async fn update_book(
        &self,
        book_id: BookId,
        draft: BookDraft,
    ) -> Result<Book, BooksRepositoryError>;
    async fn get_book(&self, book_id: BookId) -> Result<Book, BooksRepositoryError>;
    /// Lists all books ordered by id
    async fn list_books(&self) -> Result<Vec<Book>, BooksRepositoryError>;
    /// Books with title or author containing the keyword, all books for a blank keyword
    async fn search_books(&self, keyword: &str) -> Result<Vec<Book>, BooksRepositoryError>;
    async fn list_books_by_status(
        &self,
        status: BookStatus,
    ) -> Result<Vec<Book>, BooksRepositoryError>;
    async fn delete_book(&self, book_id: BookId) -> Result<(), BooksRepositoryError>;
    /// Applies a lending transition, fails when the current status does not allow it
    async fn change_status(
        &self,
        book_id: BookId,
        transition: StatusTransition,
    ) -> Result<Book, BooksRepositoryError>;
}
