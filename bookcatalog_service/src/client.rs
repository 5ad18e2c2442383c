use std::fmt;

pub use http_catalog_client::{CatalogClient, DEFAULT_REQUEST_TIMEOUT};

use crate::api::{Book, BookDraft, BookId, BookStatus};

mod http_catalog_client;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOperation {
    ListAll,
    GetById,
    Search,
    ListByStatus,
    Create,
    Update,
    Delete,
    Borrow,
    Return,
}

impl CatalogOperation {
    /// Message used when the service did not explain the failure itself
    pub fn fallback_message(&self) -> &'static str {
        match self {
            CatalogOperation::ListAll => "failed to fetch book list",
            CatalogOperation::GetById => "failed to fetch book",
            CatalogOperation::Search => "failed to search books",
            CatalogOperation::ListByStatus => "failed to fetch books by status",
            CatalogOperation::Create => "failed to create book",
            CatalogOperation::Update => "failed to update book",
            CatalogOperation::Delete => "failed to delete book",
            CatalogOperation::Borrow => "failed to borrow book",
            CatalogOperation::Return => "failed to return book",
        }
    }
}

impl fmt::Display for CatalogOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CatalogOperation::ListAll => "list_all",
            CatalogOperation::GetById => "get_by_id",
            CatalogOperation::Search => "search",
            CatalogOperation::ListByStatus => "list_by_status",
            CatalogOperation::Create => "create",
            CatalogOperation::Update => "update",
            CatalogOperation::Delete => "delete",
            CatalogOperation::Borrow => "borrow",
            CatalogOperation::Return => "return",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestErrorKind {
    /// Connection could not be made or broke mid-request
    Transport,
    Timeout,
    /// Service answered with a failure
    Rejected,
    NotFound,
    /// Service refused a state change, e.g. borrowing a book that is already borrowed
    Conflict,
    /// Response did not follow the catalog envelope
    InvalidResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RequestError {
    pub operation: CatalogOperation,
    pub kind: RequestErrorKind,
    pub message: String,
}

impl RequestError {
    pub fn new(operation: CatalogOperation, kind: RequestErrorKind, message: Option<String>) -> Self {
        Self {
            operation,
            kind,
            message: message
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| operation.fallback_message().to_string()),
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.kind == RequestErrorKind::Conflict
    }
}

/// Operations of the remote catalog, one network call each
#[async_trait::async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Book>, RequestError>;

    async fn get_by_id(&self, book_id: BookId) -> Result<Book, RequestError>;

    /// Books whose title or author matches the keyword, matching is done by the service
    async fn search(&self, keyword: &str) -> Result<Vec<Book>, RequestError>;

    async fn list_by_status(&self, status: BookStatus) -> Result<Vec<Book>, RequestError>;

    /// Creates the book, returns it with the id assigned by the service
    async fn create(&self, draft: &BookDraft) -> Result<Book, RequestError>;

    /// Merges fields present in the draft into the stored book
    async fn update(&self, book_id: BookId, draft: &BookDraft) -> Result<Book, RequestError>;

    async fn delete(&self, book_id: BookId) -> Result<(), RequestError>;

    async fn borrow(&self, book_id: BookId) -> Result<Book, RequestError>;

    async fn return_book(&self, book_id: BookId) -> Result<Book, RequestError>;
}
