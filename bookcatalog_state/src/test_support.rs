use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

use bookcatalog_service::api::{Book, BookDraft, BookId, BookStatus, StatusTransition};
use bookcatalog_service::client::{CatalogApi, CatalogOperation, RequestError, RequestErrorKind};

pub fn book(id: BookId, title: &str, status: BookStatus) -> Book {
    Book {
        id,
        title: title.to_string(),
        author: format!("Author of {}", title),
        description: None,
        publish_year: 1990,
        isbn: format!("isbn-{}", id),
        price: 12.5,
        status,
        cover_url: None,
    }
}

/// In process catalog following the same rules as the catalog service
#[derive(Default)]
pub struct FakeCatalog {
    books: Mutex<Vec<Book>>,
    next_id: AtomicI64,
    list_all_calls: AtomicUsize,
    search_calls: AtomicUsize,
    write_calls: AtomicUsize,
    fail_reads: AtomicBool,
    write_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeCatalog {
    pub fn with_books(books: Vec<Book>) -> Self {
        let next_id = books.iter().map(|book| book.id).max().unwrap_or_default() + 1;
        Self {
            books: Mutex::new(books),
            next_id: AtomicI64::new(next_id),
            ..Default::default()
        }
    }

    pub fn list_all_calls(&self) -> usize {
        self.list_all_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Writes wait for a notification on the returned gate before they are applied
    pub fn hold_writes(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.write_gate.lock() = Some(gate.clone());
        gate
    }

    async fn begin_write(&self) {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.write_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn check_reads(&self, operation: CatalogOperation) -> Result<(), RequestError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RequestError::new(operation, RequestErrorKind::Transport, None));
        }
        Ok(())
    }

    fn not_found(operation: CatalogOperation, book_id: BookId) -> RequestError {
        RequestError::new(
            operation,
            RequestErrorKind::NotFound,
            Some(format!("Book {} not found", book_id)),
        )
    }

    async fn change_status(
        &self,
        operation: CatalogOperation,
        book_id: BookId,
        transition: StatusTransition,
    ) -> Result<Book, RequestError> {
        self.begin_write().await;
        let mut books = self.books.lock();
        let book = books
            .iter_mut()
            .find(|book| book.id == book_id)
            .ok_or_else(|| Self::not_found(operation, book_id))?;
        let status = transition.apply(book.status).ok_or_else(|| {
            RequestError::new(
                operation,
                RequestErrorKind::Conflict,
                Some(format!(
                    "Book {} is {} and cannot be {}",
                    book_id,
                    book.status,
                    transition.past_tense()
                )),
            )
        })?;
        book.status = status;
        Ok(book.clone())
    }
}

#[async_trait::async_trait]
impl CatalogApi for FakeCatalog {
    async fn list_all(&self) -> Result<Vec<Book>, RequestError> {
        self.list_all_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reads(CatalogOperation::ListAll)?;
        Ok(self.books.lock().clone())
    }

    async fn get_by_id(&self, book_id: BookId) -> Result<Book, RequestError> {
        self.check_reads(CatalogOperation::GetById)?;
        self.books
            .lock()
            .iter()
            .find(|book| book.id == book_id)
            .cloned()
            .ok_or_else(|| Self::not_found(CatalogOperation::GetById, book_id))
    }

    async fn search(&self, keyword: &str) -> Result<Vec<Book>, RequestError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reads(CatalogOperation::Search)?;
        let keyword = keyword.trim().to_lowercase();
        Ok(self
            .books
            .lock()
            .iter()
            .filter(|book| {
                book.title.to_lowercase().contains(&keyword)
                    || book.author.to_lowercase().contains(&keyword)
            })
            .cloned()
            .collect())
    }

    async fn list_by_status(&self, status: BookStatus) -> Result<Vec<Book>, RequestError> {
        self.check_reads(CatalogOperation::ListByStatus)?;
        Ok(self
            .books
            .lock()
            .iter()
            .filter(|book| book.status == status)
            .cloned()
            .collect())
    }

    async fn create(&self, draft: &BookDraft) -> Result<Book, RequestError> {
        self.begin_write().await;
        let mut books = self.books.lock();
        let isbn = draft.isbn.clone().unwrap_or_default();
        if books.iter().any(|book| book.isbn == isbn) {
            return Err(RequestError::new(
                CatalogOperation::Create,
                RequestErrorKind::Conflict,
                Some(format!("Book with isbn {} already exists", isbn)),
            ));
        }
        let book = Book {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            title: draft.title.clone().unwrap_or_default(),
            author: draft.author.clone().unwrap_or_default(),
            description: draft.description.clone(),
            publish_year: draft.publish_year.unwrap_or_default(),
            isbn,
            price: draft.price.unwrap_or_default(),
            status: draft.status.unwrap_or_default(),
            cover_url: draft.cover_url.clone(),
        };
        books.push(book.clone());
        Ok(book)
    }

    async fn update(&self, book_id: BookId, draft: &BookDraft) -> Result<Book, RequestError> {
        self.begin_write().await;
        let mut books = self.books.lock();
        let book = books
            .iter_mut()
            .find(|book| book.id == book_id)
            .ok_or_else(|| Self::not_found(CatalogOperation::Update, book_id))?;
        if let Some(title) = &draft.title {
            book.title = title.clone();
        }
        if let Some(status) = draft.status {
            book.status = status;
        }
        Ok(book.clone())
    }

    async fn delete(&self, book_id: BookId) -> Result<(), RequestError> {
        self.begin_write().await;
        let mut books = self.books.lock();
        let position = books
            .iter()
            .position(|book| book.id == book_id)
            .ok_or_else(|| Self::not_found(CatalogOperation::Delete, book_id))?;
        books.remove(position);
        Ok(())
    }

    async fn borrow(&self, book_id: BookId) -> Result<Book, RequestError> {
        self.change_status(CatalogOperation::Borrow, book_id, StatusTransition::Borrow)
            .await
    }

    async fn return_book(&self, book_id: BookId) -> Result<Book, RequestError> {
        self.change_status(CatalogOperation::Return, book_id, StatusTransition::Return)
            .await
    }
}
