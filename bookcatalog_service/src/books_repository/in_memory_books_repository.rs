use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use serde_json::json;

use crate::api::{Book, BookDraft, BookId, BookStatus, StatusTransition};
use crate::books_repository::{BooksRepository, BooksRepositoryError};
use crate::validation;

pub struct InMemoryBooksRepository {
    book_sequence_generator: AtomicI64,
    books: parking_lot::RwLock<BTreeMap<BookId, Book>>,
}

impl Default for InMemoryBooksRepository {
    fn default() -> Self {
        Self {
            // ids start at 1 like a database sequence
            book_sequence_generator: AtomicI64::new(1),
            books: Default::default(),
        }
    }
}

fn check_draft(draft: &BookDraft) -> Result<(), BooksRepositoryError> {
    let errors = validation::validate_complete(draft, validation::current_year());
    if errors.is_empty() {
        Ok(())
    } else {
        Err(BooksRepositoryError::InvalidBook(errors))
    }
}

fn check_isbn_unique(
    books: &BTreeMap<BookId, Book>,
    isbn: &str,
    except: Option<BookId>,
) -> Result<(), BooksRepositoryError> {
    if books
        .values()
        .any(|book| book.isbn == isbn && Some(book.id) != except)
    {
        Err(BooksRepositoryError::DuplicateIsbn(isbn.to_string()))
    } else {
        Ok(())
    }
}

/// Only a borrow moves a book into `borrowed`, updates may not skip it
fn check_status_change(
    book_id: BookId,
    from: BookStatus,
    to: BookStatus,
) -> Result<(), BooksRepositoryError> {
    if to == BookStatus::Borrowed
        && from != BookStatus::Borrowed
        && StatusTransition::Borrow.apply(from).is_none()
    {
        return Err(BooksRepositoryError::IllegalTransition {
            book_id,
            status: from,
            transition: StatusTransition::Borrow,
        });
    }
    Ok(())
}

#[async_trait::async_trait]
impl BooksRepository for InMemoryBooksRepository {
    async fn add_book(&self, draft: BookDraft) -> Result<Book, BooksRepositoryError> {
        check_draft(&draft)?;
        let status = draft.status.unwrap_or_default();
        if status == BookStatus::Borrowed {
            return Err(BooksRepositoryError::IllegalInitialStatus(status));
        }

        let mut locked_books = self.books.write();
        let isbn = draft.isbn.unwrap_or_default().trim().to_string();
        check_isbn_unique(&locked_books, &isbn, None)?;

        let id = self.book_sequence_generator.fetch_add(1, Ordering::Relaxed);
        let book = Book {
            id,
            title: draft.title.unwrap_or_default().trim().to_string(),
            author: draft.author.unwrap_or_default().trim().to_string(),
            description: draft.description,
            publish_year: draft.publish_year.unwrap_or_default(),
            isbn,
            price: draft.price.unwrap_or_default(),
            status,
            cover_url: draft.cover_url,
        };
        locked_books.insert(id, book.clone());
        Ok(book)
    }

    async fn update_book(
        &self,
        book_id: BookId,
        draft: BookDraft,
    ) -> Result<Book, BooksRepositoryError> {
        let mut locked_books = self.books.write();
        let book = locked_books
            .get(&book_id)
            .ok_or(BooksRepositoryError::NotFound(book_id))?;
        let current_status = book.status;

        let mut merged = json!(book);
        json_patch::merge(&mut merged, &json!(draft));
        let mut updated: Book = serde_json::from_value(merged)?;
        updated.id = book_id;

        check_status_change(book_id, current_status, updated.status)?;
        check_draft(&BookDraft::from(&updated))?;
        check_isbn_unique(&locked_books, &updated.isbn, Some(book_id))?;

        locked_books.insert(book_id, updated.clone());
        Ok(updated)
    }

    async fn get_book(&self, book_id: BookId) -> Result<Book, BooksRepositoryError> {
        self.books
            .read()
            .get(&book_id)
            .cloned()
            .ok_or(BooksRepositoryError::NotFound(book_id))
    }

    async fn list_books(&self) -> Result<Vec<Book>, BooksRepositoryError> {
        Ok(self.books.read().values().cloned().collect())
    }

    async fn search_books(&self, keyword: &str) -> Result<Vec<Book>, BooksRepositoryError> {
        let keyword = keyword.trim().to_lowercase();
        Ok(self
            .books
            .read()
            .values()
            .filter(|book| {
                book.title.to_lowercase().contains(&keyword)
                    || book.author.to_lowercase().contains(&keyword)
            })
            .cloned()
            .collect())
    }

    async fn list_books_by_status(
        &self,
        status: BookStatus,
    ) -> Result<Vec<Book>, BooksRepositoryError> {
        Ok(self
            .books
            .read()
            .values()
            .filter(|book| book.status == status)
            .cloned()
            .collect())
    }

    async fn delete_book(&self, book_id: BookId) -> Result<(), BooksRepositoryError> {
        self.books
            .write()
            .remove(&book_id)
            .map(|_| ())
            .ok_or(BooksRepositoryError::NotFound(book_id))
    }

    async fn change_status(
        &self,
        book_id: BookId,
        transition: StatusTransition,
    ) -> Result<Book, BooksRepositoryError> {
        let mut locked_books = self.books.write();
        let book = locked_books
            .get_mut(&book_id)
            .ok_or(BooksRepositoryError::NotFound(book_id))?;

        book.status = transition.apply(book.status).ok_or(
            BooksRepositoryError::IllegalTransition {
                book_id,
                status: book.status,
                transition,
            },
        )?;
        Ok(book.clone())
    }
}
