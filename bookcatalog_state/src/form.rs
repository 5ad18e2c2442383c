use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bookcatalog_service::api::{Book, BookDraft};
use bookcatalog_service::client::RequestError;
use bookcatalog_service::validation::{self, ValidationErrors};

use crate::store::CatalogStore;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitError {
    #[error("{0}")]
    Invalid(ValidationErrors),
    #[error("A submission is already in progress")]
    InProgress,
    #[error(transparent)]
    Request(#[from] RequestError),
}

struct SubmittingGuard<'a>(&'a AtomicBool);

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// The "add book" form. Drafts are validated locally before anything is sent
pub struct NewBookForm {
    store: Arc<CatalogStore>,
    submitting: AtomicBool,
}

impl NewBookForm {
    pub fn new(store: Arc<CatalogStore>) -> Self {
        Self {
            store,
            submitting: AtomicBool::new(false),
        }
    }

    pub fn blank_draft() -> BookDraft {
        BookDraft::blank_form(validation::current_year())
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::SeqCst)
    }

    pub async fn submit(&self, draft: &BookDraft) -> Result<Book, SubmitError> {
        let errors = validation::validate(draft);
        if !errors.is_empty() {
            tracing::debug!("Book draft rejected {}", errors);
            return Err(SubmitError::Invalid(errors));
        }

        if self
            .submitting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SubmitError::InProgress);
        }
        let _guard = SubmittingGuard(&self.submitting);

        let book = match self.store.client().create(draft).await {
            Ok(book) => book,
            Err(err) => {
                tracing::warn!("Book creation failed {}", err);
                self.store.report_error(&err);
                return Err(err.into());
            }
        };

        tracing::info!("Book {} created", book.id);
        if self.store.refresh().await.is_ok() {
            self.store.report_success("Book added");
        }
        Ok(book)
    }
}

#[cfg(test)]
mod new_book_form_tests {
    use bookcatalog_service::api::BookStatus;
    use bookcatalog_service::client::RequestErrorKind;
    use bookcatalog_service::validation::{PRICE, TITLE};

    use super::*;
    use crate::store::NoticeKind;
    use crate::test_support::{book, FakeCatalog};

    fn filled_draft(isbn: &str) -> BookDraft {
        BookDraft {
            title: Some("Solaris".to_string()),
            author: Some("Stanislaw Lem".to_string()),
            isbn: Some(isbn.to_string()),
            price: Some(30.0),
            ..NewBookForm::blank_draft()
        }
    }

    async fn setup() -> (Arc<FakeCatalog>, Arc<CatalogStore>, NewBookForm) {
        let catalog = Arc::new(FakeCatalog::with_books(vec![book(
            1,
            "Dune",
            BookStatus::Available,
        )]));
        let store = Arc::new(CatalogStore::new(catalog.clone()));
        store.refresh().await.unwrap();
        let form = NewBookForm::new(store.clone());
        (catalog, store, form)
    }

    #[tokio::test]
    async fn test_invalid_draft_is_not_sent() {
        let (catalog, _, form) = setup().await;

        let err = form.submit(&NewBookForm::blank_draft()).await.unwrap_err();

        let SubmitError::Invalid(errors) = err else {
            panic!("expected validation errors");
        };
        assert!(errors.contains(TITLE));
        assert!(errors.contains(PRICE));
        assert_eq!(catalog.write_calls(), 0);
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn test_valid_draft_is_created_and_listed() {
        let (catalog, store, form) = setup().await;

        let created = form.submit(&filled_draft("978-0156027601")).await.unwrap();

        assert_eq!(created.id, 2);
        assert_eq!(created.status, BookStatus::Available);
        assert_eq!(catalog.list_all_calls(), 2);
        assert_eq!(store.book(2).unwrap().title, "Solaris");
        let notice = store.notice().unwrap();
        assert_eq!(notice.kind, NoticeKind::Success);
        assert_eq!(notice.message, "Book added");
    }

    #[tokio::test]
    async fn test_rejected_draft_reports_service_message() {
        let (_, store, form) = setup().await;

        let err = form.submit(&filled_draft("isbn-1")).await.unwrap_err();

        assert_eq!(
            err,
            SubmitError::Request(RequestError::new(
                bookcatalog_service::client::CatalogOperation::Create,
                RequestErrorKind::Conflict,
                Some("Book with isbn isbn-1 already exists".to_string()),
            ))
        );
        assert_eq!(store.full_collection().len(), 1);
        assert_eq!(store.notice().unwrap().kind, NoticeKind::Error);
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn test_second_submission_waits_for_first() {
        let (catalog, _, form) = setup().await;
        let gate = catalog.hold_writes();
        let draft = filled_draft("978-0156027601");

        let (first, second) = tokio::join!(form.submit(&draft), async {
            let second = form.submit(&draft).await;
            gate.notify_waiters();
            second
        });

        assert!(first.is_ok());
        assert_eq!(second, Err(SubmitError::InProgress));
        assert_eq!(catalog.write_calls(), 1);
    }
}
