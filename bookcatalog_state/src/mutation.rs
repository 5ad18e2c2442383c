use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use bookcatalog_service::api::{BookId, BookStatus};
use bookcatalog_service::client::RequestError;

use crate::store::CatalogStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemAction {
    Borrow,
    Return,
    Delete,
}

impl ItemAction {
    /// Actions offered for a book in the given status
    pub fn available_for(status: BookStatus) -> Vec<ItemAction> {
        let mut actions = Vec::with_capacity(2);
        match status {
            BookStatus::Available => actions.push(ItemAction::Borrow),
            BookStatus::Borrowed => actions.push(ItemAction::Return),
            BookStatus::Damaged => {}
        }
        actions.push(ItemAction::Delete);
        actions
    }

    fn success_message(&self) -> &'static str {
        match self {
            ItemAction::Borrow | ItemAction::Return => "Operation succeeded",
            ItemAction::Delete => "Book deleted",
        }
    }
}

/// Asks the user to confirm a deletion
pub trait DeletePrompt: Send + Sync {
    fn confirm_delete(&self, book_id: BookId) -> bool;
}

impl<F> DeletePrompt for F
where
    F: Fn(BookId) -> bool + Send + Sync,
{
    fn confirm_delete(&self, book_id: BookId) -> bool {
        self(book_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Completed,
    /// The user declined the delete prompt
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    #[error("Another action on book {0} is still in progress")]
    Busy(BookId),
    #[error(transparent)]
    Request(#[from] RequestError),
}

struct BusyGuard<'a> {
    busy: &'a Mutex<HashSet<BookId>>,
    book_id: BookId,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.lock().remove(&self.book_id);
    }
}

/// Runs borrow, return and delete for single books, at most one action per book at a time.
/// A completed action is followed by exactly one store refresh, the mutation response itself is
/// never merged into local state.
pub struct ItemMutationController {
    store: Arc<CatalogStore>,
    delete_prompt: Arc<dyn DeletePrompt>,
    busy: Mutex<HashSet<BookId>>,
}

impl ItemMutationController {
    pub fn new(store: Arc<CatalogStore>, delete_prompt: Arc<dyn DeletePrompt>) -> Self {
        Self {
            store,
            delete_prompt,
            busy: Mutex::new(HashSet::new()),
        }
    }

    pub fn is_busy(&self, book_id: BookId) -> bool {
        self.busy.lock().contains(&book_id)
    }

    fn acquire(&self, book_id: BookId) -> Result<BusyGuard<'_>, MutationError> {
        if !self.busy.lock().insert(book_id) {
            return Err(MutationError::Busy(book_id));
        }
        Ok(BusyGuard {
            busy: &self.busy,
            book_id,
        })
    }

    pub async fn run(
        &self,
        book_id: BookId,
        action: ItemAction,
    ) -> Result<ActionOutcome, MutationError> {
        let _guard = self.acquire(book_id)?;

        if action == ItemAction::Delete && !self.delete_prompt.confirm_delete(book_id) {
            tracing::debug!("Delete of book {} cancelled", book_id);
            return Ok(ActionOutcome::Cancelled);
        }

        let client = self.store.client();
        let result = match action {
            ItemAction::Borrow => client.borrow(book_id).await.map(drop),
            ItemAction::Return => client.return_book(book_id).await.map(drop),
            ItemAction::Delete => client.delete(book_id).await,
        };
        if let Err(err) = result {
            tracing::warn!("{:?} of book {} failed {}", action, book_id, err);
            self.store.report_error(&err);
            return Err(err.into());
        }

        tracing::info!("{:?} of book {} completed", action, book_id);
        // refresh reports its own failure, the mutation itself went through
        if self.store.refresh().await.is_ok() {
            self.store.report_success(action.success_message());
        }
        Ok(ActionOutcome::Completed)
    }

    pub async fn borrow(&self, book_id: BookId) -> Result<ActionOutcome, MutationError> {
        self.run(book_id, ItemAction::Borrow).await
    }

    pub async fn return_book(&self, book_id: BookId) -> Result<ActionOutcome, MutationError> {
        self.run(book_id, ItemAction::Return).await
    }

    pub async fn delete(&self, book_id: BookId) -> Result<ActionOutcome, MutationError> {
        self.run(book_id, ItemAction::Delete).await
    }
}
