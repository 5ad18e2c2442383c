use std::sync::Arc;

use itertools::Itertools;
use parking_lot::RwLock;
use serde::Deserialize;

use bookcatalog_service::api::{Book, BookId, BookStatus};
use bookcatalog_service::client::{CatalogApi, RequestError};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
/// Status filter offered by the catalog view
pub enum StatusFilter {
    #[default]
    All,
    Available,
    Borrowed,
}

impl StatusFilter {
    pub fn matches(&self, book: &Book) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Available => book.status == BookStatus::Available,
            StatusFilter::Borrowed => book.status == BookStatus::Borrowed,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Whether search results are narrowed by the active status filter
pub enum SearchScope {
    /// Search results are shown as returned by the service
    #[default]
    Unfiltered,
    WithinStatusFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Transient message shown to the user until dismissed or replaced
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatusCounts {
    pub all: usize,
    pub available: usize,
    pub borrowed: usize,
}

#[derive(Default)]
struct CatalogState {
    full_collection: Vec<Book>,
    view: Vec<Book>,
    active_filter: StatusFilter,
    active_search_term: Option<String>,
    notice: Option<Notice>,
}

impl CatalogState {
    fn filtered_collection(&self) -> Vec<Book> {
        self.full_collection
            .iter()
            .filter(|book| self.active_filter.matches(book))
            .cloned()
            .collect()
    }
}

/// Client side copy of the catalog.
///
/// `full_collection` is the result of the last successful [`CatalogStore::refresh`], `view` is what
/// is displayed: the collection under the active filter or the result of the active search.
/// The state lock is never held across a network call, so the store can be shared behind an `Arc`.
pub struct CatalogStore {
    client: Arc<dyn CatalogApi>,
    search_scope: SearchScope,
    state: RwLock<CatalogState>,
}

impl CatalogStore {
    pub fn new(client: Arc<dyn CatalogApi>) -> Self {
        Self {
            client,
            search_scope: SearchScope::default(),
            state: RwLock::new(CatalogState::default()),
        }
    }

    pub fn with_search_scope(mut self, search_scope: SearchScope) -> Self {
        self.search_scope = search_scope;
        self
    }

    pub fn client(&self) -> &Arc<dyn CatalogApi> {
        &self.client
    }

    /// Fetches the whole catalog. On success the search term is cleared and the view is rebuilt
    /// from the active filter, on failure the previous state stays and an error notice is set.
    pub async fn refresh(&self) -> Result<(), RequestError> {
        match self.client.list_all().await {
            Ok(books) => {
                tracing::debug!("Catalog refreshed with {} books", books.len());
                let mut state = self.state.write();
                state.full_collection = books;
                state.active_search_term = None;
                state.view = state.filtered_collection();
                Ok(())
            }
            Err(err) => {
                tracing::warn!("Catalog refresh failed {}", err);
                self.report_error(&err);
                Err(err)
            }
        }
    }

    /// Blank terms restore the filtered collection without a network call
    pub async fn apply_search(&self, term: &str) -> Result<(), RequestError> {
        let term = term.trim();
        if term.is_empty() {
            let mut state = self.state.write();
            state.active_search_term = None;
            state.view = state.filtered_collection();
            return Ok(());
        }

        match self.client.search(term).await {
            Ok(books) => {
                tracing::debug!("Search for '{}' returned {} books", term, books.len());
                let mut state = self.state.write();
                let filter = state.active_filter;
                state.view = match self.search_scope {
                    SearchScope::Unfiltered => books,
                    SearchScope::WithinStatusFilter => {
                        books.into_iter().filter(|book| filter.matches(book)).collect()
                    }
                };
                state.active_search_term = Some(term.to_string());
                Ok(())
            }
            Err(err) => {
                tracing::warn!("Search for '{}' failed {}", term, err);
                self.report_error(&err);
                Err(err)
            }
        }
    }

    pub fn apply_status_filter(&self, filter: StatusFilter) {
        let mut state = self.state.write();
        state.active_filter = filter;
        state.active_search_term = None;
        state.view = state.filtered_collection();
    }

    pub fn view(&self) -> Vec<Book> {
        self.state.read().view.clone()
    }

    pub fn full_collection(&self) -> Vec<Book> {
        self.state.read().full_collection.clone()
    }

    pub fn book(&self, book_id: BookId) -> Option<Book> {
        self.state
            .read()
            .full_collection
            .iter()
            .find(|book| book.id == book_id)
            .cloned()
    }

    pub fn active_filter(&self) -> StatusFilter {
        self.state.read().active_filter
    }

    pub fn active_search_term(&self) -> Option<String> {
        self.state.read().active_search_term.clone()
    }

    /// Number of books per filter, counted over the full collection
    pub fn status_counts(&self) -> StatusCounts {
        let state = self.state.read();
        let by_status = state.full_collection.iter().counts_by(|book| book.status);
        StatusCounts {
            all: state.full_collection.len(),
            available: by_status.get(&BookStatus::Available).copied().unwrap_or_default(),
            borrowed: by_status.get(&BookStatus::Borrowed).copied().unwrap_or_default(),
        }
    }

    pub fn notice(&self) -> Option<Notice> {
        self.state.read().notice.clone()
    }

    pub fn dismiss_notice(&self) {
        self.state.write().notice = None;
    }

    pub fn report_error(&self, err: &RequestError) {
        self.state.write().notice = Some(Notice {
            kind: NoticeKind::Error,
            message: err.message.clone(),
        });
    }

    pub fn report_success(&self, message: impl Into<String>) {
        self.state.write().notice = Some(Notice {
            kind: NoticeKind::Success,
            message: message.into(),
        });
    }
}
