use std::time::Duration;

use anyhow::Context;
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_tracing::TracingMiddleware;
use serde::de::DeserializeOwned;

use crate::api::{ApiResponse, Book, BookDraft, BookId, BookStatus};
use crate::client::{CatalogApi, CatalogOperation, RequestError, RequestErrorKind};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Http client of the catalog service, all requests go to `{url}/api/books`
pub struct CatalogClient {
    url: String,
    client: ClientWithMiddleware,
}

impl CatalogClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        Self::with_timeout(url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn books_url(&self) -> String {
        format!("{}/api/books", self.url)
    }

    fn book_url(&self, book_id: BookId) -> String {
        format!("{}/api/books/{}", self.url, book_id)
    }

    /// Sends the request and unwraps the catalog envelope.
    /// Non 2xx statuses and `success: false` both end up as errors carrying the service message
    async fn send<T: DeserializeOwned>(
        &self,
        operation: CatalogOperation,
        request: RequestBuilder,
    ) -> Result<ApiResponse<T>, RequestError> {
        let response = request.send().await.map_err(|err| {
            let kind = match &err {
                reqwest_middleware::Error::Reqwest(err) if err.is_timeout() => {
                    RequestErrorKind::Timeout
                }
                _ => RequestErrorKind::Transport,
            };
            tracing::warn!("Catalog {} request failed {}", operation, err);
            RequestError::new(operation, kind, None)
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|err| {
            let kind = if err.is_timeout() {
                RequestErrorKind::Timeout
            } else {
                RequestErrorKind::Transport
            };
            tracing::warn!("Catalog {} response could not be read {}", operation, err);
            RequestError::new(operation, kind, None)
        })?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ApiResponse<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.message);
            let kind = match status {
                StatusCode::CONFLICT => RequestErrorKind::Conflict,
                StatusCode::NOT_FOUND => RequestErrorKind::NotFound,
                _ => RequestErrorKind::Rejected,
            };
            tracing::warn!(
                "Catalog {} rejected with status {} {:?}",
                operation,
                status,
                message
            );
            return Err(RequestError::new(operation, kind, message));
        }

        let envelope: ApiResponse<T> = serde_json::from_slice(&body).map_err(|err| {
            tracing::warn!("Catalog {} returned malformed body {}", operation, err);
            RequestError::new(operation, RequestErrorKind::InvalidResponse, None)
        })?;

        if !envelope.success {
            return Err(RequestError::new(
                operation,
                RequestErrorKind::Rejected,
                envelope.message,
            ));
        }
        Ok(envelope)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        operation: CatalogOperation,
        request: RequestBuilder,
    ) -> Result<T, RequestError> {
        self.send(operation, request).await?.data.ok_or_else(|| {
            tracing::warn!("Catalog {} response carried no data", operation);
            RequestError::new(operation, RequestErrorKind::InvalidResponse, None)
        })
    }
}

#[async_trait::async_trait]
impl CatalogApi for CatalogClient {
    /// Calls GET /api/books
    async fn list_all(&self) -> Result<Vec<Book>, RequestError> {
        self.fetch(CatalogOperation::ListAll, self.client.get(self.books_url()))
            .await
    }

    /// Calls GET /api/books/{book_id}
    async fn get_by_id(&self, book_id: BookId) -> Result<Book, RequestError> {
        self.fetch(CatalogOperation::GetById, self.client.get(self.book_url(book_id)))
            .await
    }

    /// Calls GET /api/books/search?keyword=...
    async fn search(&self, keyword: &str) -> Result<Vec<Book>, RequestError> {
        let request = self
            .client
            .get(format!("{}/search", self.books_url()))
            .query(&[("keyword", keyword)]);
        self.fetch(CatalogOperation::Search, request).await
    }

    /// Calls GET /api/books/status/{status}
    async fn list_by_status(&self, status: BookStatus) -> Result<Vec<Book>, RequestError> {
        let request = self
            .client
            .get(format!("{}/status/{}", self.books_url(), status));
        self.fetch(CatalogOperation::ListByStatus, request).await
    }

    /// Calls POST /api/books
    async fn create(&self, draft: &BookDraft) -> Result<Book, RequestError> {
        let request = self.client.post(self.books_url()).json(draft);
        self.fetch(CatalogOperation::Create, request).await
    }

    /// Calls PUT /api/books/{book_id}
    async fn update(&self, book_id: BookId, draft: &BookDraft) -> Result<Book, RequestError> {
        let request = self.client.put(self.book_url(book_id)).json(draft);
        self.fetch(CatalogOperation::Update, request).await
    }

    /// Calls DELETE /api/books/{book_id}
    async fn delete(&self, book_id: BookId) -> Result<(), RequestError> {
        self.send::<serde_json::Value>(
            CatalogOperation::Delete,
            self.client.delete(self.book_url(book_id)),
        )
        .await
        .map(|_| ())
    }

    /// Calls POST /api/books/{book_id}/borrow
    async fn borrow(&self, book_id: BookId) -> Result<Book, RequestError> {
        let request = self
            .client
            .post(format!("{}/borrow", self.book_url(book_id)));
        self.fetch(CatalogOperation::Borrow, request).await
    }

    /// Calls POST /api/books/{book_id}/return
    async fn return_book(&self, book_id: BookId) -> Result<Book, RequestError> {
        let request = self
            .client
            .post(format!("{}/return", self.book_url(book_id)));
        self.fetch(CatalogOperation::Return, request).await
    }
}
