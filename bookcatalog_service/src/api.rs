use std::fmt;
use std::str::FromStr;

use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

pub type BookId = i64;

#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Apiv2Schema,
)]
#[serde(rename_all = "lowercase")]
/// Lending status of a book
pub enum BookStatus {
    #[default]
    Available,
    Borrowed,
    /// Set manually through an update, never reached by borrow or return
    Damaged,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "available",
            BookStatus::Borrowed => "borrowed",
            BookStatus::Damaged => "damaged",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown book status '{0}'")]
pub struct UnknownBookStatus(pub String);

impl FromStr for BookStatus {
    type Err = UnknownBookStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "available" => Ok(BookStatus::Available),
            "borrowed" => Ok(BookStatus::Borrowed),
            "damaged" => Ok(BookStatus::Damaged),
            other => Err(UnknownBookStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Status changes reachable through the lending endpoints
pub enum StatusTransition {
    Borrow,
    Return,
}

impl StatusTransition {
    /// Returns the status after the transition, or None when it is not allowed from `from`
    pub fn apply(self, from: BookStatus) -> Option<BookStatus> {
        match (self, from) {
            (StatusTransition::Borrow, BookStatus::Available) => Some(BookStatus::Borrowed),
            (StatusTransition::Return, BookStatus::Borrowed) => Some(BookStatus::Available),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusTransition::Borrow => "borrow",
            StatusTransition::Return => "return",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            StatusTransition::Borrow => "borrowed",
            StatusTransition::Return => "returned",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
/// A book as stored by the catalog service
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub publish_year: i32,
    pub isbn: String,
    pub price: f64,
    #[serde(default)]
    pub status: BookStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
/// Book payload without an id. Used whole for creation and as a merge patch for updates,
/// absent fields are left out of the json
pub struct BookDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
}

impl BookDraft {
    /// Initial state of the "add book" form
    pub fn blank_form(current_year: i32) -> Self {
        Self {
            title: Some(String::new()),
            author: Some(String::new()),
            description: Some(String::new()),
            publish_year: Some(current_year),
            isbn: Some(String::new()),
            price: None,
            status: Some(BookStatus::Available),
            cover_url: None,
        }
    }
}

impl From<&Book> for BookDraft {
    fn from(book: &Book) -> Self {
        Self {
            title: Some(book.title.clone()),
            author: Some(book.author.clone()),
            description: book.description.clone(),
            publish_year: Some(book.publish_year),
            isbn: Some(book.isbn.clone()),
            price: Some(book.price),
            status: Some(book.status),
            cover_url: book.cover_url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct SearchQuery {
    pub keyword: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Envelope wrapping every response of the catalog service
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl<T> ApiResponse<T> {
    pub fn with_data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            total: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T> ApiResponse<Vec<T>> {
    pub fn with_list(data: Vec<T>) -> Self {
        Self {
            total: Some(data.len()),
            ..Self::with_data(data)
        }
    }
}

impl ApiResponse<()> {
    pub fn confirmation(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            total: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            total: None,
        }
    }
}
