use std::collections::BTreeMap;
use std::fmt;

use chrono::Datelike;

use crate::api::BookDraft;

pub const MIN_PUBLISH_YEAR: i32 = 1900;

pub const TITLE: &str = "title";
pub const AUTHOR: &str = "author";
pub const ISBN: &str = "isbn";
pub const PRICE: &str = "price";
pub const PUBLISH_YEAR: &str = "publishYear";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
/// Field name to error message, empty when the draft is valid
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }

    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (_, message) in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            f.write_str(message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Validates a book draft before it is submitted for creation
pub fn validate(draft: &BookDraft) -> ValidationErrors {
    validate_for_year(draft, current_year())
}

pub fn validate_for_year(draft: &BookDraft, current_year: i32) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    if is_blank(&draft.title) {
        errors.add(TITLE, "title must not be empty");
    }
    if is_blank(&draft.author) {
        errors.add(AUTHOR, "author must not be empty");
    }
    if is_blank(&draft.isbn) {
        errors.add(ISBN, "isbn must not be empty");
    }
    // NaN fails the comparison as well
    if !draft.price.is_some_and(|price| price > 0.0) {
        errors.add(PRICE, "price must be greater than 0");
    }
    if let Some(year) = draft.publish_year {
        if !(MIN_PUBLISH_YEAR..=current_year).contains(&year) {
            errors.add(
                PUBLISH_YEAR,
                format!("publishYear must be between {MIN_PUBLISH_YEAR} and {current_year}"),
            );
        }
    }

    errors
}

/// Rules the catalog service applies to stored books, the form rules plus a mandatory publish year
pub fn validate_complete(draft: &BookDraft, current_year: i32) -> ValidationErrors {
    let mut errors = validate_for_year(draft, current_year);
    if draft.publish_year.is_none() {
        errors.add(PUBLISH_YEAR, "publishYear is required");
    }
    errors
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |value| value.trim().is_empty())
}
