use std::sync::Arc;

use actix_web::http::header::LOCATION;
use actix_web::web::Data;
use actix_web::{Error, HttpResponse};
use paperclip::actix::{
    api_v2_operation,
    web::{self},
};

use crate::api::{ApiResponse, BookDraft, BookId, BookStatus, SearchQuery, StatusTransition};
use crate::books_repository::{BooksRepository, BooksRepositoryError};

/// Maps repository failures to the error envelope with a matching status code
fn error_response(operation: &str, err: BooksRepositoryError) -> HttpResponse {
    let body = ApiResponse::failure(err.to_string());
    match &err {
        BooksRepositoryError::NotFound(_) => HttpResponse::NotFound().json(body),
        BooksRepositoryError::InvalidBook(_) => HttpResponse::BadRequest().json(body),
        BooksRepositoryError::DuplicateIsbn(_)
        | BooksRepositoryError::IllegalTransition { .. }
        | BooksRepositoryError::IllegalInitialStatus(_) => HttpResponse::Conflict().json(body),
        BooksRepositoryError::DeserializationError(_) => {
            tracing::error!("{} failed {}", operation, err);
            HttpResponse::InternalServerError().json(body)
        }
    }
}

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

#[api_v2_operation]
pub async fn get_all_books(
    books_repository: Data<Arc<dyn BooksRepository>>,
) -> Result<HttpResponse, Error> {
    Ok(match books_repository.list_books().await {
        Ok(books) => HttpResponse::Ok().json(ApiResponse::with_list(books)),
        Err(err) => error_response("Get all books", err),
    })
}

#[api_v2_operation]
pub async fn search_books(
    books_repository: Data<Arc<dyn BooksRepository>>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, Error> {
    Ok(match books_repository.search_books(&query.keyword).await {
        Ok(books) => HttpResponse::Ok().json(ApiResponse::with_list(books)),
        Err(err) => error_response("Search books", err),
    })
}

#[api_v2_operation]
pub async fn get_books_by_status(
    books_repository: Data<Arc<dyn BooksRepository>>,
    status: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let status: BookStatus = match status.parse() {
        Ok(status) => status,
        Err(err) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::failure(err.to_string())))
        }
    };
    Ok(match books_repository.list_books_by_status(status).await {
        Ok(books) => HttpResponse::Ok().json(ApiResponse::with_list(books)),
        Err(err) => error_response("Get books by status", err),
    })
}

#[api_v2_operation]
pub async fn add_book(
    books_repository: Data<Arc<dyn BooksRepository>>,
    draft: web::Json<BookDraft>,
) -> Result<HttpResponse, Error> {
    Ok(match books_repository.add_book(draft.into_inner()).await {
        Ok(book) => {
            tracing::info!("Added book {}", book.id);
            HttpResponse::Created()
                .append_header((LOCATION, format!("/api/books/{}", book.id)))
                .json(ApiResponse::with_data(book).with_message("Book created"))
        }
        Err(err) => error_response("Add book", err),
    })
}

#[api_v2_operation]
pub async fn get_book(
    books_repository: Data<Arc<dyn BooksRepository>>,
    book_id: web::Path<BookId>,
) -> Result<HttpResponse, Error> {
    Ok(match books_repository.get_book(book_id.into_inner()).await {
        Ok(book) => HttpResponse::Ok().json(ApiResponse::with_data(book)),
        Err(err) => error_response("Get book", err),
    })
}

#[api_v2_operation]
pub async fn update_book(
    books_repository: Data<Arc<dyn BooksRepository>>,
    book_id: web::Path<BookId>,
    draft: web::Json<BookDraft>,
) -> Result<HttpResponse, Error> {
    Ok(
        match books_repository
            .update_book(book_id.into_inner(), draft.into_inner())
            .await
        {
            Ok(book) => {
                HttpResponse::Ok().json(ApiResponse::with_data(book).with_message("Book updated"))
            }
            Err(err) => error_response("Update book", err),
        },
    )
}

#[api_v2_operation]
pub async fn delete_book(
    books_repository: Data<Arc<dyn BooksRepository>>,
    book_id: web::Path<BookId>,
) -> Result<HttpResponse, Error> {
    let book_id = book_id.into_inner();
    Ok(match books_repository.delete_book(book_id).await {
        Ok(()) => {
            tracing::info!("Deleted book {}", book_id);
            HttpResponse::Ok().json(ApiResponse::confirmation("Book deleted"))
        }
        Err(err) => error_response("Delete book", err),
    })
}

async fn change_status(
    books_repository: &dyn BooksRepository,
    book_id: BookId,
    transition: StatusTransition,
    confirmation: &str,
) -> HttpResponse {
    match books_repository.change_status(book_id, transition).await {
        Ok(book) => {
            tracing::info!("Book {} {}", book_id, transition.past_tense());
            HttpResponse::Ok().json(ApiResponse::with_data(book).with_message(confirmation))
        }
        Err(err) => error_response(transition.as_str(), err),
    }
}

#[api_v2_operation]
pub async fn borrow_book(
    books_repository: Data<Arc<dyn BooksRepository>>,
    book_id: web::Path<BookId>,
) -> Result<HttpResponse, Error> {
    Ok(change_status(
        books_repository.get_ref().as_ref(),
        book_id.into_inner(),
        StatusTransition::Borrow,
        "Book borrowed",
    )
    .await)
}

#[api_v2_operation]
pub async fn return_book(
    books_repository: Data<Arc<dyn BooksRepository>>,
    book_id: web::Path<BookId>,
) -> Result<HttpResponse, Error> {
    Ok(change_status(
        books_repository.get_ref().as_ref(),
        book_id.into_inner(),
        StatusTransition::Return,
        "Book returned",
    )
    .await)
}
