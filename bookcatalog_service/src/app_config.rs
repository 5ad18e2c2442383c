use paperclip::actix::web;

use crate::handlers;

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(
            // fixed paths go before /{book_id} so they are not taken for ids
            web::scope("/api/books")
                .service(
                    web::resource("")
                        .route(web::get().to(handlers::get_all_books))
                        .route(web::post().to(handlers::add_book)),
                )
                .service(
                    web::resource("/")
                        .route(web::get().to(handlers::get_all_books))
                        .route(web::post().to(handlers::add_book)),
                )
                .service(web::resource("/search").route(web::get().to(handlers::search_books)))
                .service(
                    web::resource("/status/{status}")
                        .route(web::get().to(handlers::get_books_by_status)),
                )
                .service(
                    web::resource("/{book_id}")
                        .route(web::get().to(handlers::get_book))
                        .route(web::put().to(handlers::update_book))
                        .route(web::delete().to(handlers::delete_book)),
                )
                .service(
                    web::resource("/{book_id}/borrow").route(web::post().to(handlers::borrow_book)),
                )
                .service(
                    web::resource("/{book_id}/return").route(web::post().to(handlers::return_book)),
                ),
        );
}
