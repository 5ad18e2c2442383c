use std::sync::Arc;

use actix_web::{App, HttpServer};
use paperclip::actix::{web, OpenApiExt};
use tracing_actix_web::TracingLogger;

use bookcatalog_service::app_config::config_app;
use bookcatalog_service::books_repository::{BooksRepository, InMemoryBooksRepository};
use bookcatalog_service::settings::ServerSettings;
use bookcatalog_service::telemetry::init_telemetry;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let settings = ServerSettings::load()?;
    init_telemetry("bookcatalog_service", settings.jaeger_enabled)?;
    tracing::info!(
        "starting HTTP server at http://{}:{}",
        settings.host,
        settings.port
    );

    let books_repository: Arc<dyn BooksRepository> = Arc::new(InMemoryBooksRepository::default());

    HttpServer::new(move || {
        App::new()
            .wrap_api()
            .app_data(web::Data::new(books_repository.clone()))
            .wrap(TracingLogger::default())
            .configure(config_app)
            .with_json_spec_at("/apispec/v2")
            .build()
    })
    .bind((settings.host.as_str(), settings.port))?
    .run()
    .await?;
    Ok(())
}
