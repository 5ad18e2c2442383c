//! End to end tests against a running catalog service, enabled with the `system_tests` and
//! `load_tests` features. The service address is read from `BOOKCATALOG_URL`.

/// Address of the catalog service under test
pub fn catalog_url() -> String {
    std::env::var("BOOKCATALOG_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string())
}
