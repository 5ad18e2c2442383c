use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use bookcatalog_service::client::CatalogClient;

use crate::store::{CatalogStore, SearchScope};

const ENV_PREFIX: &str = "BOOKCATALOG_CLIENT";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
/// Client side settings, read from `BOOKCATALOG_CLIENT_*` environment variables
pub struct ClientSettings {
    /// Address of the catalog service, without the `/api/books` suffix
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub search_scope: SearchScope,
}

impl ClientSettings {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(config::Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(environment: config::Environment) -> anyhow::Result<Self> {
        config::Config::builder()
            .set_default("base_url", "http://localhost:8080")?
            .set_default("request_timeout_secs", 10)?
            .set_default("search_scope", "unfiltered")?
            .add_source(environment.try_parsing(true))
            .build()
            .context("Failed to build client configuration")?
            .try_deserialize()
            .context("Failed to deserialize client configuration")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Store talking to the configured catalog service
    pub fn build_store(&self) -> anyhow::Result<Arc<CatalogStore>> {
        let client = CatalogClient::with_timeout(&self.base_url, self.request_timeout())?;
        Ok(Arc::new(
            CatalogStore::new(Arc::new(client)).with_search_scope(self.search_scope),
        ))
    }
}
