use anyhow::Context;
use serde::Deserialize;

const ENV_PREFIX: &str = "BOOKCATALOG";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
/// Settings of the catalog service binary, read from `BOOKCATALOG_*` environment variables
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Exports spans to a jaeger agent when set
    pub jaeger_enabled: bool,
}

impl ServerSettings {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(config::Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(environment: config::Environment) -> anyhow::Result<Self> {
        config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8080)?
            .set_default("jaeger_enabled", false)?
            .add_source(environment.try_parsing(true))
            .build()
            .context("Failed to build server configuration")?
            .try_deserialize()
            .context("Failed to deserialize server configuration")
    }
}
