pub mod api;
pub mod config;
pub mod error;
pub mod provider_data;
pub mod resources;
pub mod support;

use std::collections::HashMap;
use std::sync::OnceLock;

use serde_json::Value;
use tfdata::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};

pub use config::ProviderConfig;
pub use error::{FortiosError, Result};
pub use provider_data::FortiosProviderData;
pub use resources::{CmdbObject, CmdbResource, FortiResource};

use resources::{FirewallAddress, FirewallAddrgrp, RouterStatic, SwitchControllerManagedSwitch};

pub struct FortiosProvider {
    provider_data: Option<FortiosProviderData>,
}

impl Default for FortiosProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FortiosProvider {
    pub fn new() -> Self {
        Self {
            provider_data: None,
        }
    }

    /// Resolve the provider block and build the API client
    pub fn configure(&mut self, config: &Value) -> Result<()> {
        let config = ProviderConfig::resolve(config)?;

        let client = api::Client::with_config(
            &config.hostname,
            &config.token,
            config.insecure,
            config.http_proxy.as_deref(),
            config.retry.clone(),
        )
        .map_err(|e| FortiosError::Config(format!("Failed to create API client: {}", e)))?;

        tracing::info!("Configured FortiOS provider for {}", client.base_url());
        self.provider_data = Some(FortiosProviderData::new(client, config));
        Ok(())
    }

    pub fn provider_data(&self) -> Option<&FortiosProviderData> {
        self.provider_data.as_ref()
    }

    pub fn resource(&self, name: &str) -> Result<Box<dyn FortiResource>> {
        let data = self
            .provider_data
            .as_ref()
            .ok_or(FortiosError::NotConfigured)?
            .clone();

        match name {
            FirewallAddress::TYPE_NAME => Ok(Box::new(CmdbResource::<FirewallAddress>::new(data))),
            FirewallAddrgrp::TYPE_NAME => Ok(Box::new(CmdbResource::<FirewallAddrgrp>::new(data))),
            RouterStatic::TYPE_NAME => Ok(Box::new(CmdbResource::<RouterStatic>::new(data))),
            SwitchControllerManagedSwitch::TYPE_NAME => Ok(Box::new(
                CmdbResource::<SwitchControllerManagedSwitch>::new(data),
            )),
            _ => Err(FortiosError::UnknownResource(name.to_string())),
        }
    }

    pub fn resource_schemas(&self) -> &'static HashMap<String, Schema> {
        static SCHEMAS: OnceLock<HashMap<String, Schema>> = OnceLock::new();

        SCHEMAS.get_or_init(|| {
            let mut schemas = HashMap::new();
            schemas.insert(FirewallAddress::TYPE_NAME.to_string(), FirewallAddress::schema());
            schemas.insert(FirewallAddrgrp::TYPE_NAME.to_string(), FirewallAddrgrp::schema());
            schemas.insert(RouterStatic::TYPE_NAME.to_string(), RouterStatic::schema());
            schemas.insert(
                SwitchControllerManagedSwitch::TYPE_NAME.to_string(),
                SwitchControllerManagedSwitch::schema(),
            );
            schemas
        })
    }

    pub fn provider_schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("FortiOS provider")
            .attribute(
                AttributeBuilder::string("hostname")
                    .description("IP address or hostname of the FortiGate")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("token")
                    .description("REST API administrator token")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("insecure", AttributeType::Bool)
                    .description("Skip TLS certificate verification")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("vdom")
                    .description("Default virtual domain")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("import_table", AttributeType::Bool)
                    .description("Read back every subtable unless a resource sets get_all_tables")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("http_proxy")
                    .description("Proxy for API requests")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::number("max_retries")
                    .description("Retries for throttled or unavailable API calls")
                    .optional()
                    .build(),
            )
            .build()
    }
}

/// Install a fmt subscriber at `level` (a `TF_LOG` value such as `DEBUG`).
/// Does nothing when a global subscriber is already set
pub fn init_logging(level: Option<&str>) -> Result<()> {
    let level = match level.map(str::trim).filter(|l| !l.is_empty()) {
        Some(l) => l
            .parse::<tracing::Level>()
            .map_err(|_| FortiosError::Config(format!("unknown log level {:?}", l)))?,
        None => tracing::Level::INFO,
    };

    if tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .is_err()
    {
        tracing::debug!("Global subscriber already installed, keeping it");
    }
    Ok(())
}
