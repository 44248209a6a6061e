//! Class metadata provider implementations

pub mod catalog;
pub mod http;

pub use catalog::{Catalog, StaticProvider};
pub use http::HttpProvider;

use crate::config::{ProviderConfig, ProviderKind};
use crate::error::ProviderError;
use crate::provider::ClassInfoProvider;
use std::sync::Arc;

/// Factory function to create class metadata providers
pub fn create_provider(
    config: &ProviderConfig,
) -> Result<Arc<dyn ClassInfoProvider>, ProviderError> {
    match config.kind {
        ProviderKind::Http => Ok(Arc::new(HttpProvider::new(&config.base_url)?)),
        ProviderKind::Static => {
            let path = config.catalog.as_deref().ok_or_else(|| {
                ProviderError::Config("static provider needs a catalog file".into())
            })?;
            Ok(Arc::new(StaticProvider::from_file(path)?))
        }
    }
}

/// Create a provider from a kind name, as given on the command line.
pub fn create_provider_by_name(
    kind: &str,
    config: &ProviderConfig,
) -> Result<Arc<dyn ClassInfoProvider>, ProviderError> {
    let kind = kind
        .parse::<ProviderKind>()
        .map_err(|_| ProviderError::UnknownKind(kind.to_string()))?;
    create_provider(&ProviderConfig {
        kind,
        ..config.clone()
    })
}
