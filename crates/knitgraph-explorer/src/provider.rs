//! Class metadata provider abstraction

use crate::error::ProviderError;
use crate::record::{BaseClasses, ClassRecord};

/// Source of class metadata. Names passed in are in dotted form.
#[async_trait::async_trait]
pub trait ClassInfoProvider: Send + Sync {
    /// Top-level classes used to seed a project analysis
    async fn get_base_classes(&self) -> Result<BaseClasses, ProviderError>;

    /// Metadata for one class; `Ok(None)` when the provider does not know it
    async fn get_class_info(&self, name: &str) -> Result<Option<ClassRecord>, ProviderError>;

    /// Direct subclasses of `name`
    async fn get_child_classes(&self, name: &str) -> Result<Vec<ClassRecord>, ProviderError>;

    /// Get provider name
    fn name(&self) -> &str;
}
