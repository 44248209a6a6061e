//! Class exploration for Knitgraph
//!
//! This crate talks to a class metadata provider, crawls class
//! hierarchies into the component graph, and keeps the interactive
//! session state (current graph, focus, undo) that the CLI and the
//! server drive.

pub mod config;
pub mod error;
pub mod explorer;
pub mod provider;
pub mod providers;
pub mod record;
pub mod session;
pub mod transform;


pub use config::{
    ConfigError, ExplorerConfig, KnitConfig, ProviderConfig, ProviderKind, ServerSettings,
};
pub use error::{ExploreError, ProviderError};
pub use explorer::{ClassExplorer, CrawlGuard, ExplorationState, ExploreOutcome};
pub use provider::ClassInfoProvider;
pub use providers::{Catalog, HttpProvider, StaticProvider, create_provider};
pub use record::{BaseClasses, ClassRecord, ClassRef};
pub use session::{Session, ViewState};
pub use transform::transform_base_classes;
