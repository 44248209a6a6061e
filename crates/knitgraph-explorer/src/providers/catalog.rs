//! In-memory provider backed by a JSON catalog
//!
//! Used offline and in tests. Child classes are derived from the
//! `parent_class` of every catalog record.

use crate::error::ProviderError;
use crate::provider::ClassInfoProvider;
use crate::record::{BaseClasses, ClassRecord};
use knitgraph_core::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

/// On-disk catalog format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub base_classes: BaseClasses,
    #[serde(default)]
    pub classes: Vec<ClassRecord>,
}

pub struct StaticProvider {
    base_classes: BaseClasses,
    classes: HashMap<NodeId, ClassRecord>,
    children: HashMap<NodeId, Vec<ClassRecord>>,
    failing: HashSet<NodeId>,
    latency: Option<Duration>,
    info_fetches: AtomicUsize,
    child_fetches: AtomicUsize,
    fetch_log: Mutex<Vec<String>>,
}

impl StaticProvider {
    pub fn new(catalog: Catalog) -> Self {
        let mut classes = HashMap::new();
        let mut children: HashMap<NodeId, Vec<ClassRecord>> = HashMap::new();

        for record in catalog.classes {
            let Some(id) = record.node_id() else {
                continue;
            };
            if let Some(parent) = record.parent_id() {
                if parent != id {
                    children.entry(parent).or_default().push(record.clone());
                }
            }
            classes.insert(id, record);
        }

        Self {
            base_classes: catalog.base_classes,
            classes,
            children,
            failing: HashSet::new(),
            latency: None,
            info_fetches: AtomicUsize::new(0),
            child_fetches: AtomicUsize::new(0),
            fetch_log: Mutex::new(Vec::new()),
        }
    }

    pub fn from_records(records: Vec<ClassRecord>) -> Self {
        Self::new(Catalog {
            base_classes: BaseClasses::default(),
            classes: records,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, ProviderError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        Ok(Self::new(catalog))
    }

    pub fn from_file(path: &Path) -> Result<Self, ProviderError> {
        let json = std::fs::read_to_string(path)?;
        let provider = Self::from_json(&json)?;
        debug!(
            "Loaded class catalog {} ({} classes)",
            path.display(),
            provider.classes.len()
        );
        Ok(provider)
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make class-info lookups for `name` fail.
    pub fn with_failure(mut self, name: &str) -> Self {
        self.failing.insert(NodeId::from_external(name));
        self
    }

    /// Number of class-info lookups served so far.
    pub fn info_fetch_count(&self) -> usize {
        self.info_fetches.load(Ordering::SeqCst)
    }

    pub fn child_fetch_count(&self) -> usize {
        self.child_fetches.load(Ordering::SeqCst)
    }

    /// Dotted names passed to class-info lookups, in call order.
    pub fn fetched_classes(&self) -> Vec<String> {
        self.fetch_log
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait::async_trait]
impl ClassInfoProvider for StaticProvider {
    async fn get_base_classes(&self) -> Result<BaseClasses, ProviderError> {
        self.simulate_latency().await;
        Ok(self.base_classes.clone())
    }

    async fn get_class_info(&self, name: &str) -> Result<Option<ClassRecord>, ProviderError> {
        self.info_fetches.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut log) = self.fetch_log.lock() {
            log.push(name.to_string());
        }
        self.simulate_latency().await;

        let id = NodeId::from_external(name);
        if self.failing.contains(&id) {
            return Err(ProviderError::Status {
                status: 500,
                url: format!("static://class-info/{name}"),
            });
        }
        Ok(self.classes.get(&id).cloned())
    }

    async fn get_child_classes(&self, name: &str) -> Result<Vec<ClassRecord>, ProviderError> {
        self.child_fetches.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        Ok(self
            .children
            .get(&NodeId::from_external(name))
            .cloned()
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "Static catalog"
    }
}
