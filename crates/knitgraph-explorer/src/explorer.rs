//! Recursive class exploration
//!
//! Starting from one class, fetch its metadata, add its parent, its
//! references and (near the root) its subclasses, then recurse into the
//! references and subclasses. Branches run concurrently under a shared
//! [`ExplorationState`]; the result is handed back as one graph for the
//! caller to swap in.

use crate::config::ExplorerConfig;
use crate::error::{ExploreError, ProviderError, Result};
use crate::provider::ClassInfoProvider;
use crate::record::ClassRecord;
use futures_util::future::{BoxFuture, FutureExt, join_all};
use knitgraph_core::{EdgeKind, Graph, GraphEdge, GraphNode, NodeId};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, info, warn};

/// Memoization set plus the graph under construction.
///
/// Only ever touched under the crawl mutex, so a visited check and the
/// matching insert are one step.
#[derive(Debug, Clone, Default)]
pub struct ExplorationState {
    pub visited: HashSet<NodeId>,
    pub graph: Graph,
}

/// Tells a crawl whether a newer one has started.
#[derive(Debug, Clone)]
pub struct CrawlGuard {
    counter: Arc<AtomicU64>,
    generation: u64,
}

impl CrawlGuard {
    pub fn new(counter: Arc<AtomicU64>, generation: u64) -> Self {
        Self {
            counter,
            generation,
        }
    }

    /// A guard nothing can supersede.
    pub fn detached() -> Self {
        Self::new(Arc::new(AtomicU64::new(0)), 0)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_stale(&self) -> bool {
        self.counter.load(Ordering::SeqCst) != self.generation
    }
}

/// What a finished crawl produced.
#[derive(Debug, Clone)]
pub struct ExploreOutcome {
    pub root: NodeId,
    pub graph: Graph,
    pub visited: HashSet<NodeId>,
}

pub struct ClassExplorer {
    provider: Arc<dyn ClassInfoProvider>,
    config: ExplorerConfig,
    timeout: Duration,
}

impl ClassExplorer {
    pub fn new(
        provider: Arc<dyn ClassInfoProvider>,
        config: ExplorerConfig,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            config,
            timeout,
        }
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Crawl outward from `name`, growing a copy of `seed`.
    ///
    /// Every call starts with an empty visited set, so no class is fetched
    /// twice within one crawl but a later crawl fetches afresh. Only a
    /// failure to fetch `name` itself is an error; every other fetch
    /// failure drops that branch.
    pub async fn explore(
        &self,
        name: &str,
        seed: &Graph,
        guard: CrawlGuard,
    ) -> Result<ExploreOutcome> {
        let root = validate_class_name(name)?;

        let mut state = ExplorationState {
            visited: HashSet::new(),
            graph: seed.clone(),
        };
        state.visited.insert(root.clone());

        let crawl = Arc::new(Crawl {
            provider: Arc::clone(&self.provider),
            config: self.config.clone(),
            sentinel: NodeId::from_external(&self.config.root_sentinel),
            timeout: self.timeout,
            state: Mutex::new(state),
            permits: Semaphore::new(self.config.concurrency.max(1)),
            guard,
        });

        let record = match crawl.fetch_info(&root).await {
            Ok(Some(record)) => record,
            Ok(None) => return Err(ExploreError::RootNotFound(root.to_external())),
            Err(source) => {
                return Err(ExploreError::RootFetch {
                    name: root.to_external(),
                    source,
                });
            }
        };

        crawl.expand(root.clone(), record, 0).await;

        if crawl.guard.is_stale() {
            debug!(
                "Crawl from {} superseded (generation {})",
                root,
                crawl.guard.generation()
            );
            return Err(ExploreError::Aborted);
        }

        let state = std::mem::take(&mut *crawl.state.lock().await);
        info!(
            "Explored {}: {} nodes, {} edges, {} classes visited",
            root,
            state.graph.node_count(),
            state.graph.edge_count(),
            state.visited.len()
        );
        Ok(ExploreOutcome {
            root,
            graph: state.graph,
            visited: state.visited,
        })
    }
}

/// Reject blank names before anything is fetched.
pub fn validate_class_name(name: &str) -> Result<NodeId> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ExploreError::InvalidInput(name.to_string()));
    }
    Ok(NodeId::from_external(trimmed))
}

/// Run one provider call under `timeout`.
pub async fn fetch_with_timeout<T>(
    timeout: Duration,
    what: &str,
    fetch: impl Future<Output = std::result::Result<T, ProviderError>>,
) -> std::result::Result<T, ProviderError> {
    match tokio::time::timeout(timeout, fetch).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout {
            name: what.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        }),
    }
}

struct Crawl {
    provider: Arc<dyn ClassInfoProvider>,
    config: ExplorerConfig,
    sentinel: NodeId,
    timeout: Duration,
    state: Mutex<ExplorationState>,
    permits: Semaphore,
    guard: CrawlGuard,
}

impl Crawl {
    fn visit(self: Arc<Self>, id: NodeId, depth: usize) -> BoxFuture<'static, ()> {
        async move {
            if depth > self.config.max_depth {
                debug!("Depth cap reached at {} (depth {})", id, depth);
                return;
            }
            if self.guard.is_stale() {
                return;
            }
            if !self.state.lock().await.visited.insert(id.clone()) {
                return;
            }

            match self.fetch_info(&id).await {
                Ok(Some(record)) => self.expand(id, record, depth).await,
                Ok(None) => debug!("No class info for {}", id),
                Err(err) => warn!("Skipping {}: {}", id, err),
            }
        }
        .boxed()
    }

    /// Record everything `record` says about `id`, then recurse.
    async fn expand(self: &Arc<Self>, id: NodeId, record: ClassRecord, depth: usize) {
        let mut next = Vec::new();
        {
            let mut state = self.state.lock().await;
            let graph = &mut state.graph;
            graph.add_node(record.to_node(id.clone()));

            if let Some(parent) = record.parent_id() {
                if parent != id && parent != self.sentinel {
                    graph.add_node(GraphNode::class(parent.clone()));
                    graph.add_edge(GraphEdge::new(id.clone(), parent, EdgeKind::Extends));
                }
            }

            for (reference, kind) in record.relations() {
                let Some(target) = reference.node_id() else {
                    continue;
                };
                if target == id {
                    continue;
                }
                graph.add_node(reference.to_node(target.clone()));
                graph.add_edge(GraphEdge::new(id.clone(), target.clone(), kind));
                next.push(target);
            }
        }

        if depth < self.config.child_depth && !self.guard.is_stale() {
            match self.fetch_children(&id).await {
                Ok(children) => {
                    let mut state = self.state.lock().await;
                    for child in children {
                        let Some(child_id) = child.node_id() else {
                            continue;
                        };
                        if child_id == id {
                            continue;
                        }
                        state.graph.add_node(child.to_node(child_id.clone()));
                        state.graph.add_edge(GraphEdge::new(
                            child_id.clone(),
                            id.clone(),
                            EdgeKind::Extends,
                        ));
                        next.push(child_id);
                    }
                }
                Err(err) => warn!("Skipping child classes of {}: {}", id, err),
            }
        }

        join_all(
            next.into_iter()
                .map(|target| Arc::clone(self).visit(target, depth + 1)),
        )
        .await;
    }

    async fn fetch_info(
        &self,
        id: &NodeId,
    ) -> std::result::Result<Option<ClassRecord>, ProviderError> {
        let _permit = self.permits.acquire().await.ok();
        let name = id.to_external();
        debug!("Fetching class info for {}", name);
        fetch_with_timeout(self.timeout, &name, self.provider.get_class_info(&name)).await
    }

    async fn fetch_children(
        &self,
        id: &NodeId,
    ) -> std::result::Result<Vec<ClassRecord>, ProviderError> {
        let _permit = self.permits.acquire().await.ok();
        let name = id.to_external();
        debug!("Fetching child classes of {}", name);
        fetch_with_timeout(self.timeout, &name, self.provider.get_child_classes(&name)).await
    }
}
