//! An interactive exploration session
//!
//! Owns the current graph together with its focus and undo state. Crawls
//! and analysis runs are numbered; starting a new one makes any older one
//! stale, and a stale result is dropped instead of committed.

use crate::config::KnitConfig;
use crate::error::{ExploreError, Result};
use crate::explorer::{ClassExplorer, CrawlGuard, fetch_with_timeout, validate_class_name};
use crate::provider::ClassInfoProvider;
use crate::transform::transform_base_classes;
use knitgraph_core::{
    Analysis, AnalysisOptions, FocusNavigator, Graph, GraphData, GraphNode, Issue, LevelMap,
    NodeId, Statistics, export_graph,
};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info};

/// Everything the presentation layer draws.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    /// Visible nodes and every edge of the current graph
    pub graph: GraphData,
    pub statistics: Statistics,
    pub issues: Vec<Issue>,
    pub focused_node: Option<NodeId>,
    pub can_go_back: bool,
    pub levels: LevelMap,
}

impl ViewState {
    pub fn from_navigator(navigator: &FocusNavigator, options: &AnalysisOptions) -> Self {
        let graph = navigator.current();
        let focus_active = navigator.is_focused();
        let analysis = Analysis::run(graph, focus_active, options);

        let mut data = graph.to_data();
        let visible: HashSet<&NodeId> = graph
            .visible_nodes(focus_active)
            .into_iter()
            .map(|node| &node.id)
            .collect();
        data.nodes.retain(|node| visible.contains(&node.id));

        ViewState {
            graph: data,
            statistics: analysis.statistics,
            issues: analysis.issues,
            focused_node: navigator.focused_node().cloned(),
            can_go_back: navigator.can_go_back(),
            levels: analysis.levels,
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    navigator: FocusNavigator,
}

pub struct Session {
    provider: Arc<dyn ClassInfoProvider>,
    explorer: ClassExplorer,
    config: KnitConfig,
    state: RwLock<SessionState>,
    generation: Arc<AtomicU64>,
    changes: broadcast::Sender<ViewState>,
}

impl Session {
    pub fn new(provider: Arc<dyn ClassInfoProvider>, config: KnitConfig) -> Self {
        let explorer = ClassExplorer::new(
            Arc::clone(&provider),
            config.explorer.clone(),
            config.provider.timeout(),
        );
        let (changes, _) = broadcast::channel(100);
        Self {
            provider,
            explorer,
            config,
            state: RwLock::new(SessionState::default()),
            generation: Arc::new(AtomicU64::new(0)),
            changes,
        }
    }

    pub fn config(&self) -> &KnitConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Receive a fresh [`ViewState`] after every change.
    pub fn subscribe(&self) -> broadcast::Receiver<ViewState> {
        self.changes.subscribe()
    }

    pub async fn view(&self) -> ViewState {
        let state = self.state.read().await;
        ViewState::from_navigator(&state.navigator, &self.config.analysis)
    }

    pub async fn current_graph(&self) -> Arc<Graph> {
        Arc::clone(self.state.read().await.navigator.current())
    }

    pub async fn export_json(&self) -> Result<String> {
        let graph = self.current_graph().await;
        Ok(export_graph(&graph)?)
    }

    pub async fn search(&self, term: &str) -> Vec<GraphNode> {
        let graph = self.current_graph().await;
        graph.search_nodes(term).into_iter().cloned().collect()
    }

    /// Replace the session graph, e.g. with an imported one. Supersedes
    /// any running crawl and forgets focus and undo.
    pub async fn load_graph(&self, graph: Graph) -> ViewState {
        self.begin_crawl();
        let view = {
            let mut state = self.state.write().await;
            state.navigator.reset(graph);
            self.view_of(&state)
        };
        self.publish(&view);
        view
    }

    /// Fetch the base classes and rebuild the graph from them.
    ///
    /// Returns `Ok(None)` when a newer request superseded this one.
    pub async fn analyze_project(&self) -> Result<Option<ViewState>> {
        let guard = self.begin_crawl();
        let base = fetch_with_timeout(
            self.config.provider.timeout(),
            "base classes",
            self.provider.get_base_classes(),
        )
        .await
        .map_err(ExploreError::BaseClasses)?;
        let graph = transform_base_classes(&base);

        let view = {
            let mut state = self.state.write().await;
            if guard.is_stale() {
                debug!("Discarding superseded analysis (generation {})", guard.generation());
                return Ok(None);
            }
            state.navigator.reset(graph);
            info!(
                "Project analysis committed: {} nodes, {} edges",
                state.navigator.current().node_count(),
                state.navigator.current().edge_count()
            );
            self.view_of(&state)
        };
        self.publish(&view);
        Ok(Some(view))
    }

    /// Explore outward from `name` and merge the result into the current
    /// graph in one swap.
    ///
    /// Returns `Ok(None)` when superseded, either by a newer crawl or by
    /// a focus change made while this one was fetching.
    pub async fn explore(&self, name: &str) -> Result<Option<ViewState>> {
        validate_class_name(name)?;
        let guard = self.begin_crawl();

        let seed = Arc::clone(self.state.read().await.navigator.current());

        let outcome = match self.explorer.explore(name, &seed, guard.clone()).await {
            Ok(outcome) => outcome,
            Err(ExploreError::Aborted) => return Ok(None),
            Err(err) if guard.is_stale() => {
                debug!("Ignoring failure of superseded crawl: {}", err);
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        let view = {
            let mut state = self.state.write().await;
            if guard.is_stale() {
                debug!(
                    "Discarding superseded crawl from {} (generation {})",
                    outcome.root,
                    guard.generation()
                );
                return Ok(None);
            }
            if !Arc::ptr_eq(&seed, state.navigator.current()) {
                debug!(
                    "Discarding crawl from {}: the view changed while it ran",
                    outcome.root
                );
                return Ok(None);
            }
            state.navigator.replace_current(outcome.graph);
            info!(
                "Exploration of {} committed: {} nodes, {} edges",
                outcome.root,
                state.navigator.current().node_count(),
                state.navigator.current().edge_count()
            );
            self.view_of(&state)
        };
        self.publish(&view);
        Ok(Some(view))
    }

    /// Focus on a node's one-hop neighbourhood.
    pub async fn focus(&self, id: &str) -> Result<ViewState> {
        let view = {
            let mut state = self.state.write().await;
            let id = resolve_id(state.navigator.current(), id);
            state.navigator.focus(&id)?;
            self.view_of(&state)
        };
        self.publish(&view);
        Ok(view)
    }

    /// Undo the last focus. `None` when there is nothing to undo.
    pub async fn back(&self) -> Option<ViewState> {
        let view = {
            let mut state = self.state.write().await;
            state.navigator.back()?;
            self.view_of(&state)
        };
        self.publish(&view);
        Some(view)
    }

    pub async fn clear_focus(&self) -> Result<ViewState> {
        let view = {
            let mut state = self.state.write().await;
            state.navigator.clear_focus()?;
            self.view_of(&state)
        };
        self.publish(&view);
        Ok(view)
    }

    fn begin_crawl(&self) -> CrawlGuard {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        CrawlGuard::new(Arc::clone(&self.generation), generation)
    }

    fn view_of(&self, state: &SessionState) -> ViewState {
        ViewState::from_navigator(&state.navigator, &self.config.analysis)
    }

    fn publish(&self, view: &ViewState) {
        // No subscribers is fine
        let _ = self.changes.send(view.clone());
    }
}

/// Match `raw` against the graph as given, falling back to the dotted
/// to slash conversion.
fn resolve_id(graph: &Graph, raw: &str) -> NodeId {
    let exact = NodeId::new(raw.trim());
    if graph.contains_node(&exact) {
        exact
    } else {
        NodeId::from_external(raw)
    }
}
