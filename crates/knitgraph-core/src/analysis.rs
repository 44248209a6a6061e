//! Aggregate statistics and structural issue detection

use crate::cycles::{CyclePair, detect_cycles, pair_key};
use crate::graph::Graph;
use crate::levels::{LevelMap, calculate_levels};
use serde::{Deserialize, Serialize};

/// Root id excluded from isolation findings by default.
pub const DEFAULT_ROOT_ID: &str = "AppModule";

/// Outgoing-edge count above which a node is flagged.
pub const DEFAULT_DEPENDENCY_THRESHOLD: usize = 5;

/// Tunables for issue detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Node that is never reported as isolated.
    pub root_id: String,
    pub dependency_threshold: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            root_id: DEFAULT_ROOT_ID.to_string(),
            dependency_threshold: DEFAULT_DEPENDENCY_THRESHOLD,
        }
    }
}

/// Summary numbers shown alongside the graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_modules: usize,
    pub total_dependencies: usize,
    pub circular_deps: usize,
    pub max_depth: usize,
    pub avg_deps: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A classified finding about the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub severity: Severity,
    pub title: String,
    pub description: String,
}

impl Issue {
    fn new(severity: Severity, title: &str, description: String) -> Self {
        Issue {
            severity,
            title: title.to_string(),
            description,
        }
    }
}

/// Everything derived from one graph snapshot.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub cycles: Vec<CyclePair>,
    pub levels: LevelMap,
    pub statistics: Statistics,
    pub issues: Vec<Issue>,
}

impl Analysis {
    /// Run every analysis pass once, sharing the cycle and level results.
    pub fn run(graph: &Graph, focus_active: bool, options: &AnalysisOptions) -> Self {
        let cycles = detect_cycles(graph);
        let levels = calculate_levels(graph);
        let statistics = statistics_from(graph, focus_active, &cycles, &levels);
        let issues = issues_from(graph, focus_active, &cycles, options);
        Analysis {
            cycles,
            levels,
            statistics,
            issues,
        }
    }
}

pub fn calculate_statistics(graph: &Graph, focus_active: bool) -> Statistics {
    let cycles = detect_cycles(graph);
    let levels = calculate_levels(graph);
    statistics_from(graph, focus_active, &cycles, &levels)
}

pub fn detect_issues(graph: &Graph, focus_active: bool, options: &AnalysisOptions) -> Vec<Issue> {
    issues_from(graph, focus_active, &detect_cycles(graph), options)
}

fn statistics_from(
    graph: &Graph,
    focus_active: bool,
    cycles: &[CyclePair],
    levels: &LevelMap,
) -> Statistics {
    let total_modules = graph.visible_nodes(focus_active).len();
    let total_dependencies = graph.edge_count();
    Statistics {
        total_modules,
        total_dependencies,
        circular_deps: cycles.len(),
        max_depth: levels.max_depth(),
        avg_deps: average(total_dependencies, total_modules),
    }
}

/// `edges / nodes` rounded to two decimals; 0 for an empty view.
fn average(edges: usize, nodes: usize) -> f64 {
    if nodes == 0 {
        return 0.0;
    }
    let raw = edges as f64 / nodes as f64;
    (raw * 100.0).round() / 100.0
}

fn issues_from(
    graph: &Graph,
    focus_active: bool,
    cycles: &[CyclePair],
    options: &AnalysisOptions,
) -> Vec<Issue> {
    let mut issues = Vec::new();

    for pair in cycles {
        let (a, b) = pair_key(pair);
        issues.push(Issue::new(
            Severity::Error,
            "Circular Dependency",
            format!("{a} and {b} have a circular dependency"),
        ));
    }

    for node in graph.all_nodes() {
        let deps = graph.out_degree(&node.id);
        if deps > options.dependency_threshold {
            issues.push(Issue::new(
                Severity::Warning,
                "High Coupling",
                format!("{} has {deps} dependencies, consider refactoring", node.id),
            ));
        }
    }

    if !focus_active {
        for node in graph.all_nodes() {
            if node.id.as_str() == options.root_id {
                continue;
            }
            if graph.out_degree(&node.id) == 0 && graph.in_degree(&node.id) == 0 {
                issues.push(Issue::new(
                    Severity::Info,
                    "Isolated Component",
                    format!("{} appears to be isolated from the dependency graph", node.id),
                ));
            }
        }
    }

    issues
}
