//! CLI command implementations

use knitgraph_core::{Graph, load_graph, save_graph};
use knitgraph_explorer::providers::{create_provider, create_provider_by_name};
use knitgraph_explorer::{KnitConfig, Session, ViewState};
use knitgraph_server::{KnitServer, ServerConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Settings shared by every command.
pub struct Context {
    pub config: KnitConfig,
    pub input: Option<PathBuf>,
    pub provider: Option<String>,
}

impl Context {
    pub fn load(
        config: Option<PathBuf>,
        input: Option<PathBuf>,
        provider: Option<String>,
    ) -> anyhow::Result<Self> {
        let config = KnitConfig::load(config.as_deref())?;
        Ok(Self {
            config,
            input,
            provider,
        })
    }

    /// A session over the configured provider, preloaded with `--input`
    /// when given.
    pub async fn open_session(&self) -> anyhow::Result<Arc<Session>> {
        let provider = match &self.provider {
            Some(kind) => create_provider_by_name(kind, &self.config.provider)?,
            None => create_provider(&self.config.provider)?,
        };
        tracing::debug!("Using {} provider", provider.name());

        let session = Arc::new(Session::new(provider, self.config.clone()));
        if let Some(path) = &self.input {
            let graph = load_graph(path)?;
            tracing::info!(
                "Loaded {} nodes, {} edges from {}",
                graph.node_count(),
                graph.edge_count(),
                path.display()
            );
            session.load_graph(graph).await;
        }
        Ok(session)
    }

    /// A session with a graph in it: the `--input` file, or a fresh
    /// project analysis.
    async fn populated_session(&self) -> anyhow::Result<Arc<Session>> {
        let session = self.open_session().await?;
        if self.input.is_none() {
            session.analyze_project().await?;
        }
        Ok(session)
    }
}

pub async fn serve(ctx: &Context, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let config = ServerConfig {
        host: host.unwrap_or_else(|| ctx.config.server.host.clone()),
        port: port.unwrap_or(ctx.config.server.port),
    };
    tracing::info!("Starting Knitgraph server on {}:{}", config.host, config.port);

    let session = ctx.open_session().await?;
    let server = KnitServer::new(session, config);
    server.start().await
}

pub async fn analyze(ctx: &Context, output: Option<PathBuf>) -> anyhow::Result<()> {
    let session = ctx.open_session().await?;
    match session.analyze_project().await? {
        Some(view) => print_summary(&view),
        None => tracing::debug!("Analysis superseded"),
    }
    if let Some(path) = output {
        write_graph(&*session.current_graph().await, &path)?;
    }
    Ok(())
}

pub async fn explore(ctx: &Context, class: &str, output: Option<PathBuf>) -> anyhow::Result<()> {
    let session = ctx.open_session().await?;
    match session.explore(class).await? {
        Some(view) => print_summary(&view),
        None => tracing::debug!("Exploration of {} superseded", class),
    }
    if let Some(path) = output {
        write_graph(&*session.current_graph().await, &path)?;
    }
    Ok(())
}

pub async fn stats(ctx: &Context) -> anyhow::Result<()> {
    let session = ctx.populated_session().await?;
    print_summary(&session.view().await);
    Ok(())
}

pub async fn issues(ctx: &Context) -> anyhow::Result<()> {
    let session = ctx.populated_session().await?;
    let view = session.view().await;
    if view.issues.is_empty() {
        println!("No issues found");
    }
    for issue in &view.issues {
        let severity = serde_json::to_value(issue.severity)?;
        println!(
            "[{}] {}: {}",
            severity.as_str().unwrap_or_default(),
            issue.title,
            issue.description
        );
    }
    Ok(())
}

pub async fn levels(ctx: &Context) -> anyhow::Result<()> {
    let session = ctx.populated_session().await?;
    let view = session.view().await;
    for (level, row) in view.levels.rows().iter().enumerate() {
        let ids: Vec<&str> = row.iter().map(|id| id.as_str()).collect();
        println!("Level {}: {}", level, ids.join(", "));
    }
    Ok(())
}

pub async fn focus(ctx: &Context, id: &str) -> anyhow::Result<()> {
    let session = ctx.populated_session().await?;
    let view = session.focus(id).await?;
    let graph = session.current_graph().await;

    println!("Focused on {}", id);
    for edge in graph.all_edges() {
        println!("  {} --{}--> {}", edge.source, edge.kind, edge.target);
    }
    print_summary(&view);
    Ok(())
}

pub async fn search(ctx: &Context, term: &str) -> anyhow::Result<()> {
    let session = ctx.populated_session().await?;
    let nodes = session.search(term).await;
    if nodes.is_empty() {
        println!("No nodes match {:?}", term);
    }
    for node in nodes {
        let kind = serde_json::to_value(node.kind)?;
        println!("{} ({})", node.id, kind.as_str().unwrap_or_default());
    }
    Ok(())
}

pub async fn export(ctx: &Context, output: &Path) -> anyhow::Result<()> {
    let session = ctx.populated_session().await?;
    write_graph(&*session.current_graph().await, output)
}

fn write_graph(graph: &Graph, path: &Path) -> anyhow::Result<()> {
    save_graph(graph, path)?;
    tracing::info!(
        "Wrote {} nodes, {} edges to {}",
        graph.node_count(),
        graph.edge_count(),
        path.display()
    );
    Ok(())
}

fn print_summary(view: &ViewState) {
    let stats = &view.statistics;
    println!("Modules:       {}", stats.total_modules);
    println!("Dependencies:  {}", stats.total_dependencies);
    println!("Circular deps: {}", stats.circular_deps);
    println!("Max depth:     {}", stats.max_depth);
    println!("Avg deps:      {:.2}", stats.avg_deps);
    if !view.issues.is_empty() {
        println!("Issues:        {}", view.issues.len());
    }
}
