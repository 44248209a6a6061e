//! Integration tests for Knitgraph
//!
//! These tests drive a session end to end: metadata provider, crawler,
//! focus navigation, export/import and the HTTP API.

use axum::{
    Json, Router,
    extract::Query,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use knitgraph_core::{EdgeKind, NodeId, import_graph, load_graph, save_graph};
use knitgraph_explorer::{
    BaseClasses, Catalog, ClassInfoProvider, ClassRecord, ClassRef, HttpProvider, KnitConfig,
    ProviderConfig, ProviderKind, Session, create_provider,
};
use knitgraph_server::KnitServer;
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;

fn catalog() -> Catalog {
    Catalog {
        base_classes: BaseClasses::Grouped {
            base_classes: vec![
                ClassRecord::new("shop.OrderService")
                    .with_parameter(ClassRef::new("shop.OrderRepository", false))
                    .with_injection(ClassRef::new("shop.Clock", false)),
                ClassRecord::new("shop.PaymentService")
                    .with_parameter(ClassRef::new("shop.OrderService", false)),
            ],
            parent_class: Some("shop.Service".into()),
        },
        classes: vec![
            ClassRecord::new("shop.OrderService")
                .with_parent("shop.Service")
                .with_parameter(ClassRef::new("shop.OrderRepository", false))
                .with_injection(ClassRef::new("shop.Clock", false)),
            ClassRecord::new("shop.OrderRepository")
                .with_parameter(ClassRef::new("shop.Database", true)),
            ClassRecord::new("shop.Database"),
            ClassRecord::new("shop.Clock"),
            ClassRecord::new("shop.AuditedOrderService").with_parent("shop.OrderService"),
        ],
    }
}

fn id(name: &str) -> NodeId {
    NodeId::from(name)
}

/// A metadata service speaking the provider's HTTP protocol.
fn metadata_service(catalog: Catalog) -> Router {
    let classes: Arc<HashMap<String, ClassRecord>> = Arc::new(
        catalog
            .classes
            .iter()
            .map(|record| (record.name.clone(), record.clone()))
            .collect(),
    );
    let all = Arc::new(catalog.classes.clone());
    let base = Arc::new(catalog.base_classes.clone());

    Router::new()
        .route(
            "/api/base-classes",
            get(move || {
                let base = Arc::clone(&base);
                async move { Json((*base).clone()) }
            }),
        )
        .route(
            "/api/class-info",
            get(move |Query(params): Query<HashMap<String, String>>| {
                let classes = Arc::clone(&classes);
                async move {
                    let name = params.get("name").cloned().unwrap_or_default();
                    match classes.get(&name) {
                        Some(record) => Json(record.clone()).into_response(),
                        None => StatusCode::NOT_FOUND.into_response(),
                    }
                }
            }),
        )
        .route(
            "/api/child-classes",
            get(move |Query(params): Query<HashMap<String, String>>| {
                let all = Arc::clone(&all);
                async move {
                    let name = params.get("name").cloned().unwrap_or_default();
                    let children: Vec<ClassRecord> = all
                        .iter()
                        .filter(|record| record.parent_class.as_deref() == Some(name.as_str()))
                        .cloned()
                        .collect();
                    Json(children)
                }
            }),
        )
}

async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_static_catalog_session_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let catalog_path = temp_dir.path().join("catalog.json");
    std::fs::write(&catalog_path, serde_json::to_string(&catalog()).unwrap()).unwrap();

    let provider_config = ProviderConfig {
        kind: ProviderKind::Static,
        catalog: Some(catalog_path),
        ..ProviderConfig::default()
    };
    let provider = create_provider(&provider_config).unwrap();
    let session = Session::new(provider, KnitConfig::default());

    let overview = session.analyze_project().await.unwrap().unwrap();
    assert_eq!(overview.statistics.circular_deps, 0);
    assert!(overview.graph.nodes.iter().any(|n| n.id == id("shop/Service")));

    let explored = session.explore("shop.OrderService").await.unwrap().unwrap();
    let graph = session.current_graph().await;
    assert!(graph.has_edge_between(
        &id("shop/OrderRepository"),
        &id("shop/Database"),
        EdgeKind::Depends
    ));
    assert!(graph.has_edge_between(
        &id("shop/AuditedOrderService"),
        &id("shop/OrderService"),
        EdgeKind::Extends
    ));
    assert!(graph.node(&id("shop/Database")).unwrap().is_provider);
    assert!(explored.statistics.total_dependencies > overview.statistics.total_dependencies);

    // Focus, then come back to the explored graph
    let focused = session.focus("shop/OrderRepository").await.unwrap();
    assert_eq!(focused.graph.nodes.len(), 3);
    let restored = session.back().await.unwrap();
    assert_eq!(restored.graph, explored.graph);

    // Export and re-import preserve the node/edge multiset
    let export_path = temp_dir.path().join("graph.json");
    save_graph(&graph, &export_path).unwrap();
    let reloaded = load_graph(&export_path).unwrap();
    assert_eq!(reloaded, *graph);

    let json = session.export_json().await.unwrap();
    assert_eq!(import_graph(&json).unwrap().edge_count(), graph.edge_count());
}

#[tokio::test]
async fn test_http_provider_against_metadata_service() {
    let base_url = spawn(metadata_service(catalog())).await;
    let provider = HttpProvider::new(&base_url).unwrap();

    let base = provider.get_base_classes().await.unwrap();
    assert_eq!(base.records().len(), 2);
    assert_eq!(base.parent_class(), "shop.Service");

    let record = provider.get_class_info("shop.OrderService").await.unwrap().unwrap();
    assert_eq!(record.parameters.len(), 1);
    assert!(provider.get_class_info("shop.Unknown").await.unwrap().is_none());

    let children = provider.get_child_classes("shop.OrderService").await.unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name, "shop.AuditedOrderService");
}

#[tokio::test]
async fn test_server_api_over_http_provider() {
    let metadata_url = spawn(metadata_service(catalog())).await;
    let mut config = KnitConfig::default();
    config.provider.base_url = metadata_url;
    let provider = create_provider(&config.provider).unwrap();
    let session = Arc::new(Session::new(provider, config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let api = format!("http://{}", listener.local_addr().unwrap());
    let server = KnitServer::new(Arc::clone(&session), knitgraph_server::ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
    });
    tokio::spawn(async move {
        server.serve(listener).await.unwrap();
    });

    let client = reqwest::Client::new();

    let health: serde_json::Value = client
        .get(format!("{api}/api/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");

    let view: serde_json::Value = client
        .post(format!("{api}/api/explore/shop.OrderService"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(view["canGoBack"], false);
    assert!(view["statistics"]["totalModules"].as_u64().unwrap() >= 5);

    // Slash ids span two path segments; the dotted form is resolved instead
    let focused = client
        .post(format!("{api}/api/focus/shop/Clock"))
        .send()
        .await
        .unwrap();
    assert_eq!(focused.status(), reqwest::StatusCode::NOT_FOUND);

    let focused: serde_json::Value = client
        .post(format!("{api}/api/focus/shop.Clock"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(focused["focusedNode"], "shop/Clock");

    let missing = client
        .post(format!("{api}/api/explore/shop.Nowhere"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);

    let export: serde_json::Value = client
        .get(format!("{api}/api/graph"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(export["metadata"]["exportDate"].is_string());
}
