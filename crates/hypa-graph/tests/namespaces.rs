use std::sync::Arc;
use std::thread;

use hypa_core::{Hyperedge, Node};
use hypa_graph::{HypergraphDb, DEFAULT_NAMESPACE};

fn seed(db: &HypergraphDb, namespace: &str) {
    let store = db.namespace(namespace);
    let mut batch = store.batch();
    batch.add_node(Node::new("a", "entity").unwrap());
    batch.add_node(Node::new("b", "entity").unwrap());
    batch.add_edge(Hyperedge::from_nodes("e1", "link", ["a", "b"]).unwrap());
}

#[test]
fn namespaces_are_auto_created_and_isolated() {
    let db = HypergraphDb::new();
    assert_eq!(db.current_namespace(), DEFAULT_NAMESPACE);
    seed(&db, "finance/entities");

    assert!(db.namespace_exists("finance/entities"));
    assert_eq!(db.store().stats().num_nodes, 0);
    assert_eq!(
        db.list_namespaces(),
        vec![DEFAULT_NAMESPACE.to_string(), "finance/entities".to_string()]
    );

    db.select("finance/entities");
    assert_eq!(db.store().stats().num_edges, 1);
    assert!(db.get_namespace("missing").is_none());
    assert!(!db.namespace_exists("missing"));
}

#[test]
fn current_namespace_cannot_be_deleted() {
    let db = HypergraphDb::new();
    db.namespace("scratch");
    let err = db.delete_namespace(DEFAULT_NAMESPACE).unwrap_err();
    assert_eq!(err.code(), "namespace-current");
    assert!(db.delete_namespace("scratch").unwrap());
    assert!(!db.delete_namespace("scratch").unwrap());
}

#[test]
fn rename_follows_current_selection() {
    let db = HypergraphDb::new();
    seed(&db, DEFAULT_NAMESPACE);
    db.namespace("taken");
    assert_eq!(
        db.rename_namespace(DEFAULT_NAMESPACE, "taken")
            .unwrap_err()
            .code(),
        "namespace-exists"
    );
    assert!(db.rename_namespace(DEFAULT_NAMESPACE, "main").unwrap());
    assert_eq!(db.current_namespace(), "main");
    assert_eq!(db.store().stats().num_nodes, 2);
    assert!(!db.rename_namespace("nowhere", "x").unwrap());
}

#[test]
fn copy_is_deep_and_independently_locked() {
    let db = HypergraphDb::new();
    seed(&db, "src");
    db.copy_namespace("src", "dst").unwrap();
    assert_eq!(
        db.copy_namespace("absent", "x").unwrap_err().code(),
        "namespace-missing"
    );
    assert_eq!(
        db.copy_namespace("src", "dst").unwrap_err().code(),
        "namespace-exists"
    );

    let src = db.namespace("src");
    let dst = db.namespace("dst");
    src.delete_node_cascade("a");
    assert_eq!(dst.stats().num_nodes, 2);

    let _held = src.batch();
    assert!(dst.has_edge("e1"));
}

#[test]
fn clear_and_stats_aggregate_namespaces() {
    let db = HypergraphDb::new();
    seed(&db, "one");
    seed(&db, "two");
    let handle = db.namespace("one");

    let stats = db.stats();
    assert_eq!(stats.num_namespaces, 3);
    assert_eq!(stats.total_nodes, 4);
    assert_eq!(stats.total_edges, 2);
    assert_eq!(stats.namespaces["two"].num_edges, 1);

    assert!(db.clear_namespace(Some("one")));
    assert_eq!(handle.stats().num_nodes, 0);
    assert!(!db.clear_namespace(Some("ghost")));
    assert!(db.clear_namespace(None));
    assert_eq!(db.stats().total_nodes, 2);
}

#[test]
fn threads_work_in_separate_namespaces() {
    let db = Arc::new(HypergraphDb::new());
    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let db = Arc::clone(&db);
            thread::spawn(move || {
                let store = db.namespace(&format!("tenant-{worker}"));
                for i in 0..25 {
                    store.add_node(Node::new(format!("n{i}"), "entity").unwrap());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    let stats = db.stats();
    assert_eq!(stats.num_namespaces, 5);
    assert_eq!(stats.total_nodes, 100);
}
