//! Integration tests for the public scene-graph builder API.
//!
//! These tests assemble diagrams and inspect the emitted DOT description;
//! none of them invoke the external layout engine.

use std::collections::HashSet;

use armature::{
    ArmatureError, Cluster, Diagram, DiagramOptions, Edge, Node, SequentialIdSource,
};

fn options() -> DiagramOptions {
    DiagramOptions {
        show: false,
        ..DiagramOptions::default()
    }
}

fn sequential(name: &str) -> Diagram {
    Diagram::with_id_source(name, options(), Box::new(SequentialIdSource::new())).unwrap()
}

#[test]
fn test_node_outside_any_diagram_fails() {
    let err = Node::new("stray").unwrap_err();
    assert!(matches!(err, ArmatureError::NoActiveScope(_)));
}

#[test]
fn test_ten_thousand_nodes_get_distinct_ids() {
    let mut ids = HashSet::new();
    Diagram::new("big", options())
        .unwrap()
        .dot(|_| {
            for _ in 0..10_000 {
                ids.insert(Node::new("n")?.id());
            }
            Ok(())
        })
        .unwrap();
    assert_eq!(ids.len(), 10_000);
}

#[test]
fn test_connect_returns_target_for_chaining() {
    sequential("chain")
        .dot(|_| {
            let a = Node::new("a")?;
            let b = Node::new("b")?;
            let c = Node::new("c")?;
            a.connect_forward(&b)?.connect_forward(&c)?;
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_broadcast_returns_the_target_sequence() {
    sequential("fanout")
        .dot(|_| {
            let lb = Node::new("lb")?;
            let pool = vec![Node::new("w1")?, Node::new("w2")?, Node::new("w3")?];
            let targets = lb.connect_all_forward(&pool)?;
            assert_eq!(targets.len(), 3);
            assert_eq!(targets[0].id(), pool[0].id());
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_detached_edge_binds_then_connects() {
    let dot = sequential("late")
        .dot(|_| {
            let a = Node::new("a")?;
            let b = Node::new("b")?;
            // the first connect binds the source, the second draws
            Edge::new().with_label("late bound").connect(&a)?.connect(&b)?;
            Ok(())
        })
        .unwrap();
    assert_eq!(dot.matches("label=\"late bound\"").count(), 1);
    assert!(dot.contains("dir=\"none\""));
}

#[test]
fn test_cluster_membership_and_nesting_colors() {
    let dot = sequential("tiers")
        .dot(|_| {
            let outer = Cluster::new("app tier")?;
            outer.within(|_| {
                Node::new("app-1")?;
                let inner = Cluster::new("sidecars")?;
                inner.within(|_| {
                    Node::new("proxy")?;
                    Ok(())
                })
            })?;
            Ok(())
        })
        .unwrap();

    assert!(dot.contains("subgraph \"cluster_app tier\""));
    assert!(dot.contains("subgraph \"cluster_sidecars\""));
    // depth 0 and depth 1 pick consecutive palette entries
    assert!(dot.contains("bgcolor=\"#E5F5FD\""));
    assert!(dot.contains("bgcolor=\"#EBF3E7\""));
    assert!(dot.contains("label=\"app-1\""));
    assert!(dot.contains("label=\"proxy\""));
}

#[test]
fn test_edges_between_container_nodes_anchor_at_boundaries() {
    let dot = sequential("groups")
        .dot(|_| {
            let first = Node::new("first")?;
            first.within(|_| {
                Node::new("inner-a")?;
                Ok(())
            })?;

            let second = Node::new("second")?;
            second.within(|_| {
                Node::new("inner-b")?;
                Ok(())
            })?;

            first.connect_forward(&second)?;
            Ok(())
        })
        .unwrap();

    // the rendered edge runs between the first depth-first node of each
    // group, anchored at the group boundaries
    assert!(dot.contains("ltail=\"cluster_n0\""));
    assert!(dot.contains("lhead=\"cluster_n2\""));
    assert!(dot.contains("subgraph \"cluster_n0\""));
    assert!(dot.contains("subgraph \"cluster_n2\""));
}

#[test]
fn test_iconed_container_node_renders_an_html_table_label() {
    let dot = sequential("iconed")
        .dot(|_| {
            let node_options = armature::NodeOptions {
                icon: Some("/icons/cluster.png".into()),
                ..armature::NodeOptions::default()
            };
            let group = Node::with_options("cache\nlayer", node_options)?;
            group.within(|_| {
                Node::new("redis")?;
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

    assert!(dot.contains("<<TABLE border=\"0\">"));
    assert!(dot.contains("<IMG SRC=\"/icons/cluster.png\">"));
    assert!(dot.contains("<TR><TD colspan=\"2\" align=\"left\">layer</TD></TR>"));
}

#[test]
fn test_identical_builds_print_identical_descriptions() {
    fn build(diagram: Diagram) -> String {
        diagram
            .dot(|_| {
                let gateway = Node::new("gateway")?;
                let cache = Node::new("cache")?;
                let tier = Cluster::new("app tier")?;
                let apps = tier.within(|_| {
                    Ok(vec![Node::new("app-1")?, Node::new("app-2")?])
                })?;
                gateway.connect_all_forward(&apps)?;
                for app in &apps {
                    app.connect(&cache)?;
                }
                Ok(())
            })
            .unwrap()
    }

    let first = build(sequential("twice"));
    let second = build(sequential("twice"));
    assert_eq!(first, second);
}

#[test]
fn test_diagram_defaults_reach_the_description() {
    let dot = sequential("defaults").dot(|_| Ok(())).unwrap();
    assert!(dot.contains("compound=\"true\""));
    assert!(dot.contains("rankdir=\"LR\""));
    assert!(dot.contains("splines=\"ortho\""));
    assert!(dot.contains("label=\"defaults\""));
}
