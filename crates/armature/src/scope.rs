//! Shared container-scope machinery.
//!
//! A diagram, a cluster, and a node used as a container all own nodes and
//! nested sub-scopes and participate in the ambient-context stack. This
//! module holds the state and the exit sequence they share, plus the
//! handle enums used for parent links and the ambient registry.

use std::cell::RefCell;
use std::rc::Weak;

use indexmap::IndexMap;

use armature_core::attr::AttrMap;
use armature_core::direction::Direction;

use crate::backend::GraphBody;
use crate::cluster::{Cluster, ClusterInner};
use crate::diagram::{Diagram, DiagramInner};
use crate::node::{Node, NodeInner};

/// A node registration snapshot.
///
/// The label and attributes are captured when the node is registered;
/// attribute changes made afterwards are not reflected in the rendered
/// output.
#[derive(Debug, Clone)]
pub(crate) struct Registered {
    pub(crate) node: Node,
    pub(crate) label: String,
    pub(crate) attrs: AttrMap,
}

/// Container state shared by diagrams, clusters, and container nodes.
#[derive(Debug)]
pub(crate) struct ScopeCore {
    /// Backend graph handle, exclusively owned by this scope.
    pub(crate) body: GraphBody,
    pub(crate) direction: Direction,
    /// Owned leaf nodes, keyed by id in registration order.
    pub(crate) nodes: IndexMap<String, Registered>,
    /// Attached sub-scopes in attachment order.
    pub(crate) children: Vec<ScopeRef>,
    pub(crate) depth: usize,
    /// Weak link to the enclosing scope; parents own children, not the
    /// other way around.
    pub(crate) parent: Option<WeakParent>,
}

impl ScopeCore {
    pub(crate) fn new(
        body: GraphBody,
        direction: Direction,
        depth: usize,
        parent: Option<WeakParent>,
    ) -> Self {
        ScopeCore {
            body,
            direction,
            nodes: IndexMap::new(),
            children: Vec::new(),
            depth,
            parent,
        }
    }

    /// Registers a node under its id, snapshotting its current label and
    /// attributes.
    pub(crate) fn register(&mut self, node: &Node) {
        let (id, label, attrs) = node.snapshot();
        self.nodes.insert(
            id,
            Registered {
                node: node.clone(),
                label,
                attrs,
            },
        );
    }

    /// Forgets a node. Used when a node is about to re-enter as a
    /// sub-scope and must not also render as a leaf.
    pub(crate) fn remove(&mut self, id: &str) {
        self.nodes.shift_remove(id);
    }

    pub(crate) fn attach(&mut self, child: ScopeRef) {
        self.children.push(child);
    }

    /// Scope-exit emission: every owned node snapshot goes into this
    /// scope's own body, then every attached sub-scope is embedded as a
    /// nested subgraph.
    pub(crate) fn emit_members(&mut self) {
        let ScopeCore {
            body,
            nodes,
            children,
            ..
        } = self;
        for (id, registered) in nodes.iter() {
            body.add_node(id, &registered.label, &registered.attrs);
        }
        for child in children.iter() {
            body.add_subgraph(child.body_clone());
        }
    }

    /// Depth-first traversal of all transitively owned nodes, direct
    /// nodes before sub-scope nodes.
    pub(crate) fn collect_nodes(&self, out: &mut Vec<Node>) {
        for registered in self.nodes.values() {
            out.push(registered.node.clone());
        }
        for child in &self.children {
            child.collect_nodes(out);
        }
    }
}

/// Handle to a container scope that can appear on the ambient stack.
#[derive(Debug, Clone)]
pub(crate) enum ScopeRef {
    Cluster(Cluster),
    Node(Node),
}

impl ScopeRef {
    pub(crate) fn collect_nodes(&self, out: &mut Vec<Node>) {
        match self {
            ScopeRef::Cluster(cluster) => cluster.with_core(|core| core.collect_nodes(out)),
            ScopeRef::Node(node) => node.with_core(|core| core.collect_nodes(out)),
        }
    }

    fn body_clone(&self) -> GraphBody {
        match self {
            ScopeRef::Cluster(cluster) => cluster.with_core(|core| core.body.clone()),
            ScopeRef::Node(node) => node.with_core(|core| core.body.clone()),
        }
    }
}

/// Handle to anything that can parent a node or sub-scope.
#[derive(Debug, Clone)]
pub(crate) enum ParentRef {
    Diagram(Diagram),
    Cluster(Cluster),
    Node(Node),
}

impl ParentRef {
    pub(crate) fn register(&self, node: &Node) {
        self.with_core(|core| core.register(node));
    }

    pub(crate) fn remove(&self, id: &str) {
        self.with_core(|core| core.remove(id));
    }

    pub(crate) fn attach(&self, child: ScopeRef) {
        self.with_core(|core| core.attach(child));
    }

    /// Nesting depth for a child of this scope. Depth counts container
    /// nesting only: a scope directly under the diagram is at depth 0.
    pub(crate) fn child_depth(&self) -> usize {
        match self {
            ParentRef::Diagram(_) => 0,
            _ => self.with_core(|core| core.depth + 1),
        }
    }

    pub(crate) fn downgrade(&self) -> WeakParent {
        match self {
            ParentRef::Diagram(diagram) => WeakParent::Diagram(diagram.downgrade()),
            ParentRef::Cluster(cluster) => WeakParent::Cluster(cluster.downgrade()),
            ParentRef::Node(node) => WeakParent::Node(node.downgrade()),
        }
    }

    fn with_core<R>(&self, f: impl FnOnce(&mut ScopeCore) -> R) -> R {
        match self {
            ParentRef::Diagram(diagram) => diagram.with_core(f),
            ParentRef::Cluster(cluster) => cluster.with_core(f),
            ParentRef::Node(node) => node.with_core(f),
        }
    }
}

impl From<ScopeRef> for ParentRef {
    fn from(scope: ScopeRef) -> Self {
        match scope {
            ScopeRef::Cluster(cluster) => ParentRef::Cluster(cluster),
            ScopeRef::Node(node) => ParentRef::Node(node),
        }
    }
}

/// Weak counterpart of [`ParentRef`], stored inside child scopes.
#[derive(Debug, Clone)]
pub(crate) enum WeakParent {
    Diagram(Weak<RefCell<DiagramInner>>),
    Cluster(Weak<RefCell<ClusterInner>>),
    Node(Weak<RefCell<NodeInner>>),
}

impl WeakParent {
    pub(crate) fn upgrade(&self) -> Option<ParentRef> {
        match self {
            WeakParent::Diagram(weak) => weak
                .upgrade()
                .map(|inner| ParentRef::Diagram(Diagram { inner })),
            WeakParent::Cluster(weak) => weak
                .upgrade()
                .map(|inner| ParentRef::Cluster(Cluster { inner })),
            WeakParent::Node(weak) => weak.upgrade().map(|inner| ParentRef::Node(Node { inner })),
        }
    }
}
