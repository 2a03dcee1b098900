//! Named, visually-styled sub-scopes.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::Deserialize;

use armature_core::attr::{self, AttrMap};
use armature_core::direction::Direction;
use armature_core::palette;

use crate::backend::GraphBody;
use crate::context;
use crate::error::ArmatureError;
use crate::node::Node;
use crate::scope::{ParentRef, ScopeCore, ScopeRef};

/// Default graph attributes applied to every cluster subgraph, and to
/// nodes entered as container scopes.
pub(crate) const DEFAULT_GRAPH_ATTRS: [(&str, &str); 6] = [
    ("shape", "box"),
    ("style", "rounded"),
    ("labeljust", "l"),
    ("pencolor", "#AEB6BE"),
    ("fontname", "Sans-Serif"),
    ("fontsize", "12"),
];

/// Options accepted by [`Cluster::with_options`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClusterOptions {
    /// Data-flow direction inside the cluster.
    pub direction: String,
    /// Extra graph attributes merged over the defaults.
    pub graph_attr: AttrMap,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        ClusterOptions {
            direction: "LR".to_string(),
            graph_attr: AttrMap::new(),
        }
    }
}

/// A named sub-scope grouping nodes and nested sub-scopes.
///
/// Clusters bind to whichever scope is ambient at construction time and
/// require an active diagram. The nesting depth picks a background color
/// from the palette, so sibling levels stay visually distinguishable.
///
/// # Examples
///
/// ```rust,no_run
/// use armature::{Cluster, Diagram, DiagramOptions, Node};
///
/// Diagram::new("Queues", DiagramOptions::default())?.draw(|_| {
///     let workers = Cluster::new("workers")?;
///     workers.within(|_| {
///         Node::new("worker-1")?;
///         Node::new("worker-2")?;
///         Ok(())
///     })
/// })?;
/// # Ok::<(), armature::ArmatureError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Cluster {
    pub(crate) inner: Rc<RefCell<ClusterInner>>,
}

#[derive(Debug)]
pub(crate) struct ClusterInner {
    label: String,
    pub(crate) core: ScopeCore,
}

impl Cluster {
    /// Creates a cluster with default options.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveScope` when no diagram is active.
    pub fn new(label: &str) -> Result<Cluster, ArmatureError> {
        Self::with_options(label, ClusterOptions::default())
    }

    /// Creates a cluster bound to the ambient scope.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDirection` for an unknown direction value and
    /// `NoActiveScope` when no diagram is active. Both are raised before
    /// any backend graph state is touched.
    pub fn with_options(label: &str, options: ClusterOptions) -> Result<Cluster, ArmatureError> {
        let direction: Direction = options.direction.parse()?;

        // A cluster is invalid outside any diagram.
        let diagram = context::active_diagram("cluster construction")?;
        let parent = match context::active_scope() {
            Some(scope) => ParentRef::from(scope),
            None => ParentRef::Diagram(diagram),
        };
        let depth = parent.child_depth();

        let mut graph_attrs = attr::from_pairs(&DEFAULT_GRAPH_ATTRS);
        graph_attrs.insert("label".to_string(), label.to_string());
        graph_attrs.insert("rankdir".to_string(), direction.as_str().to_string());
        graph_attrs.insert(
            "bgcolor".to_string(),
            palette::background_for(depth).to_string(),
        );
        attr::merge(&mut graph_attrs, &options.graph_attr);

        let mut body = GraphBody::new(format!("cluster_{label}"));
        body.set_graph_attrs(&graph_attrs);

        Ok(Cluster {
            inner: Rc::new(RefCell::new(ClusterInner {
                label: label.to_string(),
                core: ScopeCore::new(body, direction, depth, Some(parent.downgrade())),
            })),
        })
    }

    /// Runs `body` with this cluster as the ambient scope.
    ///
    /// Nodes and scopes constructed inside `body` bind to this cluster
    /// implicitly. The exit sequence runs even when `body` returns an
    /// error: the cluster still attaches to its parent and emits its
    /// members, and the ambient context is restored to the enclosing
    /// scope before the error propagates.
    pub fn within<F, R>(&self, body: F) -> Result<R, ArmatureError>
    where
        F: FnOnce(&Cluster) -> Result<R, ArmatureError>,
    {
        let guard = context::enter_scope(ScopeRef::Cluster(self.clone()));
        let result = body(self);
        self.exit();
        drop(guard);
        result
    }

    pub fn label(&self) -> String {
        self.inner.borrow().label.clone()
    }

    /// Nesting depth: 0 directly under the diagram.
    pub fn depth(&self) -> usize {
        self.inner.borrow().core.depth
    }

    /// Fresh depth-first sequence of all transitively owned nodes, direct
    /// nodes before sub-scope nodes.
    pub fn nodes(&self) -> Vec<Node> {
        let mut out = Vec::new();
        self.inner.borrow().core.collect_nodes(&mut out);
        out
    }

    pub(crate) fn with_core<R>(&self, f: impl FnOnce(&mut ScopeCore) -> R) -> R {
        f(&mut self.inner.borrow_mut().core)
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<ClusterInner>> {
        Rc::downgrade(&self.inner)
    }

    fn exit(&self) {
        let parent = {
            let inner = self.inner.borrow();
            inner.core.parent.clone().and_then(|weak| weak.upgrade())
        };
        if let Some(parent) = parent {
            parent.attach(ScopeRef::Cluster(self.clone()));
        }
        self.inner.borrow_mut().core.emit_members();
    }
}
