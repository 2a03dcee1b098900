//! Typed, connectable graph vertices.
//!
//! A node is a leaf vertex by default. Entered as a scope it becomes a
//! container, grouping sub-nodes under an icon and label box; on exit it
//! re-identifies with a cluster-prefixed id so edges pointing at it
//! terminate at its boundary.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

use serde::Deserialize;

use armature_core::attr::{self, AttrMap};
use armature_core::direction::Direction;
use armature_core::palette;

use crate::backend::{self, GraphBody};
use crate::cluster::DEFAULT_GRAPH_ATTRS;
use crate::context;
use crate::edge::Edge;
use crate::error::ArmatureError;
use crate::scope::{ParentRef, ScopeCore, ScopeRef};

/// Base icon height in inches.
const DEFAULT_HEIGHT: f64 = 1.9;

/// Extra height per embedded newline, keeping multi-line labels clear of
/// the icon image.
const LINE_PADDING: f64 = 0.4;

/// Icon size in points when the node is used as a container.
const DEFAULT_ICON_SIZE: u32 = 30;

/// Options accepted by [`Node::with_options`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NodeOptions {
    /// Icon image for the node, if any.
    pub icon: Option<PathBuf>,
    /// Icon size in points when the node is used as a container.
    pub icon_size: u32,
    /// Data-flow direction when the node is used as a container.
    pub direction: String,
    /// Extra rendering attributes merged over the computed defaults.
    pub attrs: AttrMap,
}

impl Default for NodeOptions {
    fn default() -> Self {
        NodeOptions {
            icon: None,
            icon_size: DEFAULT_ICON_SIZE,
            direction: "TB".to_string(),
            attrs: AttrMap::new(),
        }
    }
}

/// A connectable vertex identified by a random 128-bit id.
///
/// Construction requires an ambient parent scope (a diagram or cluster)
/// and registers the node with it immediately, so a node always renders
/// somewhere even if it is never connected.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) inner: Rc<RefCell<NodeInner>>,
}

#[derive(Debug)]
pub(crate) struct NodeInner {
    id: String,
    label: String,
    attrs: AttrMap,
    icon: Option<PathBuf>,
    icon_size: u32,
    pub(crate) core: ScopeCore,
}

impl Node {
    /// Creates a node with default options.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveScope` when no diagram or cluster is active: a
    /// node must belong to an enclosing scope.
    pub fn new(label: &str) -> Result<Node, ArmatureError> {
        Self::with_options(label, NodeOptions::default())
    }

    /// Creates a node bound to the ambient scope.
    ///
    /// When an icon is configured the node renders borderless with a
    /// computed height: 1.9 plus 0.4 per embedded newline in the label,
    /// so multi-line labels do not overlap the icon. Explicit attributes
    /// win key-by-key over the computed defaults.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDirection` for an unknown direction value and
    /// `NoActiveScope` when no diagram is active.
    pub fn with_options(label: &str, options: NodeOptions) -> Result<Node, ArmatureError> {
        let direction: Direction = options.direction.parse()?;

        let diagram = context::active_diagram("node construction")?;
        let parent = match context::active_scope() {
            Some(scope) => ParentRef::from(scope),
            None => ParentRef::Diagram(diagram.clone()),
        };
        let id = diagram.next_node_id();

        let mut attrs = AttrMap::new();
        if let Some(icon) = &options.icon {
            let padding = LINE_PADDING * label.matches('\n').count() as f64;
            attrs.insert("shape".to_string(), "none".to_string());
            attrs.insert(
                "height".to_string(),
                format!("{:.1}", DEFAULT_HEIGHT + padding),
            );
            attrs.insert("image".to_string(), icon.display().to_string());
        }
        attr::merge(&mut attrs, &options.attrs);

        let body = GraphBody::new(format!("cluster_{label}"));
        let node = Node {
            inner: Rc::new(RefCell::new(NodeInner {
                id,
                label: label.to_string(),
                attrs,
                icon: options.icon,
                icon_size: options.icon_size,
                core: ScopeCore::new(body, direction, 0, Some(parent.downgrade())),
            })),
        };
        parent.register(&node);
        Ok(node)
    }

    /// Uses this node as a container scope for the duration of `body`.
    ///
    /// The node stops rendering as a leaf: its parent forgets it, its
    /// rendering attributes are cleared, and its graph label becomes an
    /// icon and label table when an icon is configured. On exit the
    /// shared scope-exit sequence runs and the node re-identifies with a
    /// `cluster_`-prefixed id, so downstream edge resolution treats it
    /// as a subgraph boundary rather than a point vertex.
    pub fn within<F, R>(&self, body: F) -> Result<R, ArmatureError>
    where
        F: FnOnce(&Node) -> Result<R, ArmatureError>,
    {
        self.enter_container();
        let guard = context::enter_scope(ScopeRef::Node(self.clone()));
        let result = body(self);
        self.exit_container();
        drop(guard);
        result
    }

    /// Connects this node to `other` with an undirected edge.
    ///
    /// Returns the target node for chaining.
    pub fn connect(&self, other: &Node) -> Result<Node, ArmatureError> {
        self.connect_via(other, Edge::new())
    }

    /// Connects this node to `other`, pointing forward.
    pub fn connect_forward(&self, other: &Node) -> Result<Node, ArmatureError> {
        self.connect_via(other, Edge::new().forward(true))
    }

    /// Connects this node to `other`, pointing back at this node.
    pub fn connect_reverse(&self, other: &Node) -> Result<Node, ArmatureError> {
        self.connect_via(other, Edge::new().reverse(true))
    }

    /// Connects this node to every node in `others` with undirected
    /// edges. Returns the targets for chaining.
    pub fn connect_all(&self, others: &[Node]) -> Result<Vec<Node>, ArmatureError> {
        others.iter().map(|other| self.connect(other)).collect()
    }

    /// Connects this node to every node in `others`, pointing forward.
    pub fn connect_all_forward(&self, others: &[Node]) -> Result<Vec<Node>, ArmatureError> {
        others
            .iter()
            .map(|other| self.connect_forward(other))
            .collect()
    }

    /// Connects this node to every node in `others`, pointing back.
    pub fn connect_all_reverse(&self, others: &[Node]) -> Result<Vec<Node>, ArmatureError> {
        others
            .iter()
            .map(|other| self.connect_reverse(other))
            .collect()
    }

    /// Connects this node to `other` with an explicit styled edge.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveScope` when no diagram is active: every
    /// connection is registered on the single active diagram, never on a
    /// cluster.
    pub fn connect_via(&self, other: &Node, edge: Edge) -> Result<Node, ArmatureError> {
        let diagram = context::active_diagram("connecting nodes")?;
        diagram.insert_edge(self, other, edge.bound_to(self));
        Ok(other.clone())
    }

    /// The node's current id. A node that has been used as a container
    /// carries a `cluster_`-prefixed id afterwards.
    pub fn id(&self) -> String {
        self.inner.borrow().id.clone()
    }

    pub fn label(&self) -> String {
        self.inner.borrow().label.clone()
    }

    /// Sets a rendering attribute on the node itself.
    ///
    /// Registration snapshots attributes, so changes made after the node
    /// was registered with its scope are not reflected in the rendered
    /// output.
    pub fn set_attr(&self, key: &str, value: &str) {
        self.inner
            .borrow_mut()
            .attrs
            .insert(key.to_string(), value.to_string());
    }

    /// Fresh depth-first sequence of all transitively owned nodes. Empty
    /// unless this node has been used as a container.
    pub fn nodes(&self) -> Vec<Node> {
        let mut out = Vec::new();
        self.inner.borrow().core.collect_nodes(&mut out);
        out
    }

    pub(crate) fn snapshot(&self) -> (String, String, AttrMap) {
        let inner = self.inner.borrow();
        (inner.id.clone(), inner.label.clone(), inner.attrs.clone())
    }

    pub(crate) fn with_core<R>(&self, f: impl FnOnce(&mut ScopeCore) -> R) -> R {
        f(&mut self.inner.borrow_mut().core)
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<NodeInner>> {
        Rc::downgrade(&self.inner)
    }

    fn enter_container(&self) {
        let (id, parent) = {
            let inner = self.inner.borrow();
            (inner.id.clone(), inner.core.parent.clone())
        };

        // The leaf is about to become a container: the parent must
        // forget it or it would also render as a vertex.
        let depth = match parent.and_then(|weak| weak.upgrade()) {
            Some(parent) => {
                parent.remove(&id);
                parent.child_depth()
            }
            None => 0,
        };

        let mut inner = self.inner.borrow_mut();
        inner.attrs.clear();

        let mut graph_attrs = attr::from_pairs(&DEFAULT_GRAPH_ATTRS);
        let label = match &inner.icon {
            Some(icon) => icon_table_label(&inner.label, icon, inner.icon_size),
            None => inner.label.clone(),
        };
        graph_attrs.insert("label".to_string(), label);
        graph_attrs.insert(
            "rankdir".to_string(),
            inner.core.direction.as_str().to_string(),
        );
        graph_attrs.insert(
            "bgcolor".to_string(),
            palette::background_for(depth).to_string(),
        );

        inner.core.depth = depth;
        inner.core.body.set_graph_attrs(&graph_attrs);
    }

    fn exit_container(&self) {
        let parent = {
            let inner = self.inner.borrow();
            inner.core.parent.clone().and_then(|weak| weak.upgrade())
        };
        if let Some(parent) = parent {
            parent.attach(ScopeRef::Node(self.clone()));
        }

        let mut inner = self.inner.borrow_mut();
        inner.core.emit_members();

        // Re-identify as a cluster so edges terminate at the boundary.
        let cluster_id = format!("cluster_{}", inner.id);
        inner.core.body.set_name(cluster_id.clone());
        inner.id = cluster_id;
    }
}

/// Builds the HTML table label for an iconed container node: the first
/// label line sits beside the icon, the remaining lines span both columns.
fn icon_table_label(label: &str, icon: &Path, icon_size: u32) -> String {
    let escaped = backend::escape_html(label);
    let mut lines = escaped.split('\n');
    let first = lines.next().unwrap_or_default();

    let mut table = format!(
        "<<TABLE border=\"0\"><TR>\
         <TD fixedsize=\"true\" width=\"{icon_size}\" height=\"{icon_size}\">\
         <IMG SRC=\"{}\"></IMG></TD>\
         <TD align=\"left\">{first}</TD></TR>",
        icon.display()
    );
    for line in lines {
        table.push_str(&format!(
            "<TR><TD colspan=\"2\" align=\"left\">{line}</TD></TR>"
        ));
    }
    table.push_str("</TABLE>>");
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::{Diagram, DiagramOptions};

    fn in_diagram(body: impl FnOnce() -> Result<(), ArmatureError>) {
        Diagram::new("d", DiagramOptions::default())
            .unwrap()
            .dot(|_| body())
            .unwrap();
    }

    #[test]
    fn test_node_requires_enclosing_scope() {
        let err = Node::new("orphan").unwrap_err();
        assert!(matches!(err, ArmatureError::NoActiveScope(_)));
    }

    #[test]
    fn test_node_without_icon_has_empty_attrs() {
        in_diagram(|| {
            let node = Node::new("plain")?;
            assert!(node.snapshot().2.is_empty());
            Ok(())
        });
    }

    #[test]
    fn test_icon_attrs_and_height_padding() {
        in_diagram(|| {
            let options = NodeOptions {
                icon: Some(PathBuf::from("/icons/db.png")),
                ..NodeOptions::default()
            };
            let node = Node::with_options("db\nprimary\nreplica", options)?;
            let (_, _, attrs) = node.snapshot();
            assert_eq!(attrs["shape"], "none");
            assert_eq!(attrs["height"], "2.7");
            assert_eq!(attrs["image"], "/icons/db.png");
            Ok(())
        });
    }

    #[test]
    fn test_explicit_attrs_override_computed_defaults() {
        in_diagram(|| {
            let options = NodeOptions {
                icon: Some(PathBuf::from("/icons/db.png")),
                attrs: attr::from_pairs(&[("height", "3.5"), ("fontsize", "10")]),
                ..NodeOptions::default()
            };
            let (_, _, attrs) = Node::with_options("db", options)?.snapshot();
            assert_eq!(attrs["height"], "3.5");
            assert_eq!(attrs["shape"], "none");
            assert_eq!(attrs["fontsize"], "10");
            Ok(())
        });
    }

    #[test]
    fn test_container_use_reidentifies_with_cluster_id() {
        in_diagram(|| {
            let group = Node::new("group")?;
            let leaf_id = group.id();
            group.within(|_| {
                Node::new("inner")?;
                Ok(())
            })?;
            assert_eq!(group.id(), format!("cluster_{leaf_id}"));
            assert_eq!(group.nodes().len(), 1);
            Ok(())
        });
    }

    #[test]
    fn test_icon_table_label_spans_extra_lines() {
        let label = icon_table_label("cache\nredis & co", Path::new("/i/redis.png"), 30);
        assert!(label.starts_with("<<TABLE"));
        assert!(label.ends_with("</TABLE>>"));
        assert!(label.contains("<IMG SRC=\"/i/redis.png\">"));
        assert!(label.contains("<TD align=\"left\">cache</TD>"));
        assert!(label.contains("<TR><TD colspan=\"2\" align=\"left\">redis &amp; co</TD></TR>"));
    }
}
