//! Directed and undirected connectors between nodes.

use armature_core::attr::{self, AttrMap};

use crate::error::ArmatureError;
use crate::node::Node;

/// Default font attributes applied to every edge.
const DEFAULT_ATTRS: [(&str, &str); 3] = [
    ("fontcolor", "#2D3436"),
    ("fontname", "Sans-Serif"),
    ("fontsize", "13"),
];

/// Operand accepted by [`Edge::append`]: an existing edge or a plain node.
#[derive(Debug, Clone)]
pub enum Link {
    Node(Node),
    Edge(Edge),
}

impl From<Node> for Link {
    fn from(node: Node) -> Self {
        Link::Node(node)
    }
}

impl From<Edge> for Link {
    fn from(edge: Edge) -> Self {
        Link::Edge(edge)
    }
}

/// A connector between two nodes, carrying style attributes and
/// direction flags.
///
/// An edge may be built detached and bound to a source node later, which
/// supports constructing a styled edge first and attaching endpoints as
/// they become available.
///
/// # Examples
///
/// ```rust,no_run
/// use armature::{Diagram, DiagramOptions, Edge, Node};
///
/// Diagram::new("Pipelines", DiagramOptions::default())?.draw(|_| {
///     let ingest = Node::new("ingest")?;
///     let store = Node::new("store")?;
///     ingest.connect_via(&store, Edge::new().forward(true).with_label("events"))?;
///     Ok(())
/// })?;
/// # Ok::<(), armature::ArmatureError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Edge {
    source: Option<Node>,
    forward: bool,
    reverse: bool,
    attrs: AttrMap,
}

impl Edge {
    /// Creates a detached, undirected edge carrying the default font
    /// attributes.
    pub fn new() -> Edge {
        Edge {
            source: None,
            forward: false,
            reverse: false,
            attrs: attr::from_pairs(&DEFAULT_ATTRS),
        }
    }

    pub fn with_label(mut self, label: &str) -> Edge {
        self.attrs.insert("label".to_string(), label.to_string());
        self
    }

    pub fn with_color(mut self, color: &str) -> Edge {
        self.attrs.insert("color".to_string(), color.to_string());
        self
    }

    pub fn with_style(mut self, style: &str) -> Edge {
        self.attrs.insert("style".to_string(), style.to_string());
        self
    }

    /// Sets a free-form rendering attribute. Explicit values override the
    /// defaults key-by-key.
    pub fn with_attr(mut self, key: &str, value: &str) -> Edge {
        self.attrs.insert(key.to_string(), value.to_string());
        self
    }

    pub fn forward(mut self, forward: bool) -> Edge {
        self.forward = forward;
        self
    }

    pub fn reverse(mut self, reverse: bool) -> Edge {
        self.reverse = reverse;
        self
    }

    /// The node this edge is bound to, if any.
    pub fn source(&self) -> Option<Node> {
        self.source.clone()
    }

    /// The derived `dir` attribute value.
    pub fn direction(&self) -> &'static str {
        match (self.forward, self.reverse) {
            (true, true) => "both",
            (true, false) => "forward",
            (false, true) => "back",
            (false, false) => "none",
        }
    }

    /// The full rendering attribute set, including the derived `dir`.
    pub fn attrs(&self) -> AttrMap {
        let mut attrs = self.attrs.clone();
        attrs.insert("dir".to_string(), self.direction().to_string());
        attrs
    }

    /// Merges another edge's attributes into this one. The other edge's
    /// values win key-by-key.
    pub fn merge(mut self, other: &Edge) -> Edge {
        attr::merge(&mut self.attrs, &other.attrs);
        self
    }

    /// Connects this edge to a node.
    ///
    /// A detached edge binds `other` as its source and is returned
    /// unchanged; a bound edge is registered on the active diagram from
    /// its source to `other`. Calling `connect` twice therefore first
    /// attaches a source, then draws the edge.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveScope` when a bound edge is connected outside an
    /// active diagram.
    pub fn connect(mut self, other: &Node) -> Result<Edge, ArmatureError> {
        match self.source.clone() {
            None => {
                self.source = Some(other.clone());
                Ok(self)
            }
            Some(source) => {
                source.connect_via(other, self.clone())?;
                Ok(self)
            }
        }
    }

    /// Registers this edge from its bound source to every target,
    /// returning the targets for chaining.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperand` for a detached edge and `NoActiveScope`
    /// outside an active diagram.
    pub fn connect_all(&self, targets: &[Node]) -> Result<Vec<Node>, ArmatureError> {
        let source = self.source.clone().ok_or(ArmatureError::InvalidOperand(
            "a detached edge cannot broadcast, bind a source node first",
        ))?;
        targets
            .iter()
            .map(|target| source.connect_via(target, self.clone()))
            .collect()
    }

    /// Rebuilds a chain of operands with this edge's style.
    ///
    /// Existing edges come back with this edge's attributes and with the
    /// given direction flags (falling back to this edge's own flags);
    /// plain nodes come back as fresh edges bound to them. Nothing is
    /// registered on the diagram; the returned edges still need to be
    /// connected.
    pub fn append(&self, items: &[Link], forward: Option<bool>, reverse: Option<bool>) -> Vec<Edge> {
        let forward = forward.unwrap_or(self.forward);
        let reverse = reverse.unwrap_or(self.reverse);
        items
            .iter()
            .map(|item| match item {
                Link::Edge(edge) => {
                    let mut adopted = edge.clone();
                    adopted.forward = forward;
                    adopted.reverse = reverse;
                    adopted.attrs = self.attrs.clone();
                    adopted
                }
                Link::Node(node) => Edge {
                    source: Some(node.clone()),
                    forward,
                    reverse,
                    attrs: self.attrs.clone(),
                },
            })
            .collect()
    }

    pub(crate) fn base_attrs(&self) -> &AttrMap {
        &self.attrs
    }

    /// Binds `source` unless a source is already set.
    pub(crate) fn bound_to(mut self, source: &Node) -> Edge {
        if self.source.is_none() {
            self.source = Some(source.clone());
        }
        self
    }
}

impl Default for Edge {
    fn default() -> Self {
        Edge::new()
    }
}
