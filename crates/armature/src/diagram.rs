//! The root scope: owns the edge table and drives rendering.

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::{Rc, Weak};

use dot_structures::Graph;
use log::{debug, info, warn};
use serde::Deserialize;

use armature_core::attr::{self, AttrMap};
use armature_core::direction::Direction;
use armature_core::id::{IdSource, RandomIdSource};
use armature_core::output::{CurveStyle, OutputFormat};

use crate::backend::{self, GraphBody};
use crate::context;
use crate::edge::Edge;
use crate::error::ArmatureError;
use crate::node::Node;
use crate::scope::ScopeCore;

const DEFAULT_GRAPH_ATTRS: [(&str, &str); 7] = [
    ("pad", "2.0"),
    ("splines", "ortho"),
    ("nodesep", "0.60"),
    ("ranksep", "0.75"),
    ("fontname", "Sans-Serif"),
    ("fontsize", "15"),
    ("fontcolor", "#2D3436"),
];

const DEFAULT_NODE_ATTRS: [(&str, &str); 10] = [
    ("shape", "box"),
    ("style", "rounded"),
    ("fixedsize", "true"),
    ("width", "1.4"),
    ("height", "1.4"),
    ("labelloc", "b"),
    ("imagescale", "true"),
    ("fontname", "Sans-Serif"),
    ("fontsize", "13"),
    ("fontcolor", "#2D3436"),
];

const DEFAULT_EDGE_ATTRS: [(&str, &str); 1] = [("color", "#7B8894")];

/// Options accepted by [`Diagram::new`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiagramOptions {
    /// Output filename without extension. Derived from the diagram name
    /// when empty.
    pub filename: String,
    /// Data-flow direction, one of `TB`, `BT`, `LR`, `RL`.
    pub direction: String,
    /// Edge bending style, one of `ortho`, `curved`.
    pub curvestyle: String,
    /// Artifact format, one of `png`, `jpg`, `svg`, `pdf`.
    pub outformat: String,
    /// Open the rendered artifact after a successful render.
    pub show: bool,
    /// Graph attributes merged over the defaults.
    pub graph_attr: AttrMap,
    /// Default node attributes merged over the built-in set.
    pub node_attr: AttrMap,
    /// Default edge attributes merged over the built-in set.
    pub edge_attr: AttrMap,
}

impl Default for DiagramOptions {
    fn default() -> Self {
        DiagramOptions {
            filename: String::new(),
            direction: "LR".to_string(),
            curvestyle: "ortho".to_string(),
            outformat: "png".to_string(),
            show: true,
            graph_attr: AttrMap::new(),
            node_attr: AttrMap::new(),
            edge_attr: AttrMap::new(),
        }
    }
}

/// A registered connection. Connections are kept in creation order, so
/// distinct edges between the same pair of nodes are all preserved.
#[derive(Debug, Clone)]
struct Connection {
    source: Node,
    target: Node,
    edge: Edge,
}

/// The root scope of a scene graph.
///
/// A diagram owns the global edge table and every cluster and node
/// transitively reachable from it. The whole model is transient: it is
/// built inside [`Diagram::draw`] and torn down when the call returns,
/// leaving only the rendered artifact.
///
/// # Examples
///
/// ```rust,no_run
/// use armature::{Diagram, DiagramOptions, Node};
///
/// let artifact = Diagram::new("Event Flow", DiagramOptions::default())?.draw(|_| {
///     let source = Node::new("producer")?;
///     let sink = Node::new("consumer")?;
///     source.connect_forward(&sink)?;
///     Ok(())
/// })?;
/// println!("rendered {}", artifact.display());
/// # Ok::<(), armature::ArmatureError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Diagram {
    pub(crate) inner: Rc<RefCell<DiagramInner>>,
}

#[derive(Debug)]
pub(crate) struct DiagramInner {
    name: String,
    filename: String,
    outformat: OutputFormat,
    show: bool,
    pub(crate) core: ScopeCore,
    edges: Vec<Connection>,
    ids: Box<dyn IdSource>,
}

impl Diagram {
    /// Creates a diagram with random node ids.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDirection`, `InvalidCurveStyle`, or
    /// `InvalidOutputFormat` for bad option values. Validation happens
    /// before any backend graph state is touched.
    pub fn new(name: &str, options: DiagramOptions) -> Result<Diagram, ArmatureError> {
        Self::with_id_source(name, options, Box::new(RandomIdSource))
    }

    /// Creates a diagram drawing node ids from `ids`.
    ///
    /// Injecting a deterministic source makes two identical builds print
    /// identical graph descriptions, which is how reproducible output is
    /// tested.
    pub fn with_id_source(
        name: &str,
        options: DiagramOptions,
        ids: Box<dyn IdSource>,
    ) -> Result<Diagram, ArmatureError> {
        let direction: Direction = options.direction.parse()?;
        let curvestyle: CurveStyle = options.curvestyle.parse()?;
        let outformat: OutputFormat = options.outformat.parse()?;

        let filename = if name.is_empty() && options.filename.is_empty() {
            "diagrams_image".to_string()
        } else if options.filename.is_empty() {
            name.split_whitespace()
                .collect::<Vec<_>>()
                .join("_")
                .to_lowercase()
        } else {
            options.filename.clone()
        };

        // Edges may cross cluster boundaries, which the layout engine
        // only honors on a compound graph.
        let mut graph_attrs = AttrMap::new();
        graph_attrs.insert("compound".to_string(), "true".to_string());
        attr::merge(&mut graph_attrs, &attr::from_pairs(&DEFAULT_GRAPH_ATTRS));
        graph_attrs.insert("label".to_string(), name.to_string());
        graph_attrs.insert("rankdir".to_string(), direction.as_str().to_string());
        graph_attrs.insert("splines".to_string(), curvestyle.as_str().to_string());
        attr::merge(&mut graph_attrs, &options.graph_attr);

        let mut node_attrs = attr::from_pairs(&DEFAULT_NODE_ATTRS);
        attr::merge(&mut node_attrs, &options.node_attr);
        let mut edge_attrs = attr::from_pairs(&DEFAULT_EDGE_ATTRS);
        attr::merge(&mut edge_attrs, &options.edge_attr);

        let mut body = GraphBody::new(name);
        body.set_graph_attrs(&graph_attrs);
        body.set_node_defaults(&node_attrs);
        body.set_edge_defaults(&edge_attrs);

        Ok(Diagram {
            inner: Rc::new(RefCell::new(DiagramInner {
                name: name.to_string(),
                filename,
                outformat,
                show: options.show,
                core: ScopeCore::new(body, direction, 0, None),
                edges: Vec::new(),
                ids,
            })),
        })
    }

    /// Assembles the scene graph by running `body` with this diagram as
    /// the ambient context, then renders it.
    ///
    /// On exit the edge table is resolved (endpoints that are non-empty
    /// scopes are rewritten to boundary anchors), the description is
    /// handed to the layout engine, the artifact is optionally opened,
    /// and the intermediate DOT file is removed. Returns the artifact
    /// path.
    ///
    /// # Errors
    ///
    /// Propagates errors from `body` and fails with `Render` when the
    /// layout engine cannot produce the artifact. Failure to remove the
    /// intermediate file is logged, not fatal.
    pub fn draw<F>(self, body: F) -> Result<PathBuf, ArmatureError>
    where
        F: FnOnce(&Diagram) -> Result<(), ArmatureError>,
    {
        let (filename, outformat, show) = {
            let inner = self.inner.borrow();
            (inner.filename.clone(), inner.outformat, inner.show)
        };

        let graph = self.assemble(body)?;
        let dot_source = backend::print(&graph);

        let source_path = PathBuf::from(&filename);
        fs::write(&source_path, &dot_source)?;

        let artifact = PathBuf::from(format!("{filename}.{}", outformat.extension()));
        backend::layout(dot_source, &artifact, outformat)?;
        info!(artifact = artifact.display().to_string(); "diagram rendered");

        if show {
            backend::open(&artifact);
        }

        // Only the rendered image persists. Losing the cleanup must not
        // mask a successful render.
        if let Err(err) = fs::remove_file(&source_path) {
            warn!(path = source_path.display().to_string(); "failed to remove intermediate DOT file: {err}");
        }

        Ok(artifact)
    }

    /// Assembles the scene graph and returns its DOT source without
    /// invoking the layout engine or touching the filesystem.
    pub fn dot<F>(self, body: F) -> Result<String, ArmatureError>
    where
        F: FnOnce(&Diagram) -> Result<(), ArmatureError>,
    {
        let graph = self.assemble(body)?;
        Ok(backend::print(&graph))
    }

    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    /// Output filename without extension.
    pub fn filename(&self) -> String {
        self.inner.borrow().filename.clone()
    }

    /// Registers a connection on the global edge table.
    pub(crate) fn insert_edge(&self, source: &Node, target: &Node, edge: Edge) {
        self.inner.borrow_mut().edges.push(Connection {
            source: source.clone(),
            target: target.clone(),
            edge,
        });
    }

    pub(crate) fn next_node_id(&self) -> String {
        self.inner.borrow_mut().ids.next_id()
    }

    pub(crate) fn with_core<R>(&self, f: impl FnOnce(&mut ScopeCore) -> R) -> R {
        f(&mut self.inner.borrow_mut().core)
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<DiagramInner>> {
        Rc::downgrade(&self.inner)
    }

    fn assemble<F>(&self, body: F) -> Result<Graph, ArmatureError>
    where
        F: FnOnce(&Diagram) -> Result<(), ArmatureError>,
    {
        debug!(name = self.name(); "assembling diagram");

        let guard = context::enter_diagram(self.clone());
        let result = body(self);
        // The ambient context is restored before anything else happens,
        // even when the body failed.
        drop(guard);
        result?;

        self.inner.borrow_mut().core.emit_members();
        self.resolve_edges();

        let body = self.inner.borrow().core.body.clone();
        Ok(body.into_graph())
    }

    /// Walks the edge table in creation order, rewriting endpoints that
    /// are themselves non-empty scopes: the edge anchors at the scope
    /// boundary while the rendered endpoint becomes the scope's first
    /// node in depth-first order. The layout engine only draws edges
    /// between concrete vertices, so this is what makes an edge "from a
    /// cluster" terminate at the cluster border.
    fn resolve_edges(&self) {
        let connections = {
            let mut inner = self.inner.borrow_mut();
            std::mem::take(&mut inner.edges)
        };

        let mut resolved = Vec::with_capacity(connections.len());
        for Connection {
            source,
            target,
            edge,
        } in connections
        {
            let mut attrs = edge.base_attrs().clone();

            let mut tail = source.id();
            let members = source.nodes();
            if let Some(first) = members.first() {
                attrs.insert("ltail".to_string(), tail);
                tail = first.id();
            }

            let mut head = target.id();
            let members = target.nodes();
            if let Some(first) = members.first() {
                attrs.insert("lhead".to_string(), head);
                head = first.id();
            }

            attrs.insert("dir".to_string(), edge.direction().to_string());
            resolved.push((tail, head, attrs));
        }

        let mut inner = self.inner.borrow_mut();
        for (tail, head, attrs) in resolved {
            inner.core.body.add_edge(&tail, &head, &attrs);
        }
    }
}
