//! Graphviz backend adapter.
//!
//! Each scope exclusively owns a [`GraphBody`], its contribution to the
//! textual DOT description. Bodies nest when a parent scope embeds its
//! children, and the diagram's root body is printed and handed to the
//! external `dot` process for layout and rasterization. The core never
//! computes layout itself.

use std::path::Path;
use std::process::Command;

use dot_structures::{
    Attribute, Edge as DotEdge, EdgeTy, Graph, GraphAttributes, Id, Node as DotNode, NodeId, Stmt,
    Subgraph, Vertex,
};
use graphviz_rust::cmd::{CommandArg, Format};
use graphviz_rust::printer::{DotPrinter, PrinterContext};
use log::warn;

use armature_core::attr::AttrMap;
use armature_core::output::OutputFormat;

use crate::error::ArmatureError;

/// One scope's contribution to the DOT description.
///
/// A body accumulates graph attributes, default node/edge attributes,
/// nodes, edges, and nested subgraphs in insertion order, so identical
/// builds print identical descriptions.
#[derive(Debug, Clone)]
pub(crate) struct GraphBody {
    name: String,
    stmts: Vec<Stmt>,
}

impl GraphBody {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        GraphBody {
            name: name.into(),
            stmts: Vec::new(),
        }
    }

    /// Renames the graph. Used when a node re-identifies as a cluster on
    /// container exit.
    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Sets graph-level attributes, one statement per entry.
    pub(crate) fn set_graph_attrs(&mut self, attrs: &AttrMap) {
        for (key, value) in attrs {
            self.stmts.push(Stmt::Attribute(attribute(key, value)));
        }
    }

    /// Sets the default attributes applied to every node in this graph.
    pub(crate) fn set_node_defaults(&mut self, attrs: &AttrMap) {
        self.stmts
            .push(Stmt::GAttribute(GraphAttributes::Node(attributes(attrs))));
    }

    /// Sets the default attributes applied to every edge in this graph.
    pub(crate) fn set_edge_defaults(&mut self, attrs: &AttrMap) {
        self.stmts
            .push(Stmt::GAttribute(GraphAttributes::Edge(attributes(attrs))));
    }

    /// Emits a node with its label and accumulated attributes.
    pub(crate) fn add_node(&mut self, id: &str, label: &str, attrs: &AttrMap) {
        let mut node_attrs = vec![attribute("label", label)];
        node_attrs.extend(attributes(attrs));
        self.stmts.push(Stmt::Node(DotNode {
            id: node_id(id),
            attributes: node_attrs,
        }));
    }

    /// Emits a directed edge between two concrete vertices.
    pub(crate) fn add_edge(&mut self, tail: &str, head: &str, attrs: &AttrMap) {
        self.stmts.push(Stmt::Edge(DotEdge {
            ty: EdgeTy::Pair(Vertex::N(node_id(tail)), Vertex::N(node_id(head))),
            attributes: attributes(attrs),
        }));
    }

    /// Embeds a finished child body as a nested subgraph.
    pub(crate) fn add_subgraph(&mut self, child: GraphBody) {
        self.stmts.push(Stmt::Subgraph(child.into_subgraph()));
    }

    /// Finishes this body as the root digraph of a diagram.
    pub(crate) fn into_graph(self) -> Graph {
        Graph::DiGraph {
            id: quoted(&self.name),
            strict: false,
            stmts: self.stmts,
        }
    }

    fn into_subgraph(self) -> Subgraph {
        Subgraph {
            id: quoted(&self.name),
            stmts: self.stmts,
        }
    }
}

/// Prints the assembled graph as DOT source.
pub(crate) fn print(graph: &Graph) -> String {
    graph.print(&mut PrinterContext::default())
}

/// Hands the DOT source to the layout engine, producing `artifact`.
///
/// Rendering is fatal when it fails: no diagram can be produced without
/// the external engine.
pub(crate) fn layout(
    dot_source: String,
    artifact: &Path,
    format: OutputFormat,
) -> Result<(), ArmatureError> {
    let args = vec![
        CommandArg::Format(format_arg(format)),
        CommandArg::Output(artifact.display().to_string()),
    ];
    graphviz_rust::exec_dot(dot_source, args)
        .map_err(|err| ArmatureError::Render(err.to_string()))?;
    Ok(())
}

/// Opens the rendered artifact with the platform viewer. Best effort: a
/// missing viewer must not fail a successful render.
pub(crate) fn open(artifact: &Path) {
    let mut command = viewer_command(artifact);
    if let Err(err) = command.spawn() {
        warn!(artifact = artifact.display().to_string(); "failed to open viewer: {err}");
    }
}

#[cfg(target_os = "macos")]
fn viewer_command(artifact: &Path) -> Command {
    let mut command = Command::new("open");
    command.arg(artifact);
    command
}

#[cfg(target_os = "windows")]
fn viewer_command(artifact: &Path) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", ""]).arg(artifact);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn viewer_command(artifact: &Path) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(artifact);
    command
}

fn format_arg(format: OutputFormat) -> Format {
    match format {
        OutputFormat::Png => Format::Png,
        OutputFormat::Jpg => Format::Jpg,
        OutputFormat::Svg => Format::Svg,
        OutputFormat::Pdf => Format::Pdf,
    }
}

fn node_id(id: &str) -> NodeId {
    NodeId(quoted(id), None)
}

fn attribute(key: &str, value: &str) -> Attribute {
    Attribute(Id::Plain(key.to_string()), attr_value(value))
}

fn attributes(attrs: &AttrMap) -> Vec<Attribute> {
    attrs
        .iter()
        .map(|(key, value)| attribute(key, value))
        .collect()
}

/// Picks the DOT identifier form for an attribute value. Values wrapped in
/// angle brackets are HTML-like labels and must pass through unquoted.
fn attr_value(value: &str) -> Id {
    if value.starts_with('<') && value.ends_with('>') {
        Id::Html(value.to_string())
    } else {
        quoted(value)
    }
}

fn quoted(value: &str) -> Id {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    Id::Escaped(format!("\"{escaped}\""))
}

/// Escapes text for use inside an HTML-like label.
pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use armature_core::attr;

    use super::*;

    #[test]
    fn test_quoted_escapes_quotes_and_newlines() {
        assert_eq!(
            quoted("a \"b\"\nc"),
            Id::Escaped("\"a \\\"b\\\"\\nc\"".to_string())
        );
    }

    #[test]
    fn test_attr_value_detects_html_labels() {
        assert!(matches!(attr_value("<<TABLE></TABLE>>"), Id::Html(_)));
        assert!(matches!(attr_value("plain"), Id::Escaped(_)));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_html("\"x\"'"), "&quot;x&quot;&#x27;");
    }

    #[test]
    fn test_body_prints_nodes_edges_and_subgraphs() {
        let mut child = GraphBody::new("cluster_inner");
        child.set_graph_attrs(&attr::from_pairs(&[("label", "inner")]));
        child.add_node("n1", "web", &AttrMap::new());

        let mut root = GraphBody::new("demo");
        root.add_node("n0", "db", &attr::from_pairs(&[("shape", "cylinder")]));
        root.add_subgraph(child);
        root.add_edge("n0", "n1", &attr::from_pairs(&[("dir", "forward")]));

        let printed = print(&root.into_graph());
        assert!(printed.contains("digraph \"demo\""));
        assert!(printed.contains("subgraph \"cluster_inner\""));
        assert!(printed.contains("label=\"db\""));
        assert!(printed.contains("shape=\"cylinder\""));
        assert!(printed.contains("dir=\"forward\""));
    }
}
