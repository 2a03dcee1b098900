//! Armature - declarative architecture diagrams rendered through Graphviz.
//!
//! Diagrams are assembled as an in-memory scene graph: a [`Diagram`] is
//! the root scope, a [`Cluster`] groups related nodes, and a [`Node`] can
//! itself be used as a container for sub-nodes. Scopes register their
//! children through an ambient, thread-local context, so nested
//! constructors need no explicit parent references. Connections are
//! collected on the diagram and resolved when the scene is complete;
//! layout and rasterization are delegated to the external `dot` engine.
//!
//! # Examples
//!
//! ```rust,no_run
//! use armature::{Cluster, Diagram, DiagramOptions, Node};
//!
//! Diagram::new("Web Services", DiagramOptions::default())?.draw(|_| {
//!     let lb = Node::new("load balancer")?;
//!     let db = Node::new("database")?;
//!
//!     let workers = Cluster::new("workers")?;
//!     let pool = workers.within(|_| {
//!         Ok(vec![Node::new("worker-1")?, Node::new("worker-2")?])
//!     })?;
//!
//!     lb.connect_all_forward(&pool)?;
//!     for worker in &pool {
//!         worker.connect_forward(&db)?;
//!     }
//!     Ok(())
//! })?;
//! # Ok::<(), armature::ArmatureError>(())
//! ```

pub mod icons;

mod backend;
mod cluster;
mod context;
mod diagram;
mod edge;
mod error;
mod node;
mod scope;

pub use armature_core::attr::AttrMap;
pub use armature_core::direction::Direction;
pub use armature_core::error::ValueError;
pub use armature_core::id::{IdSource, RandomIdSource, SequentialIdSource};
pub use armature_core::output::{CurveStyle, OutputFormat};
pub use armature_core::palette;

pub use cluster::{Cluster, ClusterOptions};
pub use diagram::{Diagram, DiagramOptions};
pub use edge::{Edge, Link};
pub use error::ArmatureError;
pub use node::{Node, NodeOptions};
