//! Icon asset resolution.
//!
//! Icon packs are laid out on disk as
//! `<root>/<provider>/<category>/<name>.png`. The catalog resolves a
//! provider, category, and name triple to an image path, or `None` when
//! no asset is configured for that type. Resolution never fails: a
//! missing icon simply renders the node as a label-only box.

use std::path::PathBuf;

/// Resolves node-type icons from an on-disk icon pack.
#[derive(Debug, Clone)]
pub struct IconCatalog {
    root: PathBuf,
}

impl IconCatalog {
    /// Creates a catalog rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        IconCatalog { root: root.into() }
    }

    /// Resolves a node type to its icon path.
    ///
    /// Returns `None` when the asset does not exist on disk.
    pub fn resolve(&self, provider: &str, category: &str, name: &str) -> Option<PathBuf> {
        let path = self
            .root
            .join(provider)
            .join(category)
            .join(format!("{name}.png"));
        path.is_file().then_some(path)
    }
}
