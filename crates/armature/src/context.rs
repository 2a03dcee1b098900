//! Ambient scope registry.
//!
//! Constructors consult this registry instead of taking explicit parent
//! references, which is what lets nested scopes register their children
//! implicitly. The registry is thread-local, so independent diagrams can be
//! built concurrently from different threads without corrupting each other.
//! Within one thread, nesting is a strict stack: every guard restores the
//! enclosing value when dropped, including on error and panic paths.

use std::cell::RefCell;

use crate::diagram::Diagram;
use crate::error::ArmatureError;
use crate::scope::ScopeRef;

thread_local! {
    static DIAGRAM: RefCell<Option<Diagram>> = const { RefCell::new(None) };
    static SCOPE: RefCell<Option<ScopeRef>> = const { RefCell::new(None) };
}

/// Returns the active diagram.
///
/// Every node construction and every connection must resolve through the
/// single active diagram, so the absence of one is an error. `operation`
/// names the caller for the error message.
pub(crate) fn active_diagram(operation: &'static str) -> Result<Diagram, ArmatureError> {
    DIAGRAM
        .with(|slot| slot.borrow().clone())
        .ok_or(ArmatureError::NoActiveScope(operation))
}

/// Returns the innermost active container scope, if any.
///
/// Unlike [`active_diagram`] this never fails: root-level nodes, parented
/// directly by the diagram, are legal.
pub(crate) fn active_scope() -> Option<ScopeRef> {
    SCOPE.with(|slot| slot.borrow().clone())
}

/// Installs `diagram` as the active diagram until the guard is dropped.
pub(crate) fn enter_diagram(diagram: Diagram) -> DiagramGuard {
    let previous = DIAGRAM.with(|slot| slot.replace(Some(diagram)));
    DiagramGuard { previous }
}

/// Installs `scope` as the active container scope until the guard is dropped.
pub(crate) fn enter_scope(scope: ScopeRef) -> ScopeGuard {
    let previous = SCOPE.with(|slot| slot.replace(Some(scope)));
    ScopeGuard { previous }
}

/// Restores the previously active diagram on drop.
pub(crate) struct DiagramGuard {
    previous: Option<Diagram>,
}

impl Drop for DiagramGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        DIAGRAM.with(|slot| *slot.borrow_mut() = previous);
    }
}

/// Restores the previously active container scope on drop.
pub(crate) struct ScopeGuard {
    previous: Option<ScopeRef>,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        SCOPE.with(|slot| *slot.borrow_mut() = previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::Cluster;
    use crate::diagram::{Diagram, DiagramOptions};

    fn test_diagram(name: &str) -> Diagram {
        Diagram::new(name, DiagramOptions::default()).unwrap()
    }

    #[test]
    fn test_no_diagram_is_an_error() {
        let err = active_diagram("a test operation").unwrap_err();
        assert!(matches!(err, ArmatureError::NoActiveScope(_)));
    }

    #[test]
    fn test_no_scope_is_legal() {
        assert!(active_scope().is_none());
    }

    #[test]
    fn test_guard_restores_previous_diagram() {
        let outer = test_diagram("outer");
        let inner = test_diagram("inner");

        let outer_guard = enter_diagram(outer);
        {
            let _inner_guard = enter_diagram(inner);
            assert_eq!(active_diagram("test").unwrap().name(), "inner");
        }
        assert_eq!(active_diagram("test").unwrap().name(), "outer");
        drop(outer_guard);
        assert!(active_diagram("test").is_err());
    }

    #[test]
    fn test_nested_scopes_restore_to_parent_not_null() {
        let diagram = test_diagram("ctx");
        let _diagram_guard = enter_diagram(diagram);

        let outer = Cluster::new("outer").unwrap();
        let inner = Cluster::new("inner").unwrap();

        let outer_guard = enter_scope(ScopeRef::Cluster(outer.clone()));
        {
            let _inner_guard = enter_scope(ScopeRef::Cluster(inner));
            assert!(active_scope().is_some());
        }
        // exiting the nested scope restores the enclosing cluster
        match active_scope() {
            Some(ScopeRef::Cluster(cluster)) => assert_eq!(cluster.label(), "outer"),
            other => panic!("expected the outer cluster, got {:?}", other.is_some()),
        }
        drop(outer_guard);
        assert!(active_scope().is_none());
    }

    #[test]
    fn test_guard_restores_on_panic() {
        let diagram = test_diagram("ctx");
        let _diagram_guard = enter_diagram(diagram);

        let result = std::panic::catch_unwind(|| {
            let cluster = Cluster::new("doomed").unwrap();
            let _guard = enter_scope(ScopeRef::Cluster(cluster));
            panic!("body failed");
        });

        assert!(result.is_err());
        assert!(active_scope().is_none());
    }
}
