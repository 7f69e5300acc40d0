//! Per-operation execution context
//!
//! A [`HoldContext`] lives for one logical operation on one call stack. It
//! tracks who is acting (the authenticated user plus any temporary
//! elevation) and which nodes the engine is currently mutating
//! mechanically, so guards and host behaviours can skip them.

use lexhold_core::{Actor, NodeId};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

/// Kinds of per-operation suppression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suppression {
    /// The frozen-node guard ignores the node
    FrozenGuard,
    /// The before-delete behaviour ignores the node
    BeforeDeleteNode,
}

/// Actor stack and suppression sets for one operation.
#[derive(Debug)]
pub struct HoldContext {
    authenticated: Actor,
    elevated: Actor,
    actors: RefCell<Vec<Actor>>,
    suppressed: RefCell<HashMap<Suppression, HashSet<NodeId>>>,
    depth: Cell<usize>,
}

impl HoldContext {
    /// Context for `authenticated`, elevating to `elevated` on demand.
    pub fn new(authenticated: Actor, elevated: Actor) -> Self {
        Self {
            actors: RefCell::new(vec![authenticated.clone()]),
            authenticated,
            elevated,
            suppressed: RefCell::new(HashMap::new()),
            depth: Cell::new(0),
        }
    }

    /// The user who started the operation. Never changes.
    pub fn authenticated(&self) -> &Actor {
        &self.authenticated
    }

    /// The actor permission checks run as right now.
    pub fn effective_actor(&self) -> Actor {
        self.actors
            .borrow()
            .last()
            .cloned()
            .unwrap_or_else(|| self.authenticated.clone())
    }

    pub fn is_elevated(&self) -> bool {
        self.effective_actor().is_system()
    }

    /// Push the elevated actor until the returned guard drops.
    pub fn elevate(&self) -> ElevationGuard<'_> {
        self.actors.borrow_mut().push(self.elevated.clone());
        ElevationGuard { ctx: self }
    }

    /// Run `work` as the elevated actor, restoring the previous actor on
    /// every exit path.
    pub fn run_as_system<T>(&self, work: impl FnOnce() -> T) -> T {
        let _elevated = self.elevate();
        work()
    }

    pub fn suppress(&self, kind: Suppression, node: NodeId) {
        self.suppressed
            .borrow_mut()
            .entry(kind)
            .or_default()
            .insert(node);
    }

    pub fn is_suppressed(&self, kind: Suppression, node: NodeId) -> bool {
        self.suppressed
            .borrow()
            .get(&kind)
            .map(|nodes| nodes.contains(&node))
            .unwrap_or(false)
    }

    /// Mark the start of an engine operation. Suppressions are cleared when
    /// the outermost operation's guard drops.
    pub(crate) fn enter(&self) -> OperationGuard<'_> {
        self.depth.set(self.depth.get() + 1);
        OperationGuard { ctx: self }
    }
}

/// Restores the previous effective actor on drop.
#[must_use = "elevation ends when the guard is dropped"]
pub struct ElevationGuard<'a> {
    ctx: &'a HoldContext,
}

impl Drop for ElevationGuard<'_> {
    fn drop(&mut self) {
        let mut actors = self.ctx.actors.borrow_mut();
        if actors.len() > 1 {
            actors.pop();
        }
    }
}

#[must_use]
pub(crate) struct OperationGuard<'a> {
    ctx: &'a HoldContext,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        let depth = self.ctx.depth.get().saturating_sub(1);
        self.ctx.depth.set(depth);
        if depth == 0 {
            self.ctx.suppressed.borrow_mut().clear();
        }
    }
}
