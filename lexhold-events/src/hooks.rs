//! Hook points, events and the handler trait.

use lexhold_core::{HoldResult, NodeId};
use serde::{Deserialize, Serialize};

/// Points in the hold lifecycle where handlers can hook in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookPoint {
    /// Before a hold is created
    BeforeCreateHold,
    /// After a hold is created
    OnCreateHold,
    /// Before a hold is deleted
    BeforeDeleteHold,
    /// After a hold is deleted
    OnDeleteHold,
    /// Before an item joins a hold
    BeforeAddToHold,
    /// After an item joined a hold
    OnAddToHold,
    /// Before an item leaves a hold
    BeforeRemoveFromHold,
    /// After an item left a hold
    OnRemoveFromHold,
}

impl HookPoint {
    pub const ALL: [HookPoint; 8] = [
        HookPoint::BeforeCreateHold,
        HookPoint::OnCreateHold,
        HookPoint::BeforeDeleteHold,
        HookPoint::OnDeleteHold,
        HookPoint::BeforeAddToHold,
        HookPoint::OnAddToHold,
        HookPoint::BeforeRemoveFromHold,
        HookPoint::OnRemoveFromHold,
    ];

    /// Whether the point fires before its mutation.
    pub fn is_before(&self) -> bool {
        matches!(
            self,
            HookPoint::BeforeCreateHold
                | HookPoint::BeforeDeleteHold
                | HookPoint::BeforeAddToHold
                | HookPoint::BeforeRemoveFromHold
        )
    }
}

impl std::fmt::Display for HookPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BeforeCreateHold => write!(f, "before_create_hold"),
            Self::OnCreateHold => write!(f, "on_create_hold"),
            Self::BeforeDeleteHold => write!(f, "before_delete_hold"),
            Self::OnDeleteHold => write!(f, "on_delete_hold"),
            Self::BeforeAddToHold => write!(f, "before_add_to_hold"),
            Self::OnAddToHold => write!(f, "on_add_to_hold"),
            Self::BeforeRemoveFromHold => write!(f, "before_remove_from_hold"),
            Self::OnRemoveFromHold => write!(f, "on_remove_from_hold"),
        }
    }
}

/// Arguments passed to a handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "point", rename_all = "snake_case")]
pub enum HoldEvent {
    BeforeCreateHold { name: String, reason: String },
    OnCreateHold { hold: NodeId },
    BeforeDeleteHold { hold: NodeId },
    OnDeleteHold { name: String },
    BeforeAddToHold { hold: NodeId, item: NodeId },
    OnAddToHold { hold: NodeId, item: NodeId },
    BeforeRemoveFromHold { hold: NodeId, item: NodeId },
    OnRemoveFromHold { hold: NodeId, item: NodeId },
}

impl HoldEvent {
    pub fn hook_point(&self) -> HookPoint {
        match self {
            HoldEvent::BeforeCreateHold { .. } => HookPoint::BeforeCreateHold,
            HoldEvent::OnCreateHold { .. } => HookPoint::OnCreateHold,
            HoldEvent::BeforeDeleteHold { .. } => HookPoint::BeforeDeleteHold,
            HoldEvent::OnDeleteHold { .. } => HookPoint::OnDeleteHold,
            HoldEvent::BeforeAddToHold { .. } => HookPoint::BeforeAddToHold,
            HoldEvent::OnAddToHold { .. } => HookPoint::OnAddToHold,
            HoldEvent::BeforeRemoveFromHold { .. } => HookPoint::BeforeRemoveFromHold,
            HoldEvent::OnRemoveFromHold { .. } => HookPoint::OnRemoveFromHold,
        }
    }

    /// The hold the event is about, when it still has an id.
    pub fn hold(&self) -> Option<NodeId> {
        match self {
            HoldEvent::OnCreateHold { hold }
            | HoldEvent::BeforeDeleteHold { hold }
            | HoldEvent::BeforeAddToHold { hold, .. }
            | HoldEvent::OnAddToHold { hold, .. }
            | HoldEvent::BeforeRemoveFromHold { hold, .. }
            | HoldEvent::OnRemoveFromHold { hold, .. } => Some(*hold),
            HoldEvent::BeforeCreateHold { .. } | HoldEvent::OnDeleteHold { .. } => None,
        }
    }

    /// The held item, for membership events.
    pub fn item(&self) -> Option<NodeId> {
        match self {
            HoldEvent::BeforeAddToHold { item, .. }
            | HoldEvent::OnAddToHold { item, .. }
            | HoldEvent::BeforeRemoveFromHold { item, .. }
            | HoldEvent::OnRemoveFromHold { item, .. } => Some(*item),
            _ => None,
        }
    }
}

/// Handler for hold lifecycle events.
///
/// An error returned from a `before` handler aborts the operation before it
/// mutates anything.
pub trait HoldHook: Send + Sync {
    fn handle(&self, event: &HoldEvent) -> HoldResult<()>;
}

impl<F> HoldHook for F
where
    F: Fn(&HoldEvent) -> HoldResult<()> + Send + Sync,
{
    fn handle(&self, event: &HoldEvent) -> HoldResult<()> {
        self(event)
    }
}
