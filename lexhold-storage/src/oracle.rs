//! Permission oracle

use lexhold_core::{
    AccessError, AccessStatus, Actor, Capability, HoldResult, NodeId, Permission, StorageError,
};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// Answers permission and capability questions about nodes.
///
/// Implementations must allow everything for a system actor. An `Err` from
/// either method means the oracle itself could not decide.
pub trait PermissionOracle: Send + Sync {
    fn has_permission(
        &self,
        actor: &Actor,
        node: NodeId,
        permission: Permission,
    ) -> HoldResult<AccessStatus>;

    fn capability_access_state(
        &self,
        actor: &Actor,
        node: NodeId,
        capability: Capability,
    ) -> HoldResult<AccessStatus>;
}

#[derive(Debug, Default)]
struct DenyLists {
    permissions: HashSet<(String, NodeId, Permission)>,
    capabilities: HashSet<(String, NodeId, Capability)>,
    failing: HashSet<NodeId>,
}

/// Allow-by-default oracle with explicit deny lists.
#[derive(Debug, Clone, Default)]
pub struct MockPermissionOracle {
    deny: Arc<RwLock<DenyLists>>,
}

impl MockPermissionOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deny `permission` on `node` to the user named `actor`.
    pub fn deny_permission(&self, actor: &str, node: NodeId, permission: Permission) -> HoldResult<()> {
        let mut deny = self.deny.write().map_err(|_| StorageError::LockPoisoned)?;
        deny.permissions.insert((actor.to_string(), node, permission));
        Ok(())
    }

    /// Deny `capability` on `node` to the user named `actor`.
    pub fn deny_capability(&self, actor: &str, node: NodeId, capability: Capability) -> HoldResult<()> {
        let mut deny = self.deny.write().map_err(|_| StorageError::LockPoisoned)?;
        deny.capabilities.insert((actor.to_string(), node, capability));
        Ok(())
    }

    /// Make permission checks on `node` fail instead of answering.
    pub fn fail_on(&self, node: NodeId) -> HoldResult<()> {
        let mut deny = self.deny.write().map_err(|_| StorageError::LockPoisoned)?;
        deny.failing.insert(node);
        Ok(())
    }

    /// Drop every deny entry.
    pub fn allow_all(&self) -> HoldResult<()> {
        let mut deny = self.deny.write().map_err(|_| StorageError::LockPoisoned)?;
        *deny = DenyLists::default();
        Ok(())
    }
}

impl PermissionOracle for MockPermissionOracle {
    fn has_permission(
        &self,
        actor: &Actor,
        node: NodeId,
        permission: Permission,
    ) -> HoldResult<AccessStatus> {
        if actor.is_system() {
            return Ok(AccessStatus::Allowed);
        }
        let deny = self.deny.read().map_err(|_| StorageError::LockPoisoned)?;
        if deny.failing.contains(&node) {
            return Err(AccessError::HoldPermission {
                reason: format!("permission check on {} failed", node),
            }
            .into());
        }
        let denied = deny
            .permissions
            .contains(&(actor.name().to_string(), node, permission));
        Ok(AccessStatus::from(!denied))
    }

    fn capability_access_state(
        &self,
        actor: &Actor,
        node: NodeId,
        capability: Capability,
    ) -> HoldResult<AccessStatus> {
        if actor.is_system() {
            return Ok(AccessStatus::Allowed);
        }
        let deny = self.deny.read().map_err(|_| StorageError::LockPoisoned)?;
        let denied = deny
            .capabilities
            .contains(&(actor.name().to_string(), node, capability));
        Ok(AccessStatus::from(!denied))
    }
}
