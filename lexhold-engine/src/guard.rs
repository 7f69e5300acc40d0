//! Frozen-node guard and before-delete behaviour

use crate::context::{HoldContext, Suppression};
use crate::service::HoldService;
use lexhold_core::{
    AccessError, AccessStatus, ErrorKind, HoldResult, IntegrityError, NodeId, Permission,
};
use lexhold_storage::NodeStoreExt;

impl HoldService {
    /// Reject updates and deletes of a frozen node.
    ///
    /// Hosts call this before mutating a node. Nodes the engine is freezing
    /// or unfreezing in `ctx` pass.
    pub fn check_frozen_update(&self, ctx: &HoldContext, node: NodeId) -> HoldResult<()> {
        if ctx.is_suppressed(Suppression::FrozenGuard, node) || !self.is_frozen(node)? {
            return Ok(());
        }
        let name = self.store.name_of(node)?;
        tracing::warn!(node = %node, name = %name, actor = %ctx.effective_actor(), "Update of frozen node rejected");
        Err(IntegrityError::FrozenNode { node, name }.into())
    }

    /// Unfreeze the items of a hold that is about to be deleted outside
    /// [`HoldService::delete_hold`].
    ///
    /// No-op for nodes that are not holds and for holds the engine is
    /// deleting itself.
    pub fn before_delete_node(&self, ctx: &HoldContext, node: NodeId) -> HoldResult<()> {
        if ctx.is_suppressed(Suppression::BeforeDeleteNode, node) || !self.is_hold(node)? {
            return Ok(());
        }
        let _op = ctx.enter();

        self.check_held_items_accessible(ctx, node)?;

        let _elevated = ctx.elevate();
        for item in self.get_held(node)? {
            ctx.suppress(Suppression::FrozenGuard, item);
            self.retract(ctx, item, 1)?;
        }
        tracing::debug!(hold = %node, "Held items released ahead of hold deletion");
        Ok(())
    }

    /// The acting user must be able to see every item in the hold:
    /// filing permission on records and record folders, read on the rest.
    pub(crate) fn check_held_items_accessible(
        &self,
        ctx: &HoldContext,
        hold: NodeId,
    ) -> HoldResult<()> {
        let actor = ctx.effective_actor();
        let held = ctx.run_as_system(|| self.get_held(hold))?;

        let mut denied = Vec::new();
        for item in held {
            let permission =
                if self.store.is_record(item)? || self.store.is_record_folder(item)? {
                    Permission::Filing
                } else {
                    Permission::Read
                };
            match self.oracle.has_permission(&actor, item, permission) {
                Ok(AccessStatus::Allowed) => {}
                Ok(AccessStatus::Denied) => {
                    denied.push(ctx.run_as_system(|| self.store.name_of(item))?)
                }
                Err(e) if e.kind() == ErrorKind::AccessDenied => {
                    return Err(AccessError::HoldPermission {
                        reason: e.to_string(),
                    }
                    .into());
                }
                Err(e) => return Err(e),
            }
        }

        if denied.is_empty() {
            return Ok(());
        }

        tracing::warn!(
            hold = %hold,
            actor = %actor,
            denied = denied.len(),
            "Hold deletion blocked by inaccessible held items"
        );
        let total = denied.len();
        denied.truncate(self.config.max_held_items_in_error);
        Err(AccessError::HeldItemsNotAccessible {
            names: denied,
            total,
        }
        .into())
    }
}
