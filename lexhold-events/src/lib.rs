//! LEXHOLD Events - Hold Lifecycle Hooks
//!
//! Every hold mutation is bracketed by a before/after hook pair. Handlers
//! register against a hook point and a class name (a node type or aspect);
//! dispatch for a node's class set runs every matching handler once, in
//! registration order.
//!
//! | Point | Keyed by | Arguments |
//! |-------|----------|-----------|
//! | `BeforeCreateHold` | hold container | name, reason |
//! | `OnCreateHold` | new hold | hold |
//! | `BeforeDeleteHold` | hold | hold |
//! | `OnDeleteHold` | deleted hold | name |
//! | `BeforeAddToHold` | hold | hold, item |
//! | `OnAddToHold` | hold | hold, item |
//! | `BeforeRemoveFromHold` | hold | hold, item |
//! | `OnRemoveFromHold` | hold | hold, item |

mod hooks;
mod registry;

pub use hooks::{HoldEvent, HoldHook, HookPoint};
pub use registry::{HookHandle, HookRegistry};
