//! LEXHOLD Engine - Hold/Freeze Consistency
//!
//! A hold preserves content for a legal or administrative reason. Items in a
//! hold carry the frozen marker; records inherit it from any held record
//! folder they are filed in. [`HoldService`] keeps memberships and markers
//! consistent across add, remove and delete, firing the hooks of
//! `lexhold-events` around each mutation.
//!
//! The engine runs synchronously on the caller's stack. Batch operations
//! process their lists in order and stop at the first error; earlier items
//! stay mutated, leaving rollback to the host's transaction.

mod context;
mod guard;
mod membership;
mod service;

pub use context::{ElevationGuard, HoldContext, Suppression};
pub use service::HoldService;
