//! LEXHOLD Core - Content Model Types
//!
//! Pure data structures shared by every other crate: node identity, the
//! type/aspect/property vocabulary, actors, the error taxonomy and the
//! engine configuration. No store access and no hold logic lives here.

mod actor;
mod config;
mod enums;
mod error;
mod identity;

pub use actor::*;
pub use config::*;
pub use enums::*;
pub use error::*;
pub use identity::*;
