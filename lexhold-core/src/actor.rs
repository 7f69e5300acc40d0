//! Actors on whose behalf hold operations run

use serde::{Deserialize, Serialize};
use std::fmt;

/// An authenticated user or the elevated system actor.
///
/// The permission oracle always allows the system actor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    name: String,
    system: bool,
}

impl Actor {
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system: false,
        }
    }

    pub fn system(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_system(&self) -> bool {
        self.system
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_is_not_system() {
        let alice = Actor::user("alice");
        assert!(!alice.is_system());
        assert_eq!(alice.name(), "alice");
        assert!(Actor::system("System").is_system());
    }

    #[test]
    fn test_same_name_different_role() {
        assert_ne!(Actor::user("System"), Actor::system("System"));
    }
}
