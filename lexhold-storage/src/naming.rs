//! Node name rules

use lexhold_core::{HoldResult, StorageError};
use once_cell::sync::Lazy;
use regex::Regex;

// No reserved characters, no trailing dot or whitespace.
static VALID_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^[^*"<>\\/?:|]*[^*"<>\\/?:|.\s]$"#).expect("Invalid node name regex")
});

/// Check a node name against the store's naming rules.
pub fn validate_node_name(name: &str) -> HoldResult<()> {
    let valid = !name.trim().is_empty() && VALID_NAME.is_match(name);
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidName {
            name: name.to_string(),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_ordinary_names() {
        assert!(validate_node_name("Legal Hold A").is_ok());
        assert!(validate_node_name("contract-2019.pdf").is_ok());
        assert!(validate_node_name("x").is_ok());
    }

    #[test]
    fn test_rejects_reserved_characters() {
        for name in ["a/b", "a\\b", "what?", "a:b", "a|b", "a*b", "<x>", "\"q\""] {
            assert!(validate_node_name(name).is_err(), "{name} should be rejected");
        }
    }

    #[test]
    fn test_name_pattern_compiles() {
        assert!(VALID_NAME.is_match("Holds"));
        assert!(!VALID_NAME.is_match("Holds "));
    }

    #[test]
    fn test_rejects_blank_and_trailing_dot() {
        assert!(validate_node_name("").is_err());
        assert!(validate_node_name("   ").is_err());
        assert!(validate_node_name("draft.").is_err());
    }
}
