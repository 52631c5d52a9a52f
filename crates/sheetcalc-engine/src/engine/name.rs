//! Variable and cell name grammar.
//!
//! A legal name is a letter or underscore followed by any number of letters,
//! underscores, or digits (e.g. `A1`, `x`, `_tmp3`). Caller-supplied
//! validators may restrict this further; they can never widen it.

use regex::Regex;
use std::sync::OnceLock;

/// Returns true if `name` matches the base variable grammar.
pub fn is_legal_name(name: &str) -> bool {
    name_re().is_match(name)
}

fn name_re() -> &'static Regex {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    NAME_RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z_][a-zA-Z_0-9]*$").expect("variable name regex must compile")
    })
}

#[cfg(test)]
mod tests {
    use super::is_legal_name;

    #[test]
    fn test_legal_names() {
        for name in ["A1", "a", "_", "_x9", "xy_z", "AA100", "abc"] {
            assert!(is_legal_name(name), "{name} should be legal");
        }
    }

    #[test]
    fn test_illegal_names() {
        for name in ["", "1A", "A 1", "A-1", "$A1", "A1 ", "é1"] {
            assert!(!is_legal_name(name), "{name:?} should be illegal");
        }
    }
}
