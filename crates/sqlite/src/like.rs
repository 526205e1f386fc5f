//! SQL-style pattern matching for `RowSet::like`
//!
//! `%` matches zero or more characters, `_` exactly one, and `[set]` one
//! character from the set (ranges `[a-z]`, negation `[^…]`). Matching is
//! case-insensitive and anchored to the whole string. The pattern is
//! translated to a regex; character classes pass straight through.

use crate::error::{Error, Result};
use regex::Regex;

pub(crate) fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(&pattern_to_regex(pattern))
        .map_err(|err| Error::InvalidArgument(format!("invalid pattern {:?}: {}", pattern, err)))
}

fn pattern_to_regex(pattern: &str) -> String {
    let mut regex = String::from(r"(?is)\A");
    for ch in pattern.chars() {
        match ch {
            '%' => regex.push_str(".*"),
            '_' => regex.push('.'),
            '.' | '$' | '{' | '(' | '|' | ')' | '*' | '+' | '?' | '\\' => {
                regex.push('\\');
                regex.push(ch);
            }
            _ => regex.push(ch),
        }
    }
    regex.push_str(r"\z");
    regex
}

#[cfg(test)]
mod tests {
    use super::*;

    fn like(text: &str, pattern: &str) -> bool {
        compile(pattern).unwrap().is_match(text)
    }

    #[test]
    fn test_translation() {
        assert_eq!(pattern_to_regex("h_llo"), r"(?is)\Ah.llo\z");
        assert_eq!(pattern_to_regex("hello%"), r"(?is)\Ahello.*\z");
        assert_eq!(pattern_to_regex("%.txt"), r"(?is)\A.*\.txt\z");
        assert_eq!(pattern_to_regex("[B-D]"), r"(?is)\A[B-D]\z");
    }

    #[test]
    fn test_wildcards() {
        assert!(like("", "%"));
        assert!(like(" ", "%"));
        assert!(like("asdfa asdf asdf", "%"));
        assert!(like("%", "%"));
        assert!(!like("", "_"));
        assert!(like(" ", "_"));
        assert!(like("4", "_"));
        assert!(like("C", "_"));
        assert!(!like("CX", "_"));
    }

    #[test]
    fn test_character_sets() {
        assert!(!like("", "[ABCD]"));
        assert!(like("A", "[ABCD]"));
        assert!(like("b", "[ABCD]")); // case-insensitive
        assert!(!like("X", "[ABCD]"));
        assert!(!like("AB", "[ABCD]"));
        assert!(like("C", "[B-D]"));
        assert!(like("D", "[B-D]"));
        assert!(!like("A", "[B-D]"));
        assert!(!like("C", "[^B-D]"));
        assert!(!like("D", "[^B-D]"));
        assert!(like("A", "[^B-D]"));
        assert!(like("lolTESTBXXX", "%TEST[ABCD]XXX"));
        assert!(!like("lolTESTZXXX", "%TEST[ABCD]XXX"));
        assert!(!like("lolTESTBXXX", "%TEST[^ABCD]XXX"));
        assert!(like("lolTESTZXXX", "%TEST[^ABCD]XXX"));
        assert!(like("lolTESTBXXX", "%TEST[B-D]XXX"));
        assert!(like("lolTESTZXXX", "%TEST[^B-D]XXX"));
    }

    #[test]
    fn test_anchoring() {
        assert!(like("Stuff.txt", "%Stuff.txt"));
        assert!(like("MagicStuff.txt", "%Stuff.txt"));
        assert!(!like("MagicStuff.txt.img", "%Stuff.txt"));
        assert!(!like("Stuff.txt.img", "%Stuff.txt"));
        assert!(!like("MagicStuff001.txt.img", "%Stuff.txt"));
        assert!(like("Stuff.txt", "Stuff.txt%"));
        assert!(!like("MagicStuff.txt", "Stuff.txt%"));
        assert!(like("Stuff.txt.img", "Stuff.txt%"));
        assert!(like("Stuff.txt", "%Stuff.txt%"));
        assert!(like("MagicStuff.txt", "%Stuff.txt%"));
        assert!(like("MagicStuff.txt.img", "%Stuff.txt%"));
        assert!(like("Stuff.txt.img", "%Stuff.txt%"));
        assert!(!like("MagicStuff001.txt.img", "%Stuff.txt%"));
    }

    #[test]
    fn test_inner_wildcards() {
        assert!(like("Stuff.txt", "%Stuff%.txt"));
        assert!(like("MagicStuff.txt", "%Stuff%.txt"));
        assert!(!like("MagicStuff.txt.img", "%Stuff%.txt"));
        assert!(!like("Stuff.txt.img", "%Stuff%.txt"));
        assert!(like("MagicStuff001.txt", "%Stuff%.txt"));
        assert!(like("Stuff.txt", "Stuff%.txt%"));
        assert!(!like("MagicStuff.txt", "Stuff%.txt%"));
        assert!(like("Stuff.txt.img", "Stuff%.txt%"));
        assert!(!like("MagicStuff001.txt", "Stuff%.txt%"));
        assert!(like("MagicStuff001.txt.img", "%Stuff%.txt%"));
        assert!(like("1Stuff3.txt4", "_Stuff_.txt_"));
        assert!(!like("1Stuff.txt4", "_Stuff_.txt_"));
        assert!(!like("1Stuff3.txt", "_Stuff_.txt_"));
        assert!(!like("Stuff3.txt4", "_Stuff_.txt_"));
    }

    #[test]
    fn test_malformed_pattern() {
        assert!(compile("[unclosed").is_err());
    }
}
