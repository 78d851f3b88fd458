//! Flexible filename patterns.
//!
//! Filenames recorded upstream may contain characters the filesystem rejects
//! (`:` on Windows shares, usually stored as some other character) or that
//! are special in glob syntax (`[`, `]`). [`flexibilize`] renders a literal
//! name as a glob-style pattern:
//!
//! | Input | Pattern |
//! |-------|---------|
//! | `:` | `?` (exactly one character) |
//! | `[` | `[[]` |
//! | `]` | `[]]` |
//! | anything else | itself |
//!
//! Apply it exactly once per raw filename; escaping is not idempotent.
//!
//! Matching goes through [`compile`], which builds an anchored Unicode regex
//! straight from the raw name: each `:` becomes one `.` (one character, not
//! one byte, so `U+F03A` or `é` stand in for a colon) and every other
//! character is escaped, `{`, `}`, `*` and `?` included.

use regex::{Regex, RegexBuilder};
use std::ffi::OsStr;

pub fn flexibilize(file_name: &str) -> String {
    let mut pattern = String::with_capacity(file_name.len() + 8);
    for c in file_name.chars() {
        match c {
            ':' => pattern.push('?'),
            '[' => pattern.push_str("[[]"),
            ']' => pattern.push_str("[]]"),
            other => pattern.push(other),
        }
    }
    pattern
}

/// Compiled flexible pattern for one raw filename.
#[derive(Debug, Clone)]
pub struct FlexMatcher {
    pattern: String,
    regex: Regex,
}

impl FlexMatcher {
    /// The glob-style form, as produced by [`flexibilize`].
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Match a bare file name. Names that are not valid UTF-8 never match.
    pub fn is_match(&self, name: impl AsRef<OsStr>) -> bool {
        name.as_ref()
            .to_str()
            .is_some_and(|name| self.regex.is_match(name))
    }
}

/// Compile the flexible pattern for `file_name` into a matcher for bare
/// file names (no directory part).
pub fn compile(file_name: &str) -> Result<FlexMatcher, regex::Error> {
    let mut source = String::with_capacity(file_name.len() * 2 + 2);
    source.push('^');
    let mut buf = [0u8; 4];
    for c in file_name.chars() {
        match c {
            ':' => source.push('.'),
            other => source.push_str(&regex::escape(other.encode_utf8(&mut buf))),
        }
    }
    source.push('$');

    let regex = RegexBuilder::new(&source)
        .unicode(true)
        .dot_matches_new_line(true)
        .build()?;
    Ok(FlexMatcher {
        pattern: flexibilize(file_name),
        regex,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colon_and_brackets() {
        assert_eq!(
            flexibilize("Statement: Jan[2024].pdf"),
            "Statement? Jan[[]2024[]].pdf"
        );
    }

    #[test]
    fn plain_names_pass_through() {
        assert_eq!(flexibilize("Lease 2023 (signed).pdf"), "Lease 2023 (signed).pdf");
        assert_eq!(flexibilize("Deal {a,b}*.pdf"), "Deal {a,b}*.pdf");
    }

    #[test]
    fn not_idempotent() {
        let once = flexibilize("a[1].pdf");
        assert_ne!(flexibilize(&once), once);
    }

    #[test]
    fn matches_when_colon_position_aligns() {
        let m = compile("Statement: Jan[2024].pdf").unwrap();
        assert_eq!(m.pattern(), "Statement? Jan[[]2024[]].pdf");
        assert!(m.is_match("Statement: Jan[2024].pdf"));
        assert!(m.is_match("Statement_ Jan[2024].pdf"));
        assert!(m.is_match("Statement\u{f03a} Jan[2024].pdf"));
    }

    #[test]
    fn colon_stands_for_one_multibyte_character() {
        let m = compile("Statement: Jan.pdf").unwrap();
        assert!(m.is_match("Statement\u{e9} Jan.pdf"));
        assert!(m.is_match("Statement\u{f03a} Jan.pdf"));
        assert!(!m.is_match("Statement\u{e9}\u{e9} Jan.pdf"));
    }

    #[test]
    fn misaligned_names_do_not_match() {
        let m = compile("Statement: Jan[2024].pdf").unwrap();
        assert!(!m.is_match("Statement Jan[2024].pdf"));
        assert!(!m.is_match("Statement__ Jan[2024].pdf"));
        assert!(!m.is_match("Statement_ Jan2.pdf"));
        assert!(!m.is_match("Statement_ Jan[2024].PDF"));
    }

    #[test]
    fn brackets_are_literal() {
        let m = compile("Receipt[1].pdf").unwrap();
        assert!(m.is_match("Receipt[1].pdf"));
        assert!(!m.is_match("Receipt1.pdf"));
    }

    #[test]
    fn glob_syntax_in_names_is_literal() {
        let m = compile("Deal {a,b}: x.pdf").unwrap();
        assert!(m.is_match("Deal {a,b}_ x.pdf"));
        assert!(!m.is_match("Deal a_ x.pdf"));
        assert!(!m.is_match("Deal b_ x.pdf"));

        let unbalanced = compile("Deal {draft: 2.pdf").unwrap();
        assert!(unbalanced.is_match("Deal {draft_ 2.pdf"));

        let star = compile("Scan*: 1?.pdf").unwrap();
        assert!(star.is_match("Scan*_ 1?.pdf"));
        assert!(!star.is_match("Scan123_ 1a.pdf"));
    }
}
