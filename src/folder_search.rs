//! Single-folder file lookup.
//!
//! Precedence inside one folder:
//!
//! 1. missing folder → no match;
//! 2. `folder/<file_name>` exists → that file;
//! 3. otherwise the files directly inside `folder` whose name matches the
//!    flexible pattern (see [`crate::flex`]), most recently modified first.
//!
//! Filesystem errors while enumerating mean "no match in this folder"; they
//! are logged and never propagated.

use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

use crate::flex;

/// True when `name` is exactly one ordinary path component: not empty,
/// not absolute, no separators, not `.` or `..`.
pub fn is_plain_segment(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(c)), None) if c == name
    )
}

pub fn find_in_folder(folder: &Path, file_name: &str) -> Option<PathBuf> {
    if !is_plain_segment(file_name) {
        tracing::debug!("Rejecting file name that is not a plain segment: {:?}", file_name);
        return None;
    }
    if !folder.is_dir() {
        return None;
    }

    let exact = folder.join(file_name);
    if exact.is_file() {
        return Some(exact);
    }

    let matcher = match flex::compile(file_name) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!("No flexible pattern for {:?}: {}", file_name, e);
            return None;
        }
    };
    tracing::debug!("Flexible pattern {}", matcher.pattern());

    let mut candidates: Vec<(SystemTime, PathBuf)> = Vec::new();
    let walker = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true);
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Cannot enumerate {}: {}", folder.display(), e);
                return None;
            }
        };
        if !entry.file_type().is_file() || !matcher.is_match(entry.file_name()) {
            continue;
        }
        let modified = match entry
            .metadata()
            .map_err(std::io::Error::from)
            .and_then(|m| m.modified())
        {
            Ok(t) => t,
            Err(e) => {
                tracing::debug!("Cannot read metadata for {}: {}", entry.path().display(), e);
                return None;
            }
        };
        candidates.push((modified, entry.into_path()));
    }

    // Newest first; equal timestamps fall back to the smallest name.
    candidates
        .into_iter()
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(&a.1)))
        .map(|(_, path)| path)
}


#[cfg(test)]
mod tests {
    use super::test_support::touch_aged;
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_folder_is_no_match() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(find_in_folder(&tmp.path().join("nope"), "Lease.pdf"), None);
    }

    #[cfg(unix)]
    #[test]
    fn exact_colon_name_preferred_over_wildcard_matches() {
        let tmp = TempDir::new().unwrap();
        let literal = tmp.path().join("Statement: Jan.pdf");
        touch_aged(&literal, 3600);
        touch_aged(&tmp.path().join("Statement_ Jan.pdf"), 10);
        touch_aged(&tmp.path().join("Statement- Jan.pdf"), 5);
        assert_eq!(
            find_in_folder(tmp.path(), "Statement: Jan.pdf").unwrap(),
            literal
        );
    }

    #[test]
    fn newest_flexible_match_wins() {
        let tmp = TempDir::new().unwrap();
        touch_aged(&tmp.path().join("Statement_ Jan[2024].pdf"), 7200);
        let newer = tmp.path().join("Statement- Jan[2024].pdf");
        touch_aged(&newer, 60);
        touch_aged(&tmp.path().join("Statement Jan[2024].pdf"), 1);

        let found = find_in_folder(tmp.path(), "Statement: Jan[2024].pdf").unwrap();
        assert_eq!(found, newer);
    }

    #[test]
    fn flexible_search_is_not_recursive() {
        let tmp = TempDir::new().unwrap();
        touch_aged(&tmp.path().join("nested").join("Invoice_ 1.pdf"), 10);
        assert_eq!(find_in_folder(tmp.path(), "Invoice: 1.pdf"), None);
    }

    #[test]
    fn directories_are_not_matches() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("Lease.pdf")).unwrap();
        assert_eq!(find_in_folder(tmp.path(), "Lease.pdf"), None);
    }

    #[test]
    fn plain_segments() {
        assert!(is_plain_segment("Lease.pdf"));
        assert!(is_plain_segment("Statement: Jan[2024].pdf"));
        assert!(!is_plain_segment(""));
        assert!(!is_plain_segment(".."));
        assert!(!is_plain_segment("."));
        assert!(!is_plain_segment("../Lease.pdf"));
        assert!(!is_plain_segment("sub/Lease.pdf"));
        assert!(!is_plain_segment("/etc/passwd"));
        assert!(!is_plain_segment("Lease.pdf/"));
    }

    #[test]
    fn parent_traversal_is_no_match() {
        let tmp = TempDir::new().unwrap();
        let folder = tmp.path().join("ACME-123");
        std::fs::create_dir_all(&folder).unwrap();
        touch_aged(&tmp.path().join("secret.pdf"), 10);
        assert_eq!(find_in_folder(&folder, "../secret.pdf"), None);
    }

    #[test]
    fn braces_match_literally() {
        let tmp = TempDir::new().unwrap();
        let draft = tmp.path().join("Deal {draft_ 2.pdf");
        touch_aged(&draft, 10);
        assert_eq!(find_in_folder(tmp.path(), "Deal {draft: 2.pdf"), Some(draft));
    }

    #[test]
    fn braces_are_not_alternation() {
        let tmp = TempDir::new().unwrap();
        touch_aged(&tmp.path().join("Deal a_ x.pdf"), 10);
        touch_aged(&tmp.path().join("Deal b_ x.pdf"), 10);
        assert_eq!(find_in_folder(tmp.path(), "Deal {a,b}: x.pdf"), None);
    }

    #[test]
    fn multibyte_colon_substitute_matches() {
        let tmp = TempDir::new().unwrap();
        let stored = tmp.path().join("Statement\u{f03a} Jan.pdf");
        touch_aged(&stored, 10);
        assert_eq!(find_in_folder(tmp.path(), "Statement: Jan.pdf"), Some(stored));
    }
}
