//! Renaming classified files in place.
//!
//! A classified file is renamed to `<ContentType><ext>` inside its own
//! directory. When that name is taken, ` (1)`, ` (2)`, … are appended until
//! a free name is found.

use anyhow::{bail, Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::RenameConfig;
use crate::models::ContentType;

const INVALID_FILENAME_CHARS: &str = "<>:\"/\\|?*";
const MAX_FILENAME_LEN: usize = 255;

/// Why a file is left alone before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyClassified,
    Protected,
    UnsupportedType,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SkipReason::AlreadyClassified => "Already classified",
            SkipReason::Protected => "Not allowed to change",
            SkipReason::UnsupportedType => "Unsupported file type",
        })
    }
}

/// Decide whether `file_name` should be skipped.
///
/// A name that already contains any content type label (case-insensitive)
/// counts as classified.
pub fn skip_reason(file_name: &str, config: &RenameConfig) -> Option<SkipReason> {
    let lower = file_name.to_lowercase();
    if ContentType::ALL
        .iter()
        .any(|ct| lower.contains(&ct.as_str().to_lowercase()))
    {
        return Some(SkipReason::AlreadyClassified);
    }
    if config.protected_names.iter().any(|n| n == file_name) {
        return Some(SkipReason::Protected);
    }
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if !config
        .allowed_extensions
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(&ext))
    {
        return Some(SkipReason::UnsupportedType);
    }
    None
}

pub fn validate_new_filename(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Filename cannot be empty");
    }
    if name.chars().count() > MAX_FILENAME_LEN {
        bail!("Filename is too long");
    }
    if name.chars().any(|c| INVALID_FILENAME_CHARS.contains(c)) {
        bail!(
            "Filename contains invalid characters: {}",
            INVALID_FILENAME_CHARS
        );
    }
    if !name.contains('.') {
        bail!("Filename must have an extension");
    }
    Ok(())
}

/// Rename `path` after `label`, keeping directory and extension.
pub fn rename_with_label(path: &Path, label: ContentType) -> Result<PathBuf> {
    let target = free_target(path, label)?;
    std::fs::rename(path, &target).with_context(|| {
        format!(
            "Error renaming file {} to {}",
            path.display(),
            target.display()
        )
    })?;
    tracing::info!("File renamed: {}", target.display());
    Ok(target)
}

/// First free `<label>[ (n)]<ext>` path next to `path`.
pub fn free_target(path: &Path, label: ContentType) -> Result<PathBuf> {
    let directory = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("File has no parent directory: {}", path.display()))?;
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let name = format!("{}{}", label, ext);
    validate_new_filename(&name)?;
    let mut target = directory.join(&name);
    let mut counter = 1;
    while target.exists() {
        target = directory.join(format!("{} ({}){}", label, counter, ext));
        counter += 1;
    }
    Ok(target)
}
