//! Document inspection: page count and password protection.
//!
//! [`inspect_document`] is what the classification pipeline consults before
//! anything is rendered; a protected document never reaches the engine.
//! [`run_audit`] is the reporting pass behind `docsort audit`.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::models::{Document, MediaType};

/// Inspect a PDF. Files that are encrypted or fail to parse are reported as
/// protected with zero pages rather than as errors.
pub fn inspect_pdf(path: &Path) -> Result<Document> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(inspect_pdf_bytes(path, &bytes))
}

fn inspect_pdf_bytes(path: &Path, bytes: &[u8]) -> Document {
    match lopdf::Document::load_mem(bytes) {
        Ok(doc) if doc.is_encrypted() => {
            tracing::info!("{} is password-protected", path.display());
            Document {
                path: path.to_path_buf(),
                page_count: doc.get_pages().len() as u32,
                protected: true,
            }
        }
        Ok(doc) => Document {
            path: path.to_path_buf(),
            page_count: doc.get_pages().len() as u32,
            protected: false,
        },
        Err(e) => {
            tracing::warn!("{} could not be opened: {}", path.display(), e);
            Document {
                path: path.to_path_buf(),
                page_count: 0,
                protected: true,
            }
        }
    }
}

/// Inspect any supported source file. Images count as one readable page.
pub fn inspect_document(path: &Path) -> Result<Document> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();
    match MediaType::from_extension(&ext) {
        Some(MediaType::Pdf) => inspect_pdf(path),
        Some(MediaType::Jpeg) | Some(MediaType::Png) => {
            if !path.is_file() {
                bail!("File not found: {}", path.display());
            }
            Ok(Document {
                path: path.to_path_buf(),
                page_count: 1,
                protected: false,
            })
        }
        None => bail!("Unsupported file type: {}", path.display()),
    }
}

/// One row of the audit report.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub document: Document,
    pub modified: Option<DateTime<Local>>,
}

/// Walk `root` and inspect every PDF beneath it, sorted by path.
pub fn audit_directory(root: &Path) -> Result<Vec<AuditEntry>> {
    if !root.is_dir() {
        bail!("Audit root does not exist: {}", root.display());
    }
    let pdfs = build_globset(&["**/*.pdf", "**/*.PDF"])?;

    let mut entries = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if !pdfs.is_match(relative) {
            continue;
        }

        let modified = entry
            .metadata()
            .ok()
            .and_then(|m| m.modified().ok())
            .map(DateTime::<Local>::from);
        entries.push(AuditEntry {
            document: inspect_pdf(entry.path())?,
            modified,
        });
    }

    entries.sort_by(|a, b| a.document.path.cmp(&b.document.path));
    Ok(entries)
}

pub fn run_audit(root: &Path) -> Result<Vec<AuditEntry>> {
    let entries = audit_directory(root)?;

    println!("{:<60} {:>6} {:<10} MODIFIED", "FILE", "PAGES", "PROTECTED");
    for entry in &entries {
        let display: PathBuf = entry
            .document
            .path
            .strip_prefix(root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| entry.document.path.clone());
        println!(
            "{:<60} {:>6} {:<10} {}",
            display.display(),
            entry.document.page_count,
            if entry.document.protected { "yes" } else { "no" },
            entry
                .modified
                .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }

    let protected = entries.iter().filter(|e| e.document.protected).count();
    println!();
    println!("{} PDFs, {} protected or unreadable", entries.len(), protected);
    Ok(entries)
}

fn build_globset(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}


#[cfg(test)]
mod tests {
    use super::test_pdf::pdf_with_pages;
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn counts_pages() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("lease.pdf");
        std::fs::write(&path, pdf_with_pages(&["one", "two", "three"])).unwrap();

        let doc = inspect_pdf(&path).unwrap();
        assert_eq!(doc.page_count, 3);
        assert!(!doc.protected);
    }

    #[test]
    fn unreadable_pdf_is_protected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.pdf");
        std::fs::write(&path, b"this is not a pdf").unwrap();

        let doc = inspect_pdf(&path).unwrap();
        assert!(doc.protected);
        assert_eq!(doc.page_count, 0);
    }

    #[test]
    fn images_are_single_page_documents() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("receipt.JPG");
        std::fs::write(&path, b"\xff\xd8\xff").unwrap();
        let doc = inspect_document(&path).unwrap();
        assert_eq!(doc.page_count, 1);
        assert!(!doc.protected);
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("notes.docx");
        std::fs::write(&path, b"x").unwrap();
        assert!(inspect_document(&path).is_err());
    }

    #[test]
    fn audit_walks_nested_pdfs_only() {
        let tmp = TempDir::new().unwrap();
        let deal = tmp.path().join("ACME-123");
        std::fs::create_dir_all(&deal).unwrap();
        std::fs::write(deal.join("a.pdf"), pdf_with_pages(&["a"])).unwrap();
        std::fs::write(deal.join("b.pdf"), b"garbage").unwrap();
        std::fs::write(deal.join("c.txt"), b"text").unwrap();

        let entries = audit_directory(tmp.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(!entries[0].document.protected);
        assert!(entries[1].document.protected);
    }
}
