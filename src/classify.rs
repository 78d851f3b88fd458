//! Classification pipeline.
//!
//! ```text
//! Document ──▶ protected? ──yes──▶ Unprocessable (engine never called)
//!                 │no
//!                 ▼
//!          page window (≤4) ──▶ renderer ──▶ engine ──▶ parser ──▶ ContentType
//! ```
//!
//! Classification is one-shot: one request, one reply, no refinement. A
//! reply outside the taxonomy becomes `Unclassified`; an unreadable reply is
//! an error, because it says nothing about the document.

use anyhow::Result;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::audit::inspect_document;
use crate::config::Config;
use crate::contract::ContractVersion;
use crate::engine::{create_engine, ClassificationEngine};
use crate::models::{ClassificationRequest, ClassificationResult, Document};
use crate::page_window::select_window;
use crate::parser::{self, ParseError};
use crate::render::{PageRenderer, RenderError, SourceRenderer};

#[derive(Debug, Error)]
pub enum ClassifyError {
    /// Password-protected or unreadable; filtered before classification.
    #[error("document is password-protected or unreadable: {}", .0.display())]
    Unprocessable(PathBuf),

    #[error("document has no pages: {}", .0.display())]
    Empty(PathBuf),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("classification engine failed: {0:#}")]
    Engine(anyhow::Error),

    #[error("engine returned unusable output: {0}")]
    MalformedOutput(String),
}

/// Build the request for `document`: its page window under `version`.
pub fn build_request(
    renderer: &dyn PageRenderer,
    document: &Document,
    version: ContractVersion,
) -> Result<ClassificationRequest, ClassifyError> {
    if document.protected {
        return Err(ClassifyError::Unprocessable(document.path.clone()));
    }
    let window =
        select_window(document.page_count).ok_or_else(|| ClassifyError::Empty(document.path.clone()))?;
    let pages = renderer.render(document, window)?;
    Ok(ClassificationRequest { pages, version })
}

/// Classify one document.
pub async fn classify_document(
    engine: &dyn ClassificationEngine,
    renderer: &dyn PageRenderer,
    document: &Document,
    version: ContractVersion,
) -> Result<ClassificationResult, ClassifyError> {
    let request = build_request(renderer, document, version)?;
    tracing::info!(
        "Classifying {} ({} of {} pages, contract {}, engine {})",
        document.path.display(),
        request.pages.len(),
        document.page_count,
        version,
        engine.name()
    );

    let reply = engine
        .complete(&request)
        .await
        .map_err(ClassifyError::Engine)?;

    let result = parser::normalize(&reply).map_err(|e| match e {
        ParseError::MalformedOutput(reason) => ClassifyError::MalformedOutput(reason),
        other => ClassifyError::MalformedOutput(other.to_string()),
    })?;

    tracing::info!(
        "{} classified as {}",
        document.path.display(),
        result.content_type
    );
    Ok(result)
}

/// Run the `classify` command on a local file and print the result as JSON.
pub async fn run_classify(
    config: &Config,
    path: &Path,
    version: Option<ContractVersion>,
) -> Result<ClassificationResult> {
    let version = match version {
        Some(v) => v,
        None => config.classifier.version()?,
    };
    let document = inspect_document(path)?;
    let engine = create_engine(&config.classifier)?;

    let result = classify_document(engine.as_ref(), &SourceRenderer, &document, version).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(result)
}


#[cfg(test)]
mod tests {
    use super::test_engine::ScriptedEngine;
    use super::*;
    use crate::audit::test_pdf::pdf_with_pages;
    use crate::audit::inspect_pdf;
    use crate::engine::DisabledEngine;
    use crate::models::ContentType;
    use tempfile::TempDir;

    fn write_pdf(tmp: &TempDir, name: &str, pages: &[&str]) -> Document {
        let path = tmp.path().join(name);
        std::fs::write(&path, pdf_with_pages(pages)).unwrap();
        inspect_pdf(&path).unwrap()
    }

    #[tokio::test]
    async fn protected_documents_never_reach_the_engine() {
        let engine = ScriptedEngine::new(
            r#"{"ThoughtProcess": "x", "ContentType": "Rental_Contract"}"#,
        );
        let doc = Document {
            path: PathBuf::from("/records/locked.pdf"),
            page_count: 3,
            protected: true,
        };

        let err = classify_document(&engine, &SourceRenderer, &doc, ContractVersion::LATEST)
            .await
            .unwrap_err();
        assert!(matches!(err, ClassifyError::Unprocessable(_)));
        assert_eq!(engine.calls(), 0);
    }

    #[tokio::test]
    async fn valid_reply_is_returned() {
        let tmp = TempDir::new().unwrap();
        let doc = write_pdf(&tmp, "lease.pdf", &["Lease agreement", "Owner", "Renter"]);
        let engine = ScriptedEngine::new(
            r#"{"ThoughtProcess": "Pages show a lease between Owner and Renter. Rental contract.", "ContentType": "Rental_Contract"}"#,
        );

        let result = classify_document(&engine, &SourceRenderer, &doc, ContractVersion::V4)
            .await
            .unwrap();
        assert_eq!(result.content_type, ContentType::RentalContract);
        assert_eq!(*engine.seen_pages.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn identifying_page_outside_window_stays_unclassified() {
        let tmp = TempDir::new().unwrap();
        let doc = write_pdf(
            &tmp,
            "scan.pdf",
            &["cover", "annex", "annex", "annex", "lease signature page", "annex"],
        );
        let engine = ScriptedEngine::new(
            r#"{"ThoughtProcess": "Only cover and annex pages, no contract page visible. Unclassified.", "ContentType": "Unclassified"}"#,
        );

        let result = classify_document(&engine, &SourceRenderer, &doc, ContractVersion::V4)
            .await
            .unwrap();
        assert_eq!(result.content_type, ContentType::Unclassified);
        assert_eq!(*engine.seen_pages.lock().unwrap(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn unknown_label_becomes_unclassified() {
        let tmp = TempDir::new().unwrap();
        let doc = write_pdf(&tmp, "x.pdf", &["payslip"]);
        let engine = ScriptedEngine::new(r#"{"ThoughtProcess": "A payslip.", "ContentType": "Payslip"}"#);

        let result = classify_document(&engine, &SourceRenderer, &doc, ContractVersion::V1)
            .await
            .unwrap();
        assert_eq!(result.content_type, ContentType::Unclassified);
    }

    #[tokio::test]
    async fn malformed_reply_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let doc = write_pdf(&tmp, "x.pdf", &["page"]);
        let engine = ScriptedEngine::new("Sorry, I can't help with that.");

        let err = classify_document(&engine, &SourceRenderer, &doc, ContractVersion::V4)
            .await
            .unwrap_err();
        assert!(matches!(err, ClassifyError::MalformedOutput(_)));
    }

    #[tokio::test]
    async fn engine_failure_is_surfaced() {
        let tmp = TempDir::new().unwrap();
        let doc = write_pdf(&tmp, "x.pdf", &["page"]);

        let err = classify_document(&DisabledEngine, &SourceRenderer, &doc, ContractVersion::V4)
            .await
            .unwrap_err();
        assert!(matches!(err, ClassifyError::Engine(_)));
    }

    #[test]
    fn empty_document_has_no_request() {
        let doc = Document {
            path: PathBuf::from("/records/empty.pdf"),
            page_count: 0,
            protected: false,
        };
        assert!(matches!(
            build_request(&SourceRenderer, &doc, ContractVersion::V4),
            Err(ClassifyError::Empty(_))
        ));
    }
}
