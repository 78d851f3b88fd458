//! Single-file filing: resolve, classify, rename.
//!
//! Combines the resolver and the classification pipeline for one
//! `(file name, deal folder)` pair, as used by `docsort file`. Each step can
//! end the run early with an explicit [`FilingOutcome`].

use anyhow::Result;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::audit::inspect_document;
use crate::classify::{classify_document, ClassifyError};
use crate::config::{Config, PathsConfig};
use crate::contract::ContractVersion;
use crate::engine::ClassificationEngine;
use crate::models::ContentType;
use crate::render::PageRenderer;
use crate::rename::{free_target, rename_with_label, skip_reason, SkipReason};
use crate::resolver::{Resolution, Resolver, SearchRoots};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilingOutcome {
    NotFound,
    Skipped(SkipReason),
    /// Password-protected or unreadable; left for manual handling.
    Unprocessable(PathBuf),
    Completed {
        from: PathBuf,
        to: PathBuf,
        content_type: ContentType,
        renamed: bool,
    },
}

impl fmt::Display for FilingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilingOutcome::NotFound => f.write_str("Not found"),
            FilingOutcome::Skipped(reason) => write!(f, "Skipped - {}", reason),
            FilingOutcome::Unprocessable(path) => {
                write!(f, "Skipped - Password-protected or unreadable: {}", path.display())
            }
            FilingOutcome::Completed {
                to,
                content_type,
                renamed,
                ..
            } => {
                let name = to
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                if *renamed {
                    write!(f, "Completed ({}) -> {}", content_type, name)
                } else {
                    write!(f, "Dry run ({}) -> {}", content_type, name)
                }
            }
        }
    }
}

/// How often `docsort file` looks for a file before reporting it missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveRetry {
    /// Total lookups, at least one.
    pub attempts: u32,
    /// The n-th retry waits `n * delay`.
    pub delay: Duration,
}

impl ResolveRetry {
    pub fn from_config(paths: &PathsConfig) -> Self {
        Self {
            attempts: paths.resolve_attempts.max(1),
            delay: Duration::from_secs(paths.resolve_delay_secs),
        }
    }
}

pub struct Filer<'a> {
    pub config: &'a Config,
    pub resolver: Resolver,
    pub retry: ResolveRetry,
    pub engine: &'a dyn ClassificationEngine,
    pub renderer: &'a dyn PageRenderer,
    pub version: ContractVersion,
}

impl<'a> Filer<'a> {
    pub async fn file(
        &self,
        file_name: &str,
        folder_name: &str,
        dry_run: bool,
    ) -> Result<FilingOutcome> {
        if let Some(reason) = skip_reason(file_name, &self.config.rename) {
            tracing::info!("Skipped processing {}: {}", file_name, reason);
            return Ok(FilingOutcome::Skipped(reason));
        }

        let path = match self.resolve_with_retry(file_name, folder_name).await {
            Resolution::Found(path) => path,
            Resolution::NotFound => {
                tracing::warn!(
                    "{} not found for folder {} after {} attempts",
                    file_name,
                    folder_name,
                    self.retry.attempts
                );
                return Ok(FilingOutcome::NotFound);
            }
        };

        let document = inspect_document(&path)?;
        let result =
            match classify_document(self.engine, self.renderer, &document, self.version).await {
                Ok(result) => result,
                Err(ClassifyError::Unprocessable(path)) => {
                    tracing::info!("Skipped processing {}: password-protected", path.display());
                    return Ok(FilingOutcome::Unprocessable(path));
                }
                Err(e) => return Err(e.into()),
            };

        let to = if dry_run {
            free_target(&path, result.content_type)?
        } else {
            rename_with_label(&path, result.content_type)?
        };
        Ok(FilingOutcome::Completed {
            from: path,
            to,
            content_type: result.content_type,
            renamed: !dry_run,
        })
    }

    async fn resolve_with_retry(&self, file_name: &str, folder_name: &str) -> Resolution {
        let mut resolution = self.resolver.resolve(file_name, folder_name);
        for retry in 1..self.retry.attempts {
            if resolution != Resolution::NotFound {
                break;
            }
            let delay = self.retry.delay * retry;
            tracing::info!(
                "{} not found yet, retrying in {:?} (attempt {}/{})",
                file_name,
                delay,
                retry + 1,
                self.retry.attempts
            );
            tokio::time::sleep(delay).await;
            resolution = self.resolver.resolve(file_name, folder_name);
        }
        resolution
    }
}

/// Run the `file` command and print `<file name> - <outcome>`.
#[allow(clippy::too_many_arguments)]
pub async fn run_file(
    config: &Config,
    engine: &dyn ClassificationEngine,
    renderer: &dyn PageRenderer,
    file_name: &str,
    folder_name: &str,
    deals_path: Option<PathBuf>,
    accounts_path: Option<PathBuf>,
    dry_run: bool,
) -> Result<FilingOutcome> {
    let roots = SearchRoots {
        deals_root: deals_path.unwrap_or_else(|| config.paths.deals_root.clone()),
        accounts_root: accounts_path.unwrap_or_else(|| config.paths.accounts_root.clone()),
    };
    let filer = Filer {
        config,
        resolver: Resolver::new(roots),
        retry: ResolveRetry::from_config(&config.paths),
        engine,
        renderer,
        version: config.classifier.version()?,
    };

    let outcome = filer.file(file_name, folder_name, dry_run).await?;
    println!("{} - {}", file_name, outcome);
    Ok(outcome)
}
