//! Deal folder resolution across the Deals and Accounts trees.
//!
//! ```text
//! DealsRoot/<FolderName>/<file>                            (1) Deals
//! AccountsRoot/<company>/Associated Deals/<FolderName>/<file>  (2) Accounts
//! ```
//!
//! Deals take strict precedence: the Accounts tree is only searched when the
//! Deals folder yields nothing. Companies are visited in file-name order and
//! the first hit wins. A missing or unreadable root is "no match", never an
//! error; [`Resolution::NotFound`] is the only failure outcome.

use anyhow::Result;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::folder_search::{find_in_folder, is_plain_segment};

/// Fixed subfolder under each company directory in the Accounts tree.
pub const ASSOCIATED_DEALS: &str = "Associated Deals";

/// The two roots of the records hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRoots {
    pub deals_root: PathBuf,
    pub accounts_root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(PathBuf),
    NotFound,
}

impl Resolution {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Resolution::Found(p) => Some(p),
            Resolution::NotFound => None,
        }
    }
}

/// Renders the terminating line of the `resolve` command.
impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Found(p) => write!(f, "RESULT:{}", p.display()),
            Resolution::NotFound => f.write_str("RESULT:NOT_FOUND"),
        }
    }
}

pub struct Resolver {
    roots: SearchRoots,
}

impl Resolver {
    pub fn new(roots: SearchRoots) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &SearchRoots {
        &self.roots
    }

    /// Look in `DealsRoot/<folder_name>`.
    pub fn search_deals(&self, file_name: &str, folder_name: &str) -> Option<PathBuf> {
        let folder = self.roots.deals_root.join(folder_name);
        tracing::info!("Searching deals folder {}", folder.display());
        find_in_folder(&folder, file_name)
    }

    /// Look in `<company>/Associated Deals/<folder_name>` for every company
    /// under the Accounts root, stopping at the first hit.
    pub fn search_accounts(&self, file_name: &str, folder_name: &str) -> Option<PathBuf> {
        let root = &self.roots.accounts_root;
        if !root.is_dir() {
            tracing::debug!("Accounts root not available: {}", root.display());
            return None;
        }

        let companies = WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in companies {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("Skipping unreadable accounts entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }
            let folder = entry.path().join(ASSOCIATED_DEALS).join(folder_name);
            if let Some(found) = find_in_folder(&folder, file_name) {
                tracing::info!(
                    "Found under account {}",
                    entry.file_name().to_string_lossy()
                );
                return Some(found);
            }
        }
        None
    }

    /// Deals first, then Accounts. Names that are not plain path segments
    /// (absolute, `..`, separators) never resolve.
    pub fn resolve(&self, file_name: &str, folder_name: &str) -> Resolution {
        if !is_plain_segment(folder_name) || !is_plain_segment(file_name) {
            tracing::debug!(
                "Rejecting non-plain names: file {:?}, folder {:?}",
                file_name,
                folder_name
            );
            return Resolution::NotFound;
        }
        let found = self
            .search_deals(file_name, folder_name)
            .or_else(|| self.search_accounts(file_name, folder_name));
        match found {
            Some(path) => Resolution::Found(std::path::absolute(&path).unwrap_or(path)),
            None => Resolution::NotFound,
        }
    }
}

/// Run the `resolve` command: diagnostics go to the log, the single
/// `RESULT:` line goes to stdout.
pub fn run_resolve(
    config: &Config,
    file_name: &str,
    folder_name: &str,
    deals_path: Option<PathBuf>,
    accounts_path: Option<PathBuf>,
) -> Result<Resolution> {
    let roots = SearchRoots {
        deals_root: deals_path.unwrap_or_else(|| config.paths.deals_root.clone()),
        accounts_root: accounts_path.unwrap_or_else(|| config.paths.accounts_root.clone()),
    };
    tracing::info!(
        "Resolving {:?} in folder {:?} (deals: {}, accounts: {})",
        file_name,
        folder_name,
        roots.deals_root.display(),
        roots.accounts_root.display()
    );

    let resolution = Resolver::new(roots).resolve(file_name, folder_name);
    println!("{}", resolution);
    Ok(resolution)
}
