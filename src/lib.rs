//! # docsort
//!
//! Classify scanned contract documents from their first pages and resolve
//! the deal folder they belong to in a Deals / Accounts records tree.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌─────────────┐   ┌──────────┐   ┌──────────┐
//! │  audit   │──▶│ page window │──▶│  engine  │──▶│  parser  │──▶ ContentType
//! │ (lopdf)  │   │  + render   │   │ (HTTP)   │   │          │
//! └──────────┘   └─────────────┘   └──────────┘   └──────────┘
//!
//! (file name, folder) ──▶ Deals/<folder> ──miss──▶ Accounts/*/Associated Deals/<folder>
//!                               │                              │
//!                               └──────────▶ RESULT:<path> ◀───┘   or RESULT:NOT_FOUND
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! docsort resolve "Statement: Jan[2024].pdf" ACME-123
//! docsort classify ./scan_0042.pdf
//! docsort file scan_0042.pdf ACME-123 --dry-run
//! docsort audit /srv/records/Deals
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`page_window`] | Leading-page window selection |
//! | [`contract`] | Versioned classification contract (prompt + taxonomy) |
//! | [`parser`] | Validation of engine replies |
//! | [`engine`] | Classification engine abstraction |
//! | [`render`] | Page attachments for a request |
//! | [`classify`] | Classification pipeline |
//! | [`flex`] | Flexible filename patterns |
//! | [`folder_search`] | Single-folder lookup |
//! | [`resolver`] | Deals / Accounts resolution |
//! | [`audit`] | Page count and protection audit |
//! | [`rename`] | Renaming classified files |
//! | [`filing`] | Resolve + classify + rename for one file |
//! | [`logging`] | Tracing subscriber setup |

pub mod audit;
pub mod classify;
pub mod config;
pub mod contract;
pub mod engine;
pub mod filing;
pub mod flex;
pub mod folder_search;
pub mod logging;
pub mod models;
pub mod page_window;
pub mod parser;
pub mod rename;
pub mod render;
pub mod resolver;
