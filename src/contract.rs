//! The classification contract.
//!
//! Defines, independent of any concrete engine, the decision procedure a
//! classifier must follow and the reply schema it must produce. The contract
//! is versioned: each [`ContractVersion`] adds rule prose on top of the
//! previous one without removing any, and every version shares the same
//! six-label taxonomy and the same JSON schema:
//!
//! ```text
//! { "ThoughtProcess": string, "ContentType": string }
//! ```
//!
//! | Version | Adds |
//! |---------|------|
//! | `v1` | Taxonomy, contract-page rule, repayment-table rule, performed-payment rule, fallback |
//! | `v2` | Ordering rule for the rationale (facts first, conclusion last) |
//! | `v3` | Payment-instrument evidence, obligation-clause exclusion, contract entities |
//! | `v4` | Teleworking definition, loan tax certificates, page-window statement |

use anyhow::bail;
use std::fmt;
use std::str::FromStr;

use crate::models::ContentType;
use crate::page_window::MAX_WINDOW_PAGES;

/// System prompt sent alongside every contract version.
pub const SYSTEM_PROMPT: &str = "You are an AI administrative assistant.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContractVersion {
    V1,
    V2,
    V3,
    V4,
}

impl ContractVersion {
    pub const ALL: [ContractVersion; 4] = [
        ContractVersion::V1,
        ContractVersion::V2,
        ContractVersion::V3,
        ContractVersion::V4,
    ];

    pub const LATEST: ContractVersion = ContractVersion::V4;

    pub fn as_str(&self) -> &'static str {
        match self {
            ContractVersion::V1 => "v1",
            ContractVersion::V2 => "v2",
            ContractVersion::V3 => "v3",
            ContractVersion::V4 => "v4",
        }
    }

    /// Labels a reply may carry under this version. Identical for every version.
    pub fn labels(&self) -> &'static [ContentType] {
        &ContentType::ALL
    }

    /// Full user prompt for this version.
    pub fn prompt(&self) -> String {
        let mut sections: Vec<String> = vec![INTRO.to_string(), taxonomy_section()];

        sections.push(CONTRACT_PAGE_RULE.to_string());
        if *self >= ContractVersion::V3 {
            sections.push(CONTRACT_ENTITIES_RULE.to_string());
        }
        if *self >= ContractVersion::V4 {
            sections.push(LOAN_TAX_CERTIFICATE_RULE.to_string());
        }

        sections.push(REPAYMENT_TABLE_RULE.to_string());

        sections.push(PAYMENT_RULE.to_string());
        if *self >= ContractVersion::V3 {
            sections.push(PAYMENT_EVIDENCE_RULE.to_string());
        }

        if *self >= ContractVersion::V4 {
            sections.push(TELEWORKING_RULE.to_string());
            sections.push(format!(
                "You only see the first {} pages of the file (or fewer if the file is shorter). \
                 Base your decision on these pages alone.",
                MAX_WINDOW_PAGES
            ));
        }

        sections.push(FALLBACK_RULE.to_string());

        if *self >= ContractVersion::V2 {
            sections.push(ORDERING_RULE.to_string());
        }

        sections.push(SCHEMA_SECTION.to_string());
        sections.push(LANGUAGES.to_string());

        sections.join("\n\n")
    }
}

impl Default for ContractVersion {
    fn default() -> Self {
        ContractVersion::LATEST
    }
}

impl fmt::Display for ContractVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractVersion {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        match ContractVersion::ALL
            .iter()
            .find(|v| v.as_str() == normalized)
        {
            Some(v) => Ok(*v),
            None => bail!(
                "Unknown contract version: '{}'. Must be one of v1, v2, v3, v4.",
                s
            ),
        }
    }
}

const INTRO: &str = "You are an AI administrative assistant that is tasked with changing the file name \
in accordance with the content of the file. The current filename may not be accurate so make sure \
to check the content.";

fn taxonomy_section() -> String {
    let labels: Vec<&str> = ContentType::ALL.iter().map(|ct| ct.as_str()).collect();
    format!(
        "The content type could be one of the following: {}.",
        labels.join(", ")
    )
}

const CONTRACT_PAGE_RULE: &str = "To mark a file as a Rental_Contract or Mortgage_Contract it must \
contain at least 1 page from said contract.";

const CONTRACT_ENTITIES_RULE: &str = "A page also counts as contract evidence when it shows the \
entities that characterise such a contract: a Lender, a credit intermediary, a Renter or an Owner.";

const LOAN_TAX_CERTIFICATE_RULE: &str = "A loan tax certificate is classified as Mortgage_Contract.";

const REPAYMENT_TABLE_RULE: &str = "A file should be classified as Repayment_Table only if it almost \
exclusively contains a repayment (amortization) table: principal, interest and total amounts broken \
down per period.";

const PAYMENT_RULE: &str = "If you see a payment being made (whether for rental or mortgage) you \
need to mark it as Contract_Payment.";

const PAYMENT_EVIDENCE_RULE: &str = "A Contract_Payment requires evidence of a payment that was \
actually performed, such as a bank statement or a signed receipt. It must show an amount, a date, a \
payment description or reference, and the receiving party. The paying party is optional. A clause \
in a contract that obliges someone to pay is NOT a payment.";

const TELEWORKING_RULE: &str = "A Teleworking_Agreement is an agreement between an employer and an \
employee that governs working from a location other than the office (not necessarily the \
employee's home). It describes the allowed extent of teleworking, responsibilities, working hours, \
communication and equipment.";

const FALLBACK_RULE: &str = "If the pages don't satisfy any of the above, classify as Unclassified. \
When in doubt, choose Unclassified rather than guessing a specific type.";

const ORDERING_RULE: &str = "In ThoughtProcess, first describe what you observe on the pages, and \
only state your conclusion at the end. Always put the final content type in ContentType as well.";

const SCHEMA_SECTION: &str = "You will be responding to this message with JSON in the following format:

{
    \"ThoughtProcess\": \"\",
    \"ContentType\": \"\"
}";

const LANGUAGES: &str = "The images will likely contain French/Dutch/English.";
