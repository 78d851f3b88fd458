//! Core data models used throughout docsort.
//!
//! These types represent the documents, page attachments, and classification
//! results that flow between the audit, rendering, and classification stages.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::contract::ContractVersion;

/// A source file discovered on disk, as seen by the audit pass.
///
/// Never mutated after inspection; page attachments are derived from it once
/// per classification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub page_count: u32,
    /// Password-protected or unreadable. Such documents are never classified.
    pub protected: bool,
}

/// Media type of a page attachment sent to the classification engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Jpeg,
    Png,
    Pdf,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::Pdf => "application/pdf",
        }
    }

    /// Guess the media type from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(MediaType::Jpeg),
            "png" => Some(MediaType::Png),
            "pdf" => Some(MediaType::Pdf),
            _ => None,
        }
    }
}

/// One page of a document, rendered into a form the engine accepts.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// 1-based page number in the source document.
    pub page_number: u32,
    pub media_type: MediaType,
    pub data: Vec<u8>,
}

/// Everything the engine sees for one document.
#[derive(Debug, Clone)]
pub struct ClassificationRequest {
    pub pages: Vec<PageImage>,
    pub version: ContractVersion,
}

/// The fixed six-label taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ContentType {
    #[serde(rename = "Rental_Contract")]
    RentalContract,
    #[serde(rename = "Mortgage_Contract")]
    MortgageContract,
    #[serde(rename = "Contract_Payment")]
    ContractPayment,
    #[serde(rename = "Teleworking_Agreement")]
    TeleworkingAgreement,
    #[serde(rename = "Repayment_Table")]
    RepaymentTable,
    #[serde(rename = "Unclassified")]
    Unclassified,
}

impl ContentType {
    pub const ALL: [ContentType; 6] = [
        ContentType::RentalContract,
        ContentType::MortgageContract,
        ContentType::ContractPayment,
        ContentType::TeleworkingAgreement,
        ContentType::RepaymentTable,
        ContentType::Unclassified,
    ];

    /// The wire label, e.g. `"Rental_Contract"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::RentalContract => "Rental_Contract",
            ContentType::MortgageContract => "Mortgage_Contract",
            ContentType::ContractPayment => "Contract_Payment",
            ContentType::TeleworkingAgreement => "Teleworking_Agreement",
            ContentType::RepaymentTable => "Repayment_Table",
            ContentType::Unclassified => "Unclassified",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a label is not one of the six wire labels.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown content type label: {0:?}")]
pub struct UnknownLabel(pub String);

impl FromStr for ContentType {
    type Err = UnknownLabel;

    /// Exact, case-sensitive match against the wire labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .iter()
            .copied()
            .find(|ct| ct.as_str() == s)
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

/// A validated classification outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    #[serde(rename = "ThoughtProcess")]
    pub thought_process: String,
    #[serde(rename = "ContentType")]
    pub content_type: ContentType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_parse_exactly() {
        for ct in ContentType::ALL {
            assert_eq!(ct.as_str().parse::<ContentType>().unwrap(), ct);
        }
        assert!("rental_contract".parse::<ContentType>().is_err());
        assert!(" Rental_Contract".parse::<ContentType>().is_err());
        assert!("Invoice".parse::<ContentType>().is_err());
    }

    #[test]
    fn result_serializes_with_wire_names() {
        let result = ClassificationResult {
            thought_process: "Signed lease between Owner and Renter.".to_string(),
            content_type: ContentType::RentalContract,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["ContentType"], "Rental_Contract");
        assert_eq!(
            json["ThoughtProcess"],
            "Signed lease between Owner and Renter."
        );
    }

    #[test]
    fn media_type_from_extension() {
        assert_eq!(MediaType::from_extension("PDF"), Some(MediaType::Pdf));
        assert_eq!(MediaType::from_extension("jpeg"), Some(MediaType::Jpeg));
        assert_eq!(MediaType::from_extension("docx"), None);
    }
}
