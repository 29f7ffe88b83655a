//! Report resolution: trait code + paid flag → renderable view.
//!
//! Lookup order is by-code first, then registry name to by-name. A miss
//! substitutes placeholder text; a report request never fails. Unpaid
//! requests get a fixed preview; the real narrative is never placed in an
//! unpaid view.

mod document;
mod error;

use archetype_extractor::NarrativeSet;
use archetype_registry::ArchetypeRegistry;

pub use document::{attachment_filename, build_document, DownloadDocument};
pub use error::{ReportError, Result};

pub const NOT_FOUND_TEXT: &str = "Detailed report not found.";
pub const DOWNLOAD_FALLBACK_TEXT: &str = "Detailed text not found.";
pub const PREVIEW_TEXT: &str =
    "Preview only. Purchase or use a free code to unlock the full report.";
pub const FOOTER_QUOTE: &str = "“Depth rewards patience.”";
pub const UNKNOWN_NAME: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportView {
    pub archetype: String,
    pub traits: String,
    pub subtype: String,
    pub sections: Vec<ReportSection>,
    pub quote: String,
}

pub struct ReportService {
    narratives: NarrativeSet,
    registry: ArchetypeRegistry,
}

impl ReportService {
    #[must_use]
    pub fn new(narratives: NarrativeSet, registry: ArchetypeRegistry) -> Self {
        Self {
            narratives,
            registry,
        }
    }

    #[must_use]
    pub fn narratives(&self) -> &NarrativeSet {
        &self.narratives
    }

    #[must_use]
    pub fn registry(&self) -> &ArchetypeRegistry {
        &self.registry
    }

    /// Resolve a report view. Always succeeds; unknown codes fall through to
    /// placeholder text and an "Unknown" archetype.
    #[must_use]
    pub fn render(&self, code: &str, paid: bool) -> ReportView {
        let mut name = None;
        let mut detailed = self.narratives.lookup_code(code);
        if detailed.is_none() {
            if let Some(registered) = self.registry.name_for(code) {
                name = Some(registered);
                detailed = self.narratives.lookup_name(registered);
            }
        }
        let detailed = detailed.unwrap_or(NOT_FOUND_TEXT);
        if name.is_none() {
            name = self.registry.name_for(code);
        }

        let (subtype, sections) = if paid {
            (
                "N/A",
                vec![ReportSection {
                    title: "Detailed Report".to_string(),
                    body: detailed.to_string(),
                }],
            )
        } else {
            (
                "Locked",
                vec![ReportSection {
                    title: "Summary".to_string(),
                    body: PREVIEW_TEXT.to_string(),
                }],
            )
        };

        ReportView {
            archetype: name.unwrap_or(UNKNOWN_NAME).to_string(),
            traits: code.to_string(),
            subtype: subtype.to_string(),
            sections,
            quote: FOOTER_QUOTE.to_string(),
        }
    }

    /// Build the downloadable .docx for a code. Unknown codes still produce
    /// a document, named "Unknown" and carrying the fallback body.
    pub fn download(&self, code: &str) -> Result<DownloadDocument> {
        let name = self.registry.name_for(code).unwrap_or(UNKNOWN_NAME);
        let body = self
            .narratives
            .lookup_code(code)
            .or_else(|| self.narratives.lookup_name(name))
            .unwrap_or(DOWNLOAD_FALLBACK_TEXT);

        Ok(DownloadDocument {
            filename: attachment_filename(name),
            bytes: build_document(name, body)?,
        })
    }
}
