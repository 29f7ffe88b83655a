//! Archetype narrative extraction.
//!
//! Recovers structured archetype narratives from a loosely formatted source
//! document: a forward scan over its paragraphs keyed on trait-level header
//! lines, producing immutable lookup maps by trait code and by archetype
//! name. Runs once at startup; never on a request path.

mod error;
mod segment;
mod source;

pub use error::{ExtractorError, Result};
pub use segment::{segment_paragraphs, NarrativeSet};
pub use source::{load_narratives, read_paragraphs};
