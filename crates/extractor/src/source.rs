//! Paragraph sources for the segmenter.
//!
//! `.docx` input is unpacked with docx-rs, one entry per document paragraph;
//! anything else is read as UTF-8 text with one paragraph per line.

use crate::error::{ExtractorError, Result};
use crate::segment::{segment_paragraphs, NarrativeSet};
use docx_rs::{DocumentChild, ParagraphChild, RunChild};
use std::fs;
use std::path::Path;

pub fn read_paragraphs(path: &Path) -> Result<Vec<String>> {
    let is_docx = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"));
    if is_docx {
        read_docx_paragraphs(path)
    } else {
        read_text_paragraphs(path)
    }
}

fn read_text_paragraphs(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    Ok(text.lines().map(str::to_string).collect())
}

fn read_docx_paragraphs(path: &Path) -> Result<Vec<String>> {
    let buf = fs::read(path)?;
    let docx = docx_rs::read_docx(&buf).map_err(|e| ExtractorError::Docx(e.to_string()))?;

    let mut paragraphs = Vec::new();
    for child in docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            let mut text = String::new();
            for pc in &paragraph.children {
                if let ParagraphChild::Run(run) = pc {
                    for rc in &run.children {
                        if let RunChild::Text(t) = rc {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            paragraphs.push(text);
        }
    }
    Ok(paragraphs)
}

/// Load and segment the narrative source document.
///
/// A missing file is a degraded start, not a fatal one: the service answers
/// every lookup with "not found" until the document is supplied.
pub fn load_narratives(path: &Path) -> Result<NarrativeSet> {
    if !path.exists() {
        log::error!("Narrative source not found: {}", path.display());
        return Ok(NarrativeSet::default());
    }
    let paragraphs = read_paragraphs(path)?;
    let set = segment_paragraphs(&paragraphs);
    log::info!(
        "Loaded {} archetype narratives from {}",
        set.len(),
        path.display()
    );
    Ok(set)
}
