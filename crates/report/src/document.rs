//! In-memory .docx assembly for the downloadable report.

use crate::error::{ReportError, Result};
use docx_rs::{Docx, Paragraph, Run};
use std::io::Cursor;

/// Filename plus packed bytes, ready to stream as an attachment.
#[derive(Debug, Clone)]
pub struct DownloadDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub fn attachment_filename(name: &str) -> String {
    format!("{}_Detailed_Report.docx", name.replace(' ', "_"))
}

/// One Heading-1 paragraph for the archetype name, one body paragraph for
/// the narrative.
pub fn build_document(name: &str, body: &str) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    Docx::new()
        .add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_text(name))
                .style("Heading1"),
        )
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text(body)))
        .build()
        .pack(&mut buf)
        .map_err(|e| ReportError::Document(e.to_string()))?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_replace_spaces_with_underscores() {
        assert_eq!(
            attachment_filename("Starlight Wanderer"),
            "Starlight_Wanderer_Detailed_Report.docx"
        );
        assert_eq!(attachment_filename("Unknown"), "Unknown_Detailed_Report.docx");
    }

    #[test]
    fn packed_document_is_a_zip_container() {
        let bytes = build_document("Aquashine", "Still waters.").expect("build");
        assert_eq!(&bytes[..2], b"PK");
    }
}
