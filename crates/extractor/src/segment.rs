//! Single-pass segmentation of a narrative document into lookup maps.
//!
//! The source is structured only by convention: a trait-level header line
//! (`Openness: High, Conscientiousness: Low, ...`), usually followed within a
//! few paragraphs by an `Archetype: <name>` label, then free-form body text
//! until the next header. The scan keeps an explicit cursor so the name
//! lookahead can skip consumed paragraphs without hidden index mutation.

use archetype_model::{TraitCode, TraitLevel, TRAIT_NAMES};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// How many paragraphs after a header may carry the `Archetype:` label.
const NAME_LOOKAHEAD: usize = 3;

// Separators between a trait name and its level are permissive: colon, dash
// variants, or arbitrary interleaved text. Order of the five traits is fixed.
static HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    let fields: Vec<String> = TRAIT_NAMES
        .iter()
        .map(|name| format!(r"{name}\s*[:\-–—]?\s*(low|medium|high)"))
        .collect();
    Regex::new(&format!("(?i){}", fields.join(".*?"))).expect("header regex compiles")
});

static ARCHETYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^archetype\s*[:\-–—]?\s*(.+?)\s*$").expect("archetype regex compiles")
});

/// Immutable narrative lookup tables, built once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NarrativeSet {
    by_code: HashMap<String, String>,
    by_name: HashMap<String, String>,
}

impl NarrativeSet {
    #[must_use]
    pub fn lookup_code(&self, code: &str) -> Option<&str> {
        self.by_code.get(code).map(String::as_str)
    }

    #[must_use]
    pub fn lookup_name(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    /// Display name for a narrative, reverse-resolved from its text.
    #[must_use]
    pub fn name_for_text(&self, text: &str) -> Option<&str> {
        self.by_name
            .iter()
            .find(|(_, t)| t.as_str() == text)
            .map(|(n, _)| n.as_str())
    }

    pub fn iter_by_code(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_code.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

#[derive(Default)]
struct Accumulator {
    code: Option<String>,
    name: Option<String>,
    buffer: Vec<String>,
}

impl Accumulator {
    /// Commit the current archetype's text, if any. Buffer always resets;
    /// an empty buffer commits nothing, so a header with no body leaves no
    /// record.
    fn flush(&mut self, set: &mut NarrativeSet) {
        if let Some(code) = &self.code {
            if !self.buffer.is_empty() {
                let text = self.buffer.join("\n").trim().to_string();
                set.by_code.insert(code.clone(), text.clone());
                if let Some(name) = &self.name {
                    set.by_name.insert(name.clone(), text);
                }
            }
        }
        self.buffer.clear();
    }
}

fn captured_level(caps: &regex::Captures<'_>, group: usize) -> TraitLevel {
    caps.get(group)
        .expect("header regex has five level groups")
        .as_str()
        .parse()
        .expect("header regex restricts levels to low|medium|high")
}

/// Segment raw paragraphs into `by_code` / `by_name` narrative maps.
///
/// Header and name detection run on trimmed text; buffered body paragraphs
/// keep their original whitespace. Later headers with the same code overwrite
/// earlier ones.
#[must_use]
pub fn segment_paragraphs(raw: &[String]) -> NarrativeSet {
    let trimmed: Vec<&str> = raw.iter().map(|line| line.trim()).collect();

    let mut set = NarrativeSet::default();
    let mut acc = Accumulator::default();

    let mut i = 0usize;
    while i < trimmed.len() {
        if let Some(caps) = HEADER_RE.captures(trimmed[i]) {
            acc.flush(&mut set);
            let code = TraitCode::new([
                captured_level(&caps, 1),
                captured_level(&caps, 2),
                captured_level(&caps, 3),
                captured_level(&caps, 4),
                captured_level(&caps, 5),
            ]);
            acc.code = Some(code.to_string());
            acc.name = None;

            for j in 1..=NAME_LOOKAHEAD {
                let Some(candidate) = trimmed.get(i + j) else {
                    break;
                };
                if let Some(name_caps) = ARCHETYPE_RE.captures(candidate) {
                    acc.name = Some(name_caps[1].trim().to_string());
                    // Skip the consumed name line (and anything before it).
                    i += j;
                    break;
                }
            }
            if acc.name.is_none() {
                acc.name = Some(format!("Unknown_{i}"));
            }
        } else if acc.code.is_some() {
            acc.buffer.push(raw[i].clone());
        }
        i += 1;
    }
    acc.flush(&mut set);

    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn segments_header_name_and_body() {
        let doc = lines(&[
            "Openness: High, Conscientiousness: Low, Extraversion: Medium, \
             Agreeableness: High, Neuroticism: Low",
            "",
            "Archetype: Starlight Wanderer",
            "First paragraph of the narrative.",
            "Second paragraph, still the same archetype.",
        ]);
        let set = segment_paragraphs(&doc);

        let expected =
            "First paragraph of the narrative.\nSecond paragraph, still the same archetype.";
        assert_eq!(set.lookup_code("High-Low-Medium-High-Low"), Some(expected));
        assert_eq!(set.lookup_name("Starlight Wanderer"), Some(expected));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn header_separators_are_permissive() {
        let doc = lines(&[
            "openness - HIGH ... conscientiousness high, extraversion: low; \
             agreeableness — medium and neuroticism – high",
            "Archetype - Iron Cartographer",
            "Body.",
        ]);
        let set = segment_paragraphs(&doc);
        assert_eq!(set.lookup_code("High-High-Low-Medium-High"), Some("Body."));
        assert_eq!(set.lookup_name("Iron Cartographer"), Some("Body."));
    }

    #[test]
    fn missing_name_synthesizes_placeholder_from_paragraph_index() {
        let doc = lines(&[
            "filler before any header",
            "Openness: Low, Conscientiousness: Low, Extraversion: Low, \
             Agreeableness: Low, Neuroticism: Low",
            "Just body text, no archetype label anywhere near.",
            "More body.",
            "Even more body.",
            "And more.",
        ]);
        let set = segment_paragraphs(&doc);
        let text = set.lookup_code("Low-Low-Low-Low-Low").expect("record");
        assert!(text.starts_with("Just body text"));
        assert_eq!(set.lookup_name("Unknown_1"), Some(text));
    }

    #[test]
    fn name_outside_lookahead_window_is_treated_as_body() {
        let doc = lines(&[
            "Openness: Low, Conscientiousness: Low, Extraversion: Low, \
             Agreeableness: Low, Neuroticism: Low",
            "pad one",
            "pad two",
            "pad three",
            "Archetype: Too Far Away",
        ]);
        let set = segment_paragraphs(&doc);
        // The label line lands in the buffer instead of naming the record.
        let text = set.lookup_code("Low-Low-Low-Low-Low").expect("record");
        assert!(text.contains("Archetype: Too Far Away"));
        assert_eq!(set.lookup_name("Too Far Away"), None);
        assert_eq!(set.lookup_name("Unknown_0"), Some(text));
    }

    #[test]
    fn header_with_no_body_produces_no_record() {
        let doc = lines(&[
            "Openness: High, Conscientiousness: High, Extraversion: High, \
             Agreeableness: High, Neuroticism: High",
            "Archetype: Ghost Entry",
            "Openness: Low, Conscientiousness: Low, Extraversion: Low, \
             Agreeableness: Low, Neuroticism: Low",
            "Archetype: Real Entry",
            "Actual text.",
        ]);
        let set = segment_paragraphs(&doc);
        assert_eq!(set.lookup_code("High-High-High-High-High"), None);
        assert_eq!(set.lookup_name("Ghost Entry"), None);
        assert_eq!(set.lookup_code("Low-Low-Low-Low-Low"), Some("Actual text."));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn duplicate_codes_last_wins() {
        let doc = lines(&[
            "Openness: Low, Conscientiousness: Low, Extraversion: Low, \
             Agreeableness: Low, Neuroticism: Low",
            "Archetype: First",
            "old text",
            "Openness: Low, Conscientiousness: Low, Extraversion: Low, \
             Agreeableness: Low, Neuroticism: Low",
            "Archetype: Second",
            "new text",
        ]);
        let set = segment_paragraphs(&doc);
        assert_eq!(set.lookup_code("Low-Low-Low-Low-Low"), Some("new text"));
        assert_eq!(set.lookup_name("First"), Some("old text"));
        assert_eq!(set.lookup_name("Second"), Some("new text"));
    }

    #[test]
    fn body_keeps_raw_whitespace_while_detection_uses_trimmed_lines() {
        let doc = lines(&[
            "   Openness: High, Conscientiousness: Low, Extraversion: Medium, \
             Agreeableness: High, Neuroticism: Low   ",
            "Archetype: Indented One",
            "  leading spaces preserved",
            "trailing too  ",
        ]);
        let set = segment_paragraphs(&doc);
        assert_eq!(
            set.lookup_name("Indented One"),
            // Outer trim applies to the joined text, interior stays raw.
            Some("leading spaces preserved\ntrailing too")
        );
    }

    #[test]
    fn re_running_extraction_is_idempotent() {
        let doc = lines(&[
            "Openness: Medium, Conscientiousness: High, Extraversion: Low, \
             Agreeableness: Medium, Neuroticism: High",
            "Archetype: Twice Scanned",
            "Stable text.",
        ]);
        assert_eq!(segment_paragraphs(&doc), segment_paragraphs(&doc));
    }

    #[test]
    fn text_before_first_header_is_ignored() {
        let doc = lines(&["Preamble about the test.", "More preamble."]);
        let set = segment_paragraphs(&doc);
        assert!(set.is_empty());
    }
}
