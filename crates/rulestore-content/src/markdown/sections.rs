//! Section splitting for rule document bodies.
//!
//! A body is an ordered sequence of sections delimited by `##` headings.
//! The section name is the heading text normalized to kebab-case (so
//! `## Code Layout` can be referenced as `layout` only if the author
//! writes `## Layout`; names are taken literally, not guessed). Content
//! between the frontmatter and the first `##` heading, when non-blank, is
//! kept as the [`PREAMBLE_SECTION`] so no author text is dropped.
//!
//! Only level-2 headings delimit sections; `###` and deeper headings are
//! part of the enclosing section's content, which stays byte-exact apart
//! from trimmed leading/trailing blank lines. The engine treats content
//! as opaque.

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use rulestore_core::util::ids::normalize_segment;

/// Name given to body content that precedes the first `##` heading.
pub const PREAMBLE_SECTION: &str = "preamble";

/// A named slice of a document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSection {
    /// Kebab-case section name derived from the heading text.
    pub name: String,
    /// The section's content, trimmed of surrounding blank lines.
    pub content: String,
}

/// Split a document body into ordered named sections.
///
/// # Example
///
/// ```
/// use rulestore_content::split_sections;
///
/// let body = "Intro text.\n\n## Layout\n\nUse a flat layout.\n\n## Testing\n\nTable tests.\n";
/// let sections = split_sections(body);
///
/// assert_eq!(sections.len(), 3);
/// assert_eq!(sections[0].name, "preamble");
/// assert_eq!(sections[1].name, "layout");
/// assert_eq!(sections[1].content, "Use a flat layout.");
/// assert_eq!(sections[2].name, "testing");
/// ```
pub fn split_sections(body: &str) -> Vec<RawSection> {
    let mut headings: Vec<(std::ops::Range<usize>, String)> = Vec::new();

    let mut in_h2 = false;
    let mut heading_span = 0..0;
    let mut heading_text = String::new();

    for (event, range) in Parser::new(body).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H2,
                ..
            }) => {
                in_h2 = true;
                heading_span = range;
                heading_text.clear();
            }
            Event::End(TagEnd::Heading(HeadingLevel::H2)) => {
                if in_h2 {
                    headings.push((heading_span.clone(), heading_text.trim().to_string()));
                }
                in_h2 = false;
            }
            Event::Text(text) | Event::Code(text) if in_h2 => {
                heading_text.push_str(&text);
            }
            Event::SoftBreak | Event::HardBreak if in_h2 => {
                heading_text.push(' ');
            }
            _ => {}
        }
    }

    let mut sections: Vec<RawSection> = Vec::new();

    let preamble_end = headings.first().map_or(body.len(), |(span, _)| span.start);
    let preamble = trim_blank_edges(&body[..preamble_end]);
    if !preamble.is_empty() {
        sections.push(RawSection {
            name: PREAMBLE_SECTION.to_string(),
            content: preamble.to_string(),
        });
    }

    for (i, (span, text)) in headings.iter().enumerate() {
        let end = headings
            .get(i + 1)
            .map_or(body.len(), |(next_span, _)| next_span.start);
        let content = trim_blank_edges(&body[span.end..end]).to_string();
        let name = normalize_segment(text);
        if name.is_empty() {
            log::warn!("skipping section with empty heading text");
            continue;
        }

        match sections.iter_mut().find(|s| s.name == name) {
            Some(existing) => {
                // Repeated heading: fold into the first occurrence so the
                // name stays a unique key for override matching.
                log::warn!("duplicate section heading '{name}', folding into first occurrence");
                if !content.is_empty() {
                    if !existing.content.is_empty() {
                        existing.content.push_str("\n\n");
                    }
                    existing.content.push_str(&content);
                }
            }
            None => sections.push(RawSection { name, content }),
        }
    }

    sections
}

/// Trim leading and trailing blank lines without touching interior bytes.
fn trim_blank_edges(text: &str) -> &str {
    text.trim_matches(['\n', '\r', ' ', '\t'])
}

// ============================================================================
// Tests
// ============================================================================
