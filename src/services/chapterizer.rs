use regex::Regex;

use crate::config::Config;
use crate::models::Chapter;

/// Heading patterns tried in order against the whole document. Every pattern
/// anchors at a line start and captures the remainder of the line as the
/// title. Order here never influences chapter order in the output; matches
/// are re-sorted by document position before spans are cut.
const HEADING_PATTERNS: &[&str] = &[
    r"(?mi)^(Chapter\s+\d+\b[^\n]*)",
    r"(?mi)^(Chapter\s+(?:One|Two|Three|Four|Five|Six|Seven|Eight|Nine|Ten|Eleven|Twelve)\b[^\n]*)",
    r"(?mi)^(Chapter\s+(?:XII|XI|X|IX|VIII|VII|VI|V|IV|III|II|I)\b[^\n]*)",
    r"(?mi)^((?:Unit|Module|Part)\s+\d+\b[^\n]*)",
    r"(?m)^(\d+\.\s+[A-Z][^\n]+)",
    r"(?m)^(\d+\.\d+\s+[^\n]+)",
];

/// A heading match before deduplication. Several patterns may hit the same
/// physical line at nearly the same offset.
#[derive(Debug)]
struct HeadingCandidate {
    title: String,
    position: usize,
}

/// Segment a document into chapters. Pattern detection runs first; when no
/// heading matches anywhere, falls back to page-grouped sections, or to a
/// single whole-document chapter when no page texts are available (plain
/// text input has no page structure).
pub fn segment(text: &str, page_texts: &[String], config: &Config) -> Vec<Chapter> {
    let chapters = detect_chapters(text, config);
    if !chapters.is_empty() {
        return chapters;
    }

    tracing::info!("no chapter headings detected, using page-based sections");
    if page_texts.is_empty() {
        return vec![Chapter {
            title: "Full Document".to_string(),
            content: text.to_string(),
        }];
    }
    page_sections(page_texts, config)
}

/// Detect chapter boundaries using the heading pattern list. Returns an
/// empty list when nothing matches; the caller decides the fallback.
pub fn detect_chapters(text: &str, config: &Config) -> Vec<Chapter> {
    let mut candidates = collect_candidates(text);

    if let Some(cap) = config.max_heading_len {
        candidates.retain(|c| c.title.len() <= cap);
    }

    // Document order, regardless of which pattern produced the match.
    candidates.sort_by_key(|c| c.position);

    // Offsets landing in the same window belong to the same physical
    // heading line; the first survivor in document order wins.
    let window = config.dedup_window.max(1);
    let mut seen = std::collections::HashSet::new();
    candidates.retain(|c| seen.insert(c.position / window));

    let mut chapters = Vec::with_capacity(candidates.len());
    for (i, candidate) in candidates.iter().enumerate() {
        let start = candidate.position;
        let end = candidates
            .get(i + 1)
            .map(|next| next.position)
            .unwrap_or(text.len());
        chapters.push(Chapter {
            title: candidate.title.clone(),
            content: text[start..end].to_string(),
        });
    }

    tracing::debug!(count = chapters.len(), "chapters detected by pattern matching");
    chapters
}

fn collect_candidates(text: &str) -> Vec<HeadingCandidate> {
    let mut candidates = Vec::new();
    for pattern in HEADING_PATTERNS {
        let Ok(re) = Regex::new(pattern) else {
            continue;
        };
        for caps in re.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                candidates.push(HeadingCandidate {
                    title: m.as_str().trim().to_string(),
                    position: m.start(),
                });
            }
        }
    }
    candidates
}

/// Group pages into fixed-size sections when no headings were found. At most
/// `max_sections` sections are produced; the final section absorbs any
/// remaining pages so none are dropped.
fn page_sections(page_texts: &[String], config: &Config) -> Vec<Chapter> {
    let per_section = config.pages_per_section.max(1);
    let num_sections = config
        .max_sections
        .min(page_texts.len().div_ceil(per_section));

    let mut chapters = Vec::with_capacity(num_sections);
    for i in 0..num_sections {
        let start = i * per_section;
        let end = if i + 1 == num_sections {
            page_texts.len()
        } else {
            ((i + 1) * per_section).min(page_texts.len())
        };

        chapters.push(Chapter {
            title: format!("Section {} (Pages {}-{})", i + 1, start + 1, end),
            content: page_texts[start..end].join("\n\n"),
        });
    }
    chapters
}
