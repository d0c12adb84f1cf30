use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static NOTES_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\*\*Notes?\*\*").expect("notes header pattern must compile"));

static SECTION_TERMINATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\*\*").expect("section terminator pattern must compile"));

static NOTE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+)\]").expect("note marker pattern must compile"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern must compile"));

/// Rewrites a converted essay's trailing "Notes" section into portable
/// footnote syntax.
///
/// The section runs from a bolded `**Note**`/`**Notes**` header to the next
/// bolded header or the end of the text. Numbered `[n] content` entries in
/// it become `[^n]: content` definitions appended after the body, and body
/// occurrences of `[n]` for defined numbers become `[^n]` references.
/// Numbers never defined in the notes are left as plain bracketed text.
/// Text without a notes section, or whose section yields no entries, passes
/// through unchanged.
pub fn rewrite_footnotes(text: &str) -> String {
    let sections = notes_sections(text);
    let Some(first) = sections.first() else {
        return text.to_owned();
    };

    let entries = extract_entries(&text[first.clone()]);
    if entries.is_empty() {
        return text.to_owned();
    }

    let mut definitions: BTreeMap<u64, String> = BTreeMap::new();
    for (number, content) in entries {
        if !content.is_empty() {
            definitions.insert(number, content);
        }
    }

    let mut body = String::with_capacity(text.len());
    let mut cursor = 0usize;
    for range in &sections {
        body.push_str(&text[cursor..range.start]);
        cursor = range.end;
    }
    body.push_str(&text[cursor..]);

    for number in definitions.keys() {
        body = body.replace(&format!("[{number}]"), &format!("[^{number}]"));
    }

    if definitions.is_empty() {
        return body;
    }

    let rendered = definitions
        .iter()
        .map(|(number, content)| format!("[^{number}]: {content}"))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{body}\n\n{rendered}")
}

/// Spans of every notes section, in order. A section ends right before a
/// newline followed by the next bolded header.
fn notes_sections(text: &str) -> Vec<Range<usize>> {
    let mut sections = Vec::new();
    let mut cursor = 0usize;
    while let Some(found) = NOTES_HEADER.find_at(text, cursor) {
        let body_start = found.end();
        let end = SECTION_TERMINATOR
            .find(&text[body_start..])
            .map(|m| body_start + m.start())
            .unwrap_or(text.len());
        sections.push(found.start()..end);
        cursor = end;
    }
    sections
}

/// `[n] content` entries within one notes section; content runs until the
/// next numbered marker or the end of the section, with internal whitespace
/// collapsed to single spaces.
fn extract_entries(notes: &str) -> Vec<(u64, String)> {
    let markers = NOTE_MARKER
        .captures_iter(notes)
        .filter_map(|caps| {
            let full = caps.get(0)?;
            let number: u64 = caps[1].parse().ok()?;
            Some((full.start(), full.end(), number))
        })
        .collect::<Vec<_>>();

    let mut entries = Vec::new();
    for (idx, (_, content_start, number)) in markers.iter().enumerate() {
        let content_end = markers
            .get(idx + 1)
            .map(|(next_start, _, _)| *next_start)
            .unwrap_or(notes.len());
        let raw = notes[*content_start..content_end].trim();
        let content = WHITESPACE_RUN.replace_all(raw, " ").trim().to_owned();
        entries.push((*number, content));
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_without_notes_section_is_unchanged() {
        let text = "A body that mentions [1] but defines nothing.";
        assert_eq!(rewrite_footnotes(text), text);
    }

    #[test]
    fn notes_become_references_and_definitions() {
        let text = "Body, see [1] and [2].\n\n**Notes**\n\n[1] First. [2] Second.";
        let rewritten = rewrite_footnotes(text);

        assert!(rewritten.contains("see [^1] and [^2]"));
        assert!(rewritten.ends_with("[^1]: First.\n\n[^2]: Second."));
        assert!(!rewritten.contains("**Notes**"));
    }

    #[test]
    fn header_matching_spans_case_and_singular_form() {
        let text = "Body [1].\n\n**note**\n[1] Only one.";
        let rewritten = rewrite_footnotes(text);
        assert!(rewritten.contains("Body [^1]."));
        assert!(rewritten.ends_with("[^1]: Only one."));
    }

    #[test]
    fn section_stops_at_the_next_bolded_header() {
        let text = "Body [1].\n\n**Notes**\n[1] A note.\n\n**Thanks** to everyone.";
        let rewritten = rewrite_footnotes(text);
        assert!(rewritten.contains("**Thanks** to everyone."));
        assert!(rewritten.contains("[^1]: A note."));
    }

    #[test]
    fn undefined_body_numbers_stay_bracketed() {
        let text = "Defined [1], undefined [3].\n\n**Notes**\n[1] The only note.";
        let rewritten = rewrite_footnotes(text);
        assert!(rewritten.contains("Defined [^1], undefined [3]."));
    }

    #[test]
    fn entry_whitespace_is_collapsed() {
        let text = "Body [1].\n\n**Notes**\n[1] Wrapped\n    across\n    lines.";
        let rewritten = rewrite_footnotes(text);
        assert!(rewritten.ends_with("[^1]: Wrapped across lines."));
    }

    #[test]
    fn definitions_are_ordered_numerically() {
        let text = "Refs [2] [10].\n\n**Notes**\n[10] Tenth. [2] Second.";
        let rewritten = rewrite_footnotes(text);
        let two = rewritten.find("[^2]: Second.").expect("definition for 2");
        let ten = rewritten.find("[^10]: Tenth.").expect("definition for 10");
        assert!(two < ten);
    }

    #[test]
    fn notes_without_extractable_entries_leave_text_unchanged() {
        let text = "Body [1].\n\n**Notes**\nNothing numbered here.";
        assert_eq!(rewrite_footnotes(text), text);
    }

    #[test]
    fn entries_with_empty_content_drop_the_section_but_define_nothing() {
        let text = "Body [1].\n\n**Notes**\n[1]";
        let rewritten = rewrite_footnotes(text);
        assert!(!rewritten.contains("**Notes**"));
        assert!(rewritten.contains("Body [1]."));
        assert!(!rewritten.contains("[^1]"));
    }
}
