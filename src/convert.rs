use std::sync::LazyLock;

use regex::Regex;

static IMG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<img\b[^>]*>").expect("img pattern must compile"));

static TABLE_MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)</?(?:table|thead|tbody|tfoot|tr|td|th)\b[^>]*>")
        .expect("table pattern must compile")
});

static EMPTY_ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<a\b[^>]*>\s*</a>").expect("empty anchor pattern must compile")
});

/// Seam for the third-party HTML to Markdown conversion so the pipeline can
/// run against a fake converter in tests.
pub trait HtmlToMarkdown {
    fn convert(&self, html: &str) -> String;
}

/// Default converter built on `html2md`, tuned for essay pages: images and
/// table markup are dropped before conversion and inline links are rewritten
/// into reference style afterwards. Code regions come out of `html2md` as
/// fenced blocks already.
#[derive(Debug, Default)]
pub struct Html2mdConverter;

impl HtmlToMarkdown for Html2mdConverter {
    fn convert(&self, html: &str) -> String {
        let stripped = strip_images_and_table_markup(html);
        let markdown = html2md::parse_html(&stripped);
        reference_style_links(&markdown)
    }
}

/// Decodes raw page bytes as UTF-8, falling back to Latin-1 when the page
/// predates the site's UTF-8 era. Latin-1 maps every byte to the code point
/// of the same value, so the fallback cannot fail.
pub fn decode_page(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Removes `<img>` elements entirely and unwraps table markup while keeping
/// cell contents, matching a converter configured to ignore images and
/// tables. The essay body itself lives inside the site's layout tables.
/// Anchors left empty by image removal (the pages' image-only backlink to
/// the index is the common case) are dropped too, so they never surface as
/// empty links in the markdown.
fn strip_images_and_table_markup(html: &str) -> String {
    let without_images = IMG_TAG.replace_all(html, "");
    let without_empty_anchors = EMPTY_ANCHOR.replace_all(&without_images, "");
    TABLE_MARKUP
        .replace_all(&without_empty_anchors, "\n")
        .into_owned()
}

/// Rewrites inline `[text](url)` links into numbered reference style, with
/// the link definitions appended after the document body. Links with empty
/// text are left inline untouched: they are converter artifacts, and later
/// pipeline stages match them literally.
fn reference_style_links(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    let mut destinations: Vec<String> = Vec::new();
    let bytes = markdown.as_bytes();
    let mut cursor = 0usize;

    while let Some(rel) = markdown[cursor..].find("](") {
        let start = cursor + rel;
        out.push_str(&markdown[cursor..start + 1]);

        let mut i = start + 2;
        let mut depth = 1usize;
        while i < bytes.len() {
            match bytes[i] {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            i += 1;
        }

        if depth != 0 {
            out.push_str(&markdown[start + 1..]);
            cursor = markdown.len();
            break;
        }

        if start > 0 && bytes[start - 1] == b'[' {
            out.push_str(&markdown[start + 1..=i]);
            cursor = i + 1;
            continue;
        }

        destinations.push(markdown[start + 2..i].to_owned());
        out.push_str(&format!("[{}]", destinations.len()));
        cursor = i + 1;
    }

    out.push_str(&markdown[cursor..]);

    if destinations.is_empty() {
        return out;
    }

    out.push_str("\n\n");
    for (idx, destination) in destinations.iter().enumerate() {
        out.push_str(&format!("   [{}]: {destination}\n", idx + 1));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_prefers_utf8() {
        assert_eq!(decode_page("caf\u{e9}".as_bytes()), "café");
    }

    #[test]
    fn decode_falls_back_to_latin1() {
        // 0xE9 is é in Latin-1 but invalid as a standalone UTF-8 byte.
        assert_eq!(decode_page(&[b'c', b'a', b'f', 0xE9]), "café");
    }

    #[test]
    fn images_are_dropped_and_table_contents_kept() {
        let html = "<table><tr><td><p>Body text.</p><img src=\"x.gif\" width=\"410\"></td></tr></table>";
        let markdown = Html2mdConverter.convert(html);
        assert!(markdown.contains("Body text."));
        assert!(!markdown.contains("x.gif"));
        assert!(!markdown.contains('|'));
    }

    #[test]
    fn inline_links_become_references() {
        let converted = reference_style_links("See [the essay](https://example.com/a) today.");
        assert!(converted.starts_with("See [the essay][1] today."));
        assert!(converted.trim_end().ends_with("[1]: https://example.com/a"));
    }

    #[test]
    fn multiple_links_are_numbered_in_order() {
        let converted = reference_style_links("[a](u1) and [b](u2)");
        assert!(converted.starts_with("[a][1] and [b][2]"));
        assert!(converted.contains("   [1]: u1\n"));
        assert!(converted.contains("   [2]: u2\n"));
    }

    #[test]
    fn text_without_links_is_unchanged() {
        assert_eq!(reference_style_links("plain text"), "plain text");
    }

    #[test]
    fn empty_text_links_stay_inline_and_get_no_definition() {
        let converted =
            reference_style_links("[](index.html)  \n  \nBody with [a link](https://example.com/).");
        assert!(converted.starts_with("[](index.html)  \n  \nBody with [a link][1]."));
        assert!(converted.trim_end().ends_with("[1]: https://example.com/"));
        assert!(!converted.contains("]: index.html"));
    }

    #[test]
    fn image_only_backlink_anchors_are_dropped_during_conversion() {
        let html = concat!(
            "<a href=\"index.html\"><img src=\"back.gif\" width=\"69\" height=\"23\"></a>",
            "<p>The essay body keeps its own prose and [1] markers intact.</p>",
        );
        let markdown = Html2mdConverter.convert(html);
        assert!(!markdown.contains("index.html"));
        assert!(markdown.contains("The essay body keeps its own prose"));
    }

    #[test]
    fn anchors_with_text_survive_image_removal() {
        let html = "<p><a href=\"essay.html\"><img src=\"x.gif\" width=\"10\" height=\"10\">Read it</a></p>";
        let markdown = Html2mdConverter.convert(html);
        assert!(markdown.contains("[Read it][1]"));
    }
}
