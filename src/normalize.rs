/// Re-flows converted text so prose paragraphs become single unwrapped lines
/// while structural blocks keep their separation.
///
/// A line is prose when, ignoring surrounding whitespace, it holds 5 to 100
/// whitespace-delimited tokens. Prose keeps its text as-is (any embedded
/// newlines from upstream processing collapse to spaces); everything else —
/// headers, list markers, code, short captions, very long runs — is wrapped
/// in newlines to stay a block of its own. The 5–100 boundary is a
/// compatibility contract; downstream output depends on it exactly.
pub fn reflow(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if is_prose(line) {
                line.replace('\n', " ")
            } else {
                format!("\n{line}\n")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_prose(line: &str) -> bool {
    let tokens = line.trim().split_whitespace().count();
    (5..=100).contains(&tokens)
}
