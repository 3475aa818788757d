/// Flatten a title/body pair into the lower-cased corpus every matcher reads.
/// No stemming or punctuation stripping happens here.
pub fn normalize_corpus(title: &str, body: &str) -> String {
    let mut corpus = String::with_capacity(title.len() + body.len() + 1);
    corpus.push_str(title);
    corpus.push(' ');
    corpus.push_str(body);
    corpus.to_lowercase()
}

/// Identity form of a title for cross-source deduplication.
pub fn normalize_title(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}
