//! Sentence splitting and content-term extraction shared by the signals.

const MIN_TERM_LEN: usize = 4;

static STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "also", "although", "among", "another",
    "because", "been", "before", "being", "below", "between", "both", "could", "does", "doing",
    "down", "during", "each", "either", "else", "even", "every", "from", "further", "have",
    "having", "here", "however", "into", "itself", "just", "least", "less", "like", "made",
    "make", "many", "more", "most", "much", "must", "neither", "only", "other", "otherwise",
    "over", "same", "should", "since", "some", "such", "than", "that", "their", "them", "then",
    "there", "these", "they", "this", "those", "through", "thus", "under", "until", "upon",
    "very", "were", "what", "when", "where", "whether", "which", "while", "whom", "whose",
    "will", "with", "within", "without", "would", "your", "patient", "patients",
];

/// Split on sentence-ending punctuation followed by whitespace, and on line
/// breaks. Decimal points do not split.
pub fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let boundary = match c {
            '\n' => true,
            '.' | '!' | '?' => chars.peek().map_or(true, |(_, next)| next.is_whitespace()),
            _ => false,
        };
        if boundary {
            let end = i + c.len_utf8();
            push_trimmed(&mut out, &text[start..end]);
            start = end;
        }
    }
    push_trimmed(&mut out, &text[start..]);
    out
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, piece: &'a str) {
    let piece = piece.trim();
    if piece.chars().any(char::is_alphanumeric) {
        out.push(piece);
    }
}

/// Lowercased, stemmed content terms of `text`, in order, duplicates kept.
pub fn content_terms(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= MIN_TERM_LEN)
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_lowercase)
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .map(|w| stem(&w))
        .collect()
}

/// Light suffix stemming so inflected forms meet: `doses`/`dose`,
/// `therapies`/`therapy`, `increased`/`increase`.
pub fn stem(word: &str) -> String {
    let mut w = word.to_string();
    for (suffix, replacement) in [("ies", "y"), ("ing", ""), ("ed", ""), ("s", "")] {
        if w.ends_with(suffix) && w.len() - suffix.len() >= MIN_TERM_LEN && !w.ends_with("ss") {
            w.truncate(w.len() - suffix.len());
            w.push_str(replacement);
            break;
        }
    }
    if w.ends_with('e') && w.len() > MIN_TERM_LEN {
        w.pop();
    }
    w
}
