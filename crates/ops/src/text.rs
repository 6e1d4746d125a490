//! Shared text segmentation helpers.

/// Split text into sentences at `.`, `!` or `?` followed by whitespace.
///
/// Returned slices are trimmed and never empty.
pub(crate) fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if matches!(ch, '.' | '!' | '?') {
            let boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
            if boundary {
                let end = idx + ch.len_utf8();
                push_trimmed(&mut sentences, &text[start..end]);
                start = end;
            }
        }
    }
    push_trimmed(&mut sentences, &text[start..]);
    sentences
}

/// Split text into paragraphs separated by a blank line.
pub(crate) fn split_paragraphs(text: &str) -> Vec<&str> {
    let mut paragraphs = Vec::new();
    for part in text.split("\n\n") {
        push_trimmed(&mut paragraphs, part);
    }
    paragraphs
}

pub(crate) fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, piece: &'a str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        out.push(piece);
    }
}
