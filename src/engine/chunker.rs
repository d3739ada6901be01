/// Splits `text` into display segments of at most `max_len` characters on
/// word boundaries. A single word longer than `max_len` is kept whole.
///
/// Always returns at least one chunk; blank input yields one empty chunk so
/// the display counter still reads `(1/1)`.
pub fn chunk(text: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_len > 0 && current_len + 1 + word_len > max_len {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if current_len > 0 || chunks.is_empty() {
        chunks.push(current);
    }

    chunks
}
