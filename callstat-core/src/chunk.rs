/// Split `text` into pieces of at most `max_len` characters.
///
/// Each cut goes at the last paragraph break (`\n\n`) inside the window, or
/// exactly at `max_len` if there is none. Leading whitespace of the remainder
/// is dropped, so chunks never start with the separator. Lengths count
/// `char`s, not bytes.
pub fn split_chunks(text: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    loop {
        let Some((window_end, _)) = rest.char_indices().nth(max_len) else {
            if chunks.is_empty() || !rest.is_empty() {
                chunks.push(rest.to_string());
            }
            break;
        };

        let cut = match rest[..window_end].rfind("\n\n") {
            Some(idx) if idx > 0 => idx,
            _ => window_end,
        };
        chunks.push(rest[..cut].to_string());
        rest = rest[cut..].trim_start();
    }

    chunks
}
