//! Row number to chunk position

/// Find the chunk holding `row` and the row's offset inside it.
///
/// Walks the chunk lengths with a running cursor; chunks may have any
/// length, including zero. Returns `None` past the last row.
pub fn locate(chunk_lengths: &[usize], row: usize) -> Option<(usize, usize)> {
    let mut cursor = row;
    for (chunk, &len) in chunk_lengths.iter().enumerate() {
        if cursor < len {
            return Some((chunk, cursor));
        }
        cursor -= len;
    }
    None
}
