//! Scope delimiting: find the close brace matching an open brace by depth
//! counting over scrubbed text.
//!
//! This only makes sense on scrubbed text (see [`crate::scrub`]); on raw
//! text a brace inside a comment or string literal would corrupt the count.

/// Walk forward from the `{` at `open`, counting `{` as +1 and `}` as -1,
/// and return the offset of the `}` that brings the count back to zero.
///
/// Returns `None` when `open` does not sit on a `{`, or when end of input is
/// reached first; the caller skips that candidate entity instead of failing
/// the unit.
pub fn find_matching_close(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// 1-based line number of `offset`, by counting newlines before it.
pub fn line_number(text: &str, offset: usize) -> u32 {
    let end = offset.min(text.len());
    text.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() as u32 + 1
}

/// 0-based column of `offset` within its line.
pub fn column_number(text: &str, offset: usize) -> u32 {
    let end = offset.min(text.len());
    let line_start = text.as_bytes()[..end]
        .iter()
        .rposition(|&b| b == b'\n')
        .map(|p| p + 1)
        .unwrap_or(0);
    (end - line_start) as u32
}
