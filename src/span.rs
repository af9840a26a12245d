/// Source location for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Byte offset into the input.
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    /// Compute the 1-based line and column of a byte offset.
    ///
    /// Offsets past the end of `text` are clamped to its length.
    #[must_use]
    pub fn locate(text: &str, offset: usize) -> Self {
        let offset = offset.min(text.len());
        let before = &text.as_bytes()[..offset];
        let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
        let line_start = before
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |nl| nl + 1);
        let column = String::from_utf8_lossy(&before[line_start..]).chars().count() + 1;
        Self {
            offset,
            line,
            column,
        }
    }
}

/// The bare token starting at `offset`, used to describe what was found
/// where a lens failed. `None` at end of input.
pub(crate) fn token_at(text: &str, offset: usize) -> Option<String> {
    let rest = text.get(offset..)?;
    if rest.is_empty() {
        return None;
    }
    if rest.starts_with('\n') {
        return Some("\\n".to_string());
    }
    let end = rest
        .find(|c: char| c.is_whitespace())
        .unwrap_or(rest.len());
    if end == 0 {
        let ws: String = rest.chars().take(1).collect();
        return Some(ws.escape_default().to_string());
    }
    Some(rest[..end].to_string())
}
