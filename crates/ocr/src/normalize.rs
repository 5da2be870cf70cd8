/// Separator placed between lines in [`NormalizedText::joined`].
pub const LINE_JOINER: &str = " \n ";

/// OCR text split into its meaningful lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText<'a> {
    /// Trimmed, non-empty lines in top-to-bottom order.
    pub lines: Vec<&'a str>,
    /// All lines joined with [`LINE_JOINER`], for patterns that may straddle
    /// an OCR line break.
    pub joined: String,
}

pub fn normalize(raw: &str) -> NormalizedText<'_> {
    let lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let joined = lines.join(LINE_JOINER);
    NormalizedText { lines, joined }
}
