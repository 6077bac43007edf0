//! Unicode category probes shared by the allocator, subsetter and analyzer.

use unicode_general_category::{GeneralCategory, get_general_category};

/// Control characters that are always left untouched in a corpus.
pub const SAFE_CONTROLS: [char; 6] = ['\n', '\r', '\t', '\u{8}', '\u{c}', '\u{b}'];

/// True for categories C* (control, format, surrogate, private use,
/// unassigned) and Z* (separators).
pub fn is_control_or_separator(ch: char) -> bool {
    matches!(
        get_general_category(ch),
        GeneralCategory::Control
            | GeneralCategory::Format
            | GeneralCategory::Surrogate
            | GeneralCategory::PrivateUse
            | GeneralCategory::Unassigned
            | GeneralCategory::SpaceSeparator
            | GeneralCategory::LineSeparator
            | GeneralCategory::ParagraphSeparator
    )
}

/// Printable in the usual sense: not C* or Z*, except the ASCII space.
pub fn is_printable(ch: char) -> bool {
    ch == ' ' || !is_control_or_separator(ch)
}
