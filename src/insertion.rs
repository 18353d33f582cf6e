//! Insertion-Point Locator
//!
//! Scans the raw opening-tag text from the end for its own closing delimiter.
//! Generic argument lists, `>` inside attribute expressions and comments all
//! sit before that delimiter, so anchoring on the last occurrence is enough.

use log::warn;

use crate::markup::ByteSpan;

/// Absolute byte offset where attribute text goes: right before the final
/// `/>` of a self-closing tag, or the final `>` otherwise.
pub fn find_insertion_point(source: &str, span: ByteSpan, self_closing: bool) -> usize {
    let end = span.end.min(source.len());
    let start = span.start.min(end);
    let raw = source.get(start..end).unwrap_or("");

    let delimiter = if self_closing { "/>" } else { ">" };
    match raw.rfind(delimiter) {
        Some(idx) => start + idx,
        None => {
            warn!(
                start = start,
                end = end;
                "No `{}` found in opening tag, inserting near the end", delimiter
            );
            let mut fallback = end.saturating_sub(delimiter.len()).max(start);
            while !source.is_char_boundary(fallback) {
                fallback -= 1;
            }
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(src: &str, self_closing: bool) -> usize {
        find_insertion_point(src, ByteSpan::new(0, src.len()), self_closing)
    }

    #[test]
    fn test_plain_and_self_closing() {
        assert_eq!(point("<div>", false), 4);
        assert_eq!(point("<img src=\"a\" />", true), 13);
    }

    #[test]
    fn test_generic_arguments_are_skipped() {
        let tag = "<Select<Option, Value> value={v}>";
        assert_eq!(point(tag, false), tag.len() - 1);
    }

    #[test]
    fn test_comparison_in_attribute() {
        let tag = "<Show when={a > b && c >= d}>";
        assert_eq!(point(tag, false), tag.len() - 1);
    }

    #[test]
    fn test_self_closing_with_arrow_in_attribute() {
        let tag = "<Input onChange={(e) => set(e)} />";
        assert_eq!(point(tag, true), tag.len() - 2);
    }

    #[test]
    fn test_offset_span_inside_larger_source() {
        let src = "const x = <span>hi</span>;";
        let open = ByteSpan::new(10, 16);
        assert_eq!(find_insertion_point(src, open, false), 15);
    }

    #[test]
    fn test_missing_delimiter_falls_back() {
        let src = "<div";
        assert_eq!(point(src, false), 3);
        assert_eq!(point(src, true), 2);
    }
}
