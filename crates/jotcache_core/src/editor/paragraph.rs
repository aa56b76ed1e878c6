//! Paragraph boundary computation.
//!
//! A paragraph is a maximal run of non-terminator chars followed by its
//! terminator (`\n`, `\r`, `\r\n` or U+2029). The terminator belongs to the
//! paragraph it ends. A text ending in a terminator has one more, empty,
//! paragraph at its end.

use crate::model::document::{StyledDocument, TextRange};

/// Returns whether `ch` ends a paragraph.
pub fn is_paragraph_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2029}')
}

/// Char-indexed paragraph lookup over one text snapshot.
#[derive(Debug, Clone)]
pub struct ParagraphIndexer {
    chars: Vec<char>,
}

impl ParagraphIndexer {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
        }
    }

    pub fn for_document(document: &StyledDocument) -> Self {
        Self::new(&document.plain_text())
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Range of the paragraph containing `location` (clamped to the text).
    pub fn paragraph_at(&self, location: usize) -> TextRange {
        let len = self.chars.len();
        let mut anchor = location.min(len);
        // The `\n` of a `\r\n` pair belongs to the paragraph the `\r` ends.
        if anchor > 0
            && anchor < len
            && self.chars[anchor] == '\n'
            && self.chars[anchor - 1] == '\r'
        {
            anchor -= 1;
        }

        let mut start = anchor;
        while start > 0 && !is_paragraph_terminator(self.chars[start - 1]) {
            start -= 1;
        }

        let mut end = anchor;
        while end < len && !is_paragraph_terminator(self.chars[end]) {
            end += 1;
        }
        if end < len {
            let crlf = self.chars[end] == '\r' && self.chars.get(end + 1) == Some(&'\n');
            end += if crlf { 2 } else { 1 };
        }

        TextRange::new(start, end - start)
    }

    /// Paragraphs touched by `range`, in document order.
    ///
    /// A caret touches exactly the paragraph containing it. A non-empty range
    /// touches every paragraph from the one containing its first char to the
    /// one containing its last char; ending right after a terminator does not
    /// pull in the following paragraph.
    pub fn paragraphs_touching(&self, range: TextRange) -> Vec<TextRange> {
        let range = range.clamped_to(self.len());
        let first = self.paragraph_at(range.start);
        if range.is_caret() {
            return vec![first];
        }

        let last = self.paragraph_at(range.end() - 1);
        let mut paragraphs = vec![first];
        let mut cursor = first.end();
        while cursor < last.end() {
            let paragraph = self.paragraph_at(cursor);
            if paragraph.is_caret() {
                break;
            }
            cursor = paragraph.end();
            paragraphs.push(paragraph);
        }
        paragraphs
    }

    /// Single range covering every paragraph touched by `range`.
    pub fn paragraph_span(&self, range: TextRange) -> TextRange {
        span_of(&self.paragraphs_touching(range))
    }
}

/// Union of consecutive paragraph ranges.
pub fn span_of(paragraphs: &[TextRange]) -> TextRange {
    match (paragraphs.first(), paragraphs.last()) {
        (Some(first), Some(last)) => TextRange::new(first.start, last.end() - first.start),
        _ => TextRange::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::ParagraphIndexer;
    use crate::model::document::TextRange;

    #[test]
    fn empty_text_has_one_empty_paragraph() {
        let indexer = ParagraphIndexer::new("");
        assert_eq!(indexer.paragraph_at(0), TextRange::new(0, 0));
        assert_eq!(
            indexer.paragraphs_touching(TextRange::new(0, 3)),
            vec![TextRange::new(0, 0)]
        );
    }

    #[test]
    fn paragraph_includes_its_terminator() {
        let indexer = ParagraphIndexer::new("one\ntwo\nthree");
        assert_eq!(indexer.paragraph_at(0), TextRange::new(0, 4));
        assert_eq!(indexer.paragraph_at(3), TextRange::new(0, 4));
        assert_eq!(indexer.paragraph_at(4), TextRange::new(4, 4));
        assert_eq!(indexer.paragraph_at(13), TextRange::new(8, 5));
    }

    #[test]
    fn caret_after_trailing_terminator_is_in_empty_final_paragraph() {
        let indexer = ParagraphIndexer::new("one\n");
        assert_eq!(indexer.paragraph_at(4), TextRange::new(4, 0));
        assert_eq!(
            indexer.paragraphs_touching(TextRange::caret(4)),
            vec![TextRange::new(4, 0)]
        );
    }

    #[test]
    fn crlf_is_one_terminator() {
        let indexer = ParagraphIndexer::new("ab\r\ncd");
        assert_eq!(indexer.paragraph_at(3), TextRange::new(0, 4));
        assert_eq!(indexer.paragraph_at(4), TextRange::new(4, 2));
    }

    #[test]
    fn range_ending_on_terminator_boundary_does_not_pull_next_paragraph() {
        let indexer = ParagraphIndexer::new("one\ntwo\n");
        let touched = indexer.paragraphs_touching(TextRange::new(0, 4));
        assert_eq!(touched, vec![TextRange::new(0, 4)]);

        let all = indexer.paragraphs_touching(TextRange::new(0, 8));
        assert_eq!(all, vec![TextRange::new(0, 4), TextRange::new(4, 4)]);
    }

    #[test]
    fn range_inside_middle_paragraphs_touches_each_once() {
        let indexer = ParagraphIndexer::new("a\nb\nc\nd");
        let touched = indexer.paragraphs_touching(TextRange::new(2, 3));
        assert_eq!(touched, vec![TextRange::new(2, 2), TextRange::new(4, 2)]);
        assert_eq!(
            indexer.paragraph_span(TextRange::new(2, 3)),
            TextRange::new(2, 4)
        );
    }
}
