//! Formatting commands over styled documents.
//!
//! # Responsibility
//! - Apply the fixed command set (traits, underline, font size, paragraph
//!   presets, list markers) to a document and selection.
//! - Report the result as a value-level [`FormatEffect`].
//!
//! # Invariants
//! - A caret selection never changes the document for character-style
//!   commands; only the pending typing style changes.
//! - Character-style commands act on each uniform sub-run independently:
//!   mixed selections are flipped per sub-run, never forced to one state.
//! - Paragraph-scoped commands act on every touched paragraph and edit them
//!   last-to-first so earlier offsets stay valid.
//! - A preset on an empty paragraph is not a no-op: it becomes the pending
//!   typing style, so the next typed text gets the preset font.

use crate::editor::paragraph::{span_of, ParagraphIndexer};
use crate::model::document::{
    FontTraits, FontWeight, StyledDocument, TextRange, TextStyle, BASE_FONT_SIZE,
};
use once_cell::sync::Lazy;
use regex::Regex;

/// Prefix inserted by the bulleted list toggle.
pub const BULLET_PREFIX: &str = "- ";
/// Prefix inserted by the checklist toggle.
pub const CHECKLIST_PREFIX: &str = "[ ] ";
/// Point delta applied by one font-size command.
pub const FONT_SIZE_STEP: i16 = 1;

static NUMBERED_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\. ").expect("valid numbered prefix regex"));

/// Discrete user formatting commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormattingCommand {
    ToggleBold,
    ToggleItalic,
    ToggleUnderline,
    IncreaseFontSize,
    DecreaseFontSize,
    Title,
    Heading,
    Body,
    BulletedList,
    NumberedList,
    Checklist,
}

/// Paragraph font presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParagraphPreset {
    Title,
    Heading,
    Body,
}

impl ParagraphPreset {
    /// `(size, weight)` applied by this preset.
    pub fn font(self) -> (u16, FontWeight) {
        match self {
            Self::Title => (28, FontWeight::Bold),
            Self::Heading => (22, FontWeight::Semibold),
            Self::Body => (BASE_FONT_SIZE, FontWeight::Regular),
        }
    }
}

/// Outcome of one formatting command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatEffect {
    /// Only the pending typing style changed.
    TypingStyle(TextStyle),
    /// The document was rewritten; the caller replaces its document and
    /// selection with these values.
    Document {
        document: StyledDocument,
        selection: TextRange,
    },
}

/// Dispatches `command` to its operation.
pub fn apply(
    command: FormattingCommand,
    document: &StyledDocument,
    selection: TextRange,
    typing_style: TextStyle,
) -> FormatEffect {
    match command {
        FormattingCommand::ToggleBold => toggle_bold(document, selection, typing_style),
        FormattingCommand::ToggleItalic => toggle_italic(document, selection, typing_style),
        FormattingCommand::ToggleUnderline => toggle_underline(document, selection, typing_style),
        FormattingCommand::IncreaseFontSize => {
            increase_font_size(document, selection, typing_style)
        }
        FormattingCommand::DecreaseFontSize => {
            decrease_font_size(document, selection, typing_style)
        }
        FormattingCommand::Title => {
            apply_preset(ParagraphPreset::Title, document, selection, typing_style)
        }
        FormattingCommand::Heading => {
            apply_preset(ParagraphPreset::Heading, document, selection, typing_style)
        }
        FormattingCommand::Body => {
            apply_preset(ParagraphPreset::Body, document, selection, typing_style)
        }
        FormattingCommand::BulletedList => toggle_bullet_list(document, selection, typing_style),
        FormattingCommand::NumberedList => toggle_numbered_list(document, selection, typing_style),
        FormattingCommand::Checklist => toggle_checklist(document, selection, typing_style),
    }
}

pub fn toggle_bold(
    document: &StyledDocument,
    selection: TextRange,
    typing_style: TextStyle,
) -> FormatEffect {
    restyle_selection(document, selection, typing_style, |style| {
        style.toggling(FontTraits::BOLD)
    })
}

pub fn toggle_italic(
    document: &StyledDocument,
    selection: TextRange,
    typing_style: TextStyle,
) -> FormatEffect {
    restyle_selection(document, selection, typing_style, |style| {
        style.toggling(FontTraits::ITALIC)
    })
}

pub fn toggle_underline(
    document: &StyledDocument,
    selection: TextRange,
    typing_style: TextStyle,
) -> FormatEffect {
    restyle_selection(document, selection, typing_style, TextStyle::toggling_underline)
}

pub fn increase_font_size(
    document: &StyledDocument,
    selection: TextRange,
    typing_style: TextStyle,
) -> FormatEffect {
    restyle_selection(document, selection, typing_style, |style| {
        style.resized_by(FONT_SIZE_STEP)
    })
}

pub fn decrease_font_size(
    document: &StyledDocument,
    selection: TextRange,
    typing_style: TextStyle,
) -> FormatEffect {
    restyle_selection(document, selection, typing_style, |style| {
        style.resized_by(-FONT_SIZE_STEP)
    })
}

/// Applies a named paragraph preset.
pub fn apply_preset(
    preset: ParagraphPreset,
    document: &StyledDocument,
    selection: TextRange,
    typing_style: TextStyle,
) -> FormatEffect {
    let (size, weight) = preset.font();
    set_paragraph_style(document, selection, typing_style, size, weight)
}

/// Replaces size and weight across every touched paragraph, keeping each
/// char's traits and underline.
///
/// When the touched span holds no chars the font goes to the typing style.
pub fn set_paragraph_style(
    document: &StyledDocument,
    selection: TextRange,
    typing_style: TextStyle,
    size: u16,
    weight: FontWeight,
) -> FormatEffect {
    let selection = selection.clamped_to(document.char_len());
    let span = ParagraphIndexer::for_document(document).paragraph_span(selection);
    if span.is_caret() {
        return FormatEffect::TypingStyle(typing_style.with_font(size, weight));
    }

    let mut next = document.clone();
    next.restyle_each_run(span, |style| style.with_font(size, weight));
    FormatEffect::Document {
        document: next,
        selection: span,
    }
}

pub fn toggle_bullet_list(
    document: &StyledDocument,
    selection: TextRange,
    typing_style: TextStyle,
) -> FormatEffect {
    toggle_prefixed_list(document, selection, typing_style, BULLET_PREFIX)
}

pub fn toggle_checklist(
    document: &StyledDocument,
    selection: TextRange,
    typing_style: TextStyle,
) -> FormatEffect {
    toggle_prefixed_list(document, selection, typing_style, CHECKLIST_PREFIX)
}

/// Adds `prefix` to every touched paragraph, or removes it when all of them
/// already start with it.
pub fn toggle_prefixed_list(
    document: &StyledDocument,
    selection: TextRange,
    typing_style: TextStyle,
    prefix: &str,
) -> FormatEffect {
    let selection = selection.clamped_to(document.char_len());
    let paragraphs = ParagraphIndexer::for_document(document).paragraphs_touching(selection);
    let span = span_of(&paragraphs);
    let prefix_len = prefix.chars().count();

    let should_remove = paragraphs
        .iter()
        .all(|paragraph| document.text_in(*paragraph).starts_with(prefix));

    let mut next = document.clone();
    for paragraph in paragraphs.iter().rev() {
        if should_remove {
            next.delete(TextRange::new(paragraph.start, prefix_len));
        } else {
            let style = insertion_style(&next, paragraph.start, typing_style);
            next.insert(paragraph.start, prefix, style);
        }
    }

    // Shifting the whole span by one prefix is exact for a single paragraph
    // and approximate for several.
    let start = if should_remove {
        span.start.saturating_sub(prefix_len)
    } else {
        span.start + prefix_len
    };
    let selection = TextRange::new(start, span.length).clamped_to(next.char_len());
    FormatEffect::Document {
        document: next,
        selection,
    }
}

/// Numbers every touched paragraph `1. `, `2. `, … within the touched set,
/// or strips the numerals when all of them are already numbered.
pub fn toggle_numbered_list(
    document: &StyledDocument,
    selection: TextRange,
    typing_style: TextStyle,
) -> FormatEffect {
    let selection = selection.clamped_to(document.char_len());
    let paragraphs = ParagraphIndexer::for_document(document).paragraphs_touching(selection);
    let span = span_of(&paragraphs);

    let has_numbers = paragraphs
        .iter()
        .all(|paragraph| NUMBERED_PREFIX_RE.is_match(&document.text_in(*paragraph)));

    let mut next = document.clone();
    for (index, paragraph) in paragraphs.iter().enumerate().rev() {
        if has_numbers {
            let text = document.text_in(*paragraph);
            if let Some(found) = NUMBERED_PREFIX_RE.find(&text) {
                let numeral_len = found.as_str().chars().count();
                next.delete(TextRange::new(paragraph.start, numeral_len));
            }
        } else {
            let style = insertion_style(&next, paragraph.start, typing_style);
            next.insert(paragraph.start, &format!("{}. ", index + 1), style);
        }
    }

    let selection = span.clamped_to(next.char_len());
    FormatEffect::Document {
        document: next,
        selection,
    }
}

fn restyle_selection(
    document: &StyledDocument,
    selection: TextRange,
    typing_style: TextStyle,
    mut restyle: impl FnMut(TextStyle) -> TextStyle,
) -> FormatEffect {
    let selection = selection.clamped_to(document.char_len());
    if selection.is_caret() {
        return FormatEffect::TypingStyle(restyle(typing_style));
    }

    let mut next = document.clone();
    for (span, style) in document.style_runs_in(selection) {
        let restyled = restyle(style);
        next.restyle_each_run(span, |_| restyled);
    }
    FormatEffect::Document {
        document: next,
        selection,
    }
}

/// Style for text inserted at `at`: the char there, else the char before,
/// else the pending typing style.
fn insertion_style(document: &StyledDocument, at: usize, typing_style: TextStyle) -> TextStyle {
    document
        .style_at(at)
        .or_else(|| at.checked_sub(1).and_then(|before| document.style_at(before)))
        .unwrap_or(typing_style)
}
