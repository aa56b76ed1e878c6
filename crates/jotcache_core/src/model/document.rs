//! Styled text document model.
//!
//! # Responsibility
//! - Hold note content as an ordered list of styled character runs.
//! - Provide char-indexed read, restyle, insert and delete primitives that
//!   the formatting engine and editing session build on.
//!
//! # Invariants
//! - Runs built through this API are normalized: no empty runs and no two
//!   adjacent runs with the same style.
//! - Every offset and length is counted in Unicode scalar values (`char`).
//! - Out-of-bounds ranges are clamped to the document, never rejected.
//! - Persisted documents are accepted as-is; no style validation happens on
//!   read.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Default body font size in points.
pub const BASE_FONT_SIZE: u16 = 16;
/// Smallest size reachable through font-size commands.
pub const MIN_FONT_SIZE: u16 = 12;
/// Largest size reachable through font-size commands.
pub const MAX_FONT_SIZE: u16 = 28;

bitflags! {
    /// Symbolic font traits carried per character.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct FontTraits: u8 {
        const BOLD = 0b01;
        const ITALIC = 0b10;
    }
}

/// Font weight selected by paragraph presets.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    #[default]
    Regular,
    Semibold,
    Bold,
}

/// Character-level style attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextStyle {
    /// Point size. Commands clamp into `MIN_FONT_SIZE..=MAX_FONT_SIZE`.
    pub font_size: u16,
    pub weight: FontWeight,
    pub traits: FontTraits,
    pub underline: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_size: BASE_FONT_SIZE,
            weight: FontWeight::Regular,
            traits: FontTraits::empty(),
            underline: false,
        }
    }
}

impl TextStyle {
    /// Returns a copy with the given trait bits inverted.
    pub fn toggling(self, traits: FontTraits) -> Self {
        let mut next = self;
        next.traits.toggle(traits);
        next
    }

    /// Returns a copy with the underline flag inverted.
    pub fn toggling_underline(self) -> Self {
        Self {
            underline: !self.underline,
            ..self
        }
    }

    /// Returns a copy resized by `delta` points, clamped to the allowed range.
    pub fn resized_by(self, delta: i16) -> Self {
        Self {
            font_size: clamp_font_size(i32::from(self.font_size) + i32::from(delta)),
            ..self
        }
    }

    /// Replaces size and weight while keeping traits and underline.
    pub fn with_font(self, font_size: u16, weight: FontWeight) -> Self {
        Self {
            font_size,
            weight,
            ..self
        }
    }

    pub fn is_bold(&self) -> bool {
        self.traits.contains(FontTraits::BOLD)
    }

    pub fn is_italic(&self) -> bool {
        self.traits.contains(FontTraits::ITALIC)
    }
}

/// Clamps a raw point size into `MIN_FONT_SIZE..=MAX_FONT_SIZE`.
pub fn clamp_font_size(size: i32) -> u16 {
    let clamped = size.clamp(i32::from(MIN_FONT_SIZE), i32::from(MAX_FONT_SIZE));
    u16::try_from(clamped).unwrap_or(BASE_FONT_SIZE)
}

/// Half-open char range `[start, start + length)`.
///
/// A zero-length range is a caret.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub length: usize,
}

impl TextRange {
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    pub fn caret(at: usize) -> Self {
        Self::new(at, 0)
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    pub fn is_caret(&self) -> bool {
        self.length == 0
    }

    /// Clamps the range so it lies within a text of `len` chars.
    pub fn clamped_to(self, len: usize) -> Self {
        let start = self.start.min(len);
        let length = self.length.min(len - start);
        Self { start, length }
    }
}

/// One maximal span of text sharing a style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledRun {
    pub text: String,
    pub style: TextStyle,
}

impl StyledRun {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Styled text value. Cheap to clone for display and history snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyledDocument {
    runs: Vec<StyledRun>,
}

impl StyledDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a document with `text` in the default body style.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::styled(text, TextStyle::default())
    }

    /// Creates a single-style document.
    pub fn styled(text: impl Into<String>, style: TextStyle) -> Self {
        Self::from_runs([StyledRun::new(text, style)])
    }

    /// Builds a normalized document from arbitrary runs.
    pub fn from_runs(runs: impl IntoIterator<Item = StyledRun>) -> Self {
        let mut document = Self {
            runs: runs.into_iter().collect(),
        };
        document.normalize();
        document
    }

    pub fn runs(&self) -> &[StyledRun] {
        &self.runs
    }

    /// Flattened text without styling.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    pub fn char_len(&self) -> usize {
        self.runs.iter().map(StyledRun::char_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|run| run.text.is_empty())
    }

    /// Style of the char at `index`, or `None` past the end.
    pub fn style_at(&self, index: usize) -> Option<TextStyle> {
        let mut offset = 0;
        for run in &self.runs {
            let run_len = run.char_len();
            if index < offset + run_len {
                return Some(run.style);
            }
            offset += run_len;
        }
        None
    }

    /// Plain text inside `range` (clamped).
    pub fn text_in(&self, range: TextRange) -> String {
        let range = range.clamped_to(self.char_len());
        self.runs
            .iter()
            .flat_map(|run| run.text.chars())
            .skip(range.start)
            .take(range.length)
            .collect()
    }

    /// Partitions `range` into maximal sub-ranges of uniform style.
    pub fn style_runs_in(&self, range: TextRange) -> Vec<(TextRange, TextStyle)> {
        let range = range.clamped_to(self.char_len());
        let mut spans = Vec::new();
        let mut offset = 0;
        for run in &self.runs {
            let run_end = offset + run.char_len();
            let start = offset.max(range.start);
            let end = run_end.min(range.end());
            if start < end {
                spans.push((TextRange::new(start, end - start), run.style));
            }
            offset = run_end;
        }
        spans
    }

    /// Rewrites the style of every run intersecting `range`.
    ///
    /// `restyle` is invoked once per uniform sub-run, so each sub-run is
    /// transformed from its own current style.
    pub fn restyle_each_run(
        &mut self,
        range: TextRange,
        mut restyle: impl FnMut(TextStyle) -> TextStyle,
    ) {
        let range = range.clamped_to(self.char_len());
        if range.is_caret() {
            return;
        }

        let (mut head, rest) = split_runs(std::mem::take(&mut self.runs), range.start);
        let (mut middle, tail) = split_runs(rest, range.length);
        for run in &mut middle {
            run.style = restyle(run.style);
        }
        head.append(&mut middle);
        head.extend(tail);
        self.runs = head;
        self.normalize();
    }

    /// Inserts `text` at char offset `at` (clamped) with `style`.
    pub fn insert(&mut self, at: usize, text: &str, style: TextStyle) {
        if text.is_empty() {
            return;
        }
        let at = at.min(self.char_len());
        let (mut head, tail) = split_runs(std::mem::take(&mut self.runs), at);
        head.push(StyledRun::new(text, style));
        head.extend(tail);
        self.runs = head;
        self.normalize();
    }

    /// Removes the chars inside `range` (clamped).
    pub fn delete(&mut self, range: TextRange) {
        let range = range.clamped_to(self.char_len());
        if range.is_caret() {
            return;
        }
        let (mut head, rest) = split_runs(std::mem::take(&mut self.runs), range.start);
        let (_, tail) = split_runs(rest, range.length);
        head.extend(tail);
        self.runs = head;
        self.normalize();
    }

    fn normalize(&mut self) {
        let mut merged: Vec<StyledRun> = Vec::with_capacity(self.runs.len());
        for run in std::mem::take(&mut self.runs) {
            if run.text.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(last) if last.style == run.style => last.text.push_str(&run.text),
                _ => merged.push(run),
            }
        }
        self.runs = merged;
    }
}

/// Splits runs at char offset `at`; the left side holds exactly `at` chars
/// (or everything when shorter).
fn split_runs(runs: Vec<StyledRun>, at: usize) -> (Vec<StyledRun>, Vec<StyledRun>) {
    let mut head = Vec::new();
    let mut tail = Vec::new();
    let mut offset = 0;
    for run in runs {
        let run_len = run.char_len();
        if offset + run_len <= at {
            head.push(run);
        } else if offset >= at {
            tail.push(run);
        } else {
            let (left, right) = split_at_char(&run.text, at - offset);
            head.push(StyledRun::new(left, run.style));
            tail.push(StyledRun::new(right, run.style));
        }
        offset += run_len;
    }
    (head, tail)
}

fn split_at_char(text: &str, chars: usize) -> (&str, &str) {
    match text.char_indices().nth(chars) {
        Some((byte_index, _)) => text.split_at(byte_index),
        None => (text, ""),
    }
}
