//! Text splitting
//!
//! Replaces an element's text with one wrapper element per line, word or
//! character so each piece can be animated on its own. Lines nest words and
//! words nest characters when several granularities are requested.
//!
//! Whitespace is never dropped: it belongs to the unit it follows, and
//! leading whitespace belongs to the first unit, so the units' text always
//! concatenates back to the original exactly.
//!
//! The original children are detached, not destroyed, and `revert` puts them
//! back.

use unicode_linebreak::{linebreaks, BreakOpportunity};

use lumen_core::{Display, Document, ElementId, ElementTree, Rect};

use crate::error::SplitError;
use crate::text_measure::TextMeasure;

/// Line height used to lay out line units, relative to the font size
const LINE_HEIGHT: f32 = 1.2;

/// Granularity used to animate split text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SplitType {
    Chars,
    #[default]
    Words,
    Lines,
}

/// Which unit levels to build
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SplitTypes {
    pub lines: bool,
    pub words: bool,
    pub chars: bool,
}

impl SplitTypes {
    /// Characters nested in words
    pub const CHARS: SplitTypes = SplitTypes {
        lines: false,
        words: true,
        chars: true,
    };
    pub const WORDS: SplitTypes = SplitTypes {
        lines: false,
        words: true,
        chars: false,
    };
    pub const LINES: SplitTypes = SplitTypes {
        lines: true,
        words: false,
        chars: false,
    };
    pub const ALL: SplitTypes = SplitTypes {
        lines: true,
        words: true,
        chars: true,
    };

    pub fn is_empty(&self) -> bool {
        !(self.lines || self.words || self.chars)
    }
}

impl From<SplitType> for SplitTypes {
    fn from(split: SplitType) -> Self {
        match split {
            SplitType::Chars => SplitTypes::CHARS,
            SplitType::Words => SplitTypes::WORDS,
            SplitType::Lines => SplitTypes::LINES,
        }
    }
}

/// The result of splitting one element
#[derive(Debug)]
pub struct TextSplit {
    element: ElementId,
    text: String,
    original: Vec<ElementId>,
    /// Unit elements attached directly to `element`
    wrappers: Vec<ElementId>,
    lines: Vec<ElementId>,
    words: Vec<ElementId>,
    chars: Vec<ElementId>,
    previous_label: Option<String>,
    applied: bool,
}

impl TextSplit {
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Text content at the time of the split
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> &[ElementId] {
        &self.lines
    }

    pub fn words(&self) -> &[ElementId] {
        &self.words
    }

    pub fn chars(&self) -> &[ElementId] {
        &self.chars
    }

    /// Units of one granularity in document order
    pub fn units(&self, split: SplitType) -> &[ElementId] {
        match split {
            SplitType::Chars => &self.chars,
            SplitType::Words => &self.words,
            SplitType::Lines => &self.lines,
        }
    }

    /// No units were produced (empty or whitespace-only text)
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.words.is_empty() && self.chars.is_empty()
    }

    pub fn is_reverted(&self) -> bool {
        !self.applied
    }

    /// Remove the unit wrappers and restore the original children
    ///
    /// Calling it again does nothing.
    pub fn revert(&mut self, document: &mut Document) {
        if !self.applied {
            return;
        }
        self.applied = false;

        let tree = &mut document.tree;
        for wrapper in self.wrappers.drain(..) {
            tree.remove(wrapper);
        }
        self.lines.clear();
        self.words.clear();
        self.chars.clear();

        let element_alive = tree.contains(self.element);
        for child in self.original.drain(..) {
            if element_alive {
                if let Err(err) = tree.append_child(self.element, child) {
                    tracing::trace!(%err, "original child could not be restored");
                }
            } else {
                tree.remove(child);
            }
        }

        if element_alive {
            match self.previous_label.take() {
                Some(label) => tree.set_attribute(self.element, "aria-label", label),
                None => {
                    tree.remove_attribute(self.element, "aria-label");
                }
            }
        }
    }
}

/// Split `element`'s text into units
///
/// Only text and inline children are supported; nested inline markup is
/// flattened into the units and comes back on `revert`.
pub fn split_text(
    document: &mut Document,
    element: ElementId,
    types: SplitTypes,
    measure: &dyn TextMeasure,
) -> Result<TextSplit, SplitError> {
    let tree = &mut document.tree;
    let node = tree.get(element).ok_or(SplitError::MissingElement(element))?;
    if node.is_text() {
        return Err(SplitError::UnsupportedMarkup("#text".to_string()));
    }
    let bounds = node.bounds;
    let font_size = node.font_size;

    for child in tree.descendants(element).into_iter().skip(1) {
        if let Some(child_node) = tree.get(child) {
            if let Some(tag) = child_node.tag() {
                if child_node.style.display != Display::Inline {
                    return Err(SplitError::UnsupportedMarkup(tag.to_string()));
                }
            }
        }
    }

    let text = tree.text_content(element);
    let mut split = TextSplit {
        element,
        text,
        original: Vec::new(),
        wrappers: Vec::new(),
        lines: Vec::new(),
        words: Vec::new(),
        chars: Vec::new(),
        previous_label: None,
        applied: false,
    };
    if types.is_empty() || split.text.trim().is_empty() {
        return Ok(split);
    }

    split.original = tree.children(element).to_vec();
    for &child in &split.original {
        tree.detach(child)?;
    }
    split.previous_label = tree.attribute(element, "aria-label").map(str::to_string);
    tree.set_attribute(element, "aria-label", split.text.trim());
    split.applied = true;

    let text = split.text.clone();
    let line_texts = if types.lines {
        wrap_lines(&text, bounds.width(), font_size, measure)
    } else {
        vec![text.as_str()]
    };

    let line_height = font_size * LINE_HEIGHT;
    for (index, line) in line_texts.into_iter().enumerate() {
        let line_parent = if types.lines {
            let id = append_unit(tree, element, "line", Display::Block)?;
            tree.set_bounds(
                id,
                Rect::new(
                    bounds.x(),
                    bounds.y() + index as f32 * line_height,
                    bounds.width(),
                    line_height,
                ),
            );
            split.lines.push(id);
            split.wrappers.push(id);
            if !types.words && !types.chars {
                tree.append_text(id, line)?;
                continue;
            }
            id
        } else {
            element
        };

        let word_texts = if types.words {
            split_words(line)
        } else {
            vec![line]
        };
        for word in word_texts {
            let word_parent = if types.words {
                let id = append_unit(tree, line_parent, "word", Display::InlineBlock)?;
                split.words.push(id);
                if line_parent == element {
                    split.wrappers.push(id);
                }
                if !types.chars {
                    tree.append_text(id, word)?;
                    continue;
                }
                id
            } else {
                line_parent
            };

            for ch in split_chars(word) {
                let id = append_unit(tree, word_parent, "char", Display::InlineBlock)?;
                tree.append_text(id, ch)?;
                split.chars.push(id);
                if word_parent == element {
                    split.wrappers.push(id);
                }
            }
        }
    }

    tracing::trace!(
        lines = split.lines.len(),
        words = split.words.len(),
        chars = split.chars.len(),
        "text split"
    );
    Ok(split)
}

fn append_unit(
    tree: &mut ElementTree,
    parent: ElementId,
    class: &str,
    display: Display,
) -> Result<ElementId, SplitError> {
    let id = tree.append_element(parent, "span")?;
    tree.add_class(id, class);
    tree.set_attribute(id, "aria-hidden", "true");
    if let Some(style) = tree.style_mut(id) {
        style.display = display;
    }
    Ok(id)
}

// ============================================================================
// Tokenizing
// ============================================================================

/// Cut `text` before every char where `starts_unit` holds; the first unit
/// starts at the first visible char and also takes any leading whitespace
fn units_by<F>(text: &str, starts_unit: F) -> Vec<&str>
where
    F: Fn(Option<char>, char) -> bool,
{
    let mut starts = Vec::new();
    let mut prev = None;
    for (index, ch) in text.char_indices() {
        if !ch.is_whitespace() && (starts.is_empty() || starts_unit(prev, ch)) {
            starts.push(index);
        }
        prev = Some(ch);
    }
    if starts.is_empty() {
        return Vec::new();
    }
    starts[0] = 0;
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            &text[start..end]
        })
        .collect()
}

/// Whitespace-separated words, each with its trailing whitespace
pub fn split_words(text: &str) -> Vec<&str> {
    units_by(text, |prev, _| prev.map_or(true, char::is_whitespace))
}

/// Visible characters, each with the whitespace that follows it
///
/// Combining marks, variation selectors, skin tone modifiers and zero width
/// joiner sequences stay with the char they modify. Other multi-char
/// clusters, such as regional indicator flags, split per char.
pub fn split_chars(text: &str) -> Vec<&str> {
    units_by(text, |prev, ch| prev != Some(ZWJ) && !extends_cluster(ch))
}

const ZWJ: char = '\u{200D}';

/// Chars drawn as part of the char before them
fn extends_cluster(ch: char) -> bool {
    matches!(
        ch,
        '\u{0300}'..='\u{036F}'
            | '\u{1AB0}'..='\u{1AFF}'
            | '\u{1DC0}'..='\u{1DFF}'
            | '\u{20D0}'..='\u{20FF}'
            | '\u{FE00}'..='\u{FE0F}'
            | '\u{FE20}'..='\u{FE2F}'
            | '\u{1F3FB}'..='\u{1F3FF}'
            | '\u{E0020}'..='\u{E007F}'
            | ZWJ
    )
}

/// Greedy line wrap at Unicode line break opportunities
///
/// A `max_width` of zero or less disables wrapping; mandatory breaks (new
/// lines) always apply. Whitespace-only lines are merged into the line
/// before them.
pub fn wrap_lines<'a>(
    text: &'a str,
    max_width: f32,
    font_size: f32,
    measure: &dyn TextMeasure,
) -> Vec<&'a str> {
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    let mut line_start = 0;
    let mut line_end = 0;
    for (position, opportunity) in linebreaks(text) {
        let candidate = &text[line_start..position];
        let overflows = max_width > 0.0
            && measure.measure_width(candidate.trim_end(), font_size) > max_width;
        if overflows && push_line(text, &mut ranges, line_start, line_end) {
            line_start = line_end;
        }
        line_end = position;

        if opportunity == BreakOpportunity::Mandatory
            && position < text.len()
            && push_line(text, &mut ranges, line_start, line_end)
        {
            line_start = line_end;
        }
    }
    if line_end > line_start && !push_line(text, &mut ranges, line_start, line_end) {
        ranges.push((line_start, line_end));
    }

    ranges.into_iter().map(|(s, e)| &text[s..e]).collect()
}

/// Close the line `start..end`; whitespace-only text extends the previous
/// line instead, and is left pending when there is none
fn push_line(text: &str, ranges: &mut Vec<(usize, usize)>, start: usize, end: usize) -> bool {
    if start == end {
        return false;
    }
    if text[start..end].trim().is_empty() {
        return match ranges.last_mut() {
            Some(last) => {
                last.1 = end;
                true
            }
            None => false,
        };
    }
    ranges.push((start, end));
    true
}
