//! Label text layout
//!
//! Greedy word wrap with a camel-case aware fallback for words that are too
//! wide on their own. Layout is a pure function of the text, the width limit
//! and the font metrics, so the same label always produces the same lines.

/// Pixel metrics of a font
pub trait FontMetrics {
    /// Rendered width of `text` in pixels
    fn text_width(&self, text: &str) -> u32;

    /// Rendered height of `text` in pixels
    fn text_height(&self, text: &str) -> u32;
}

/// One laid out line of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    pub text: String,
    pub width: u32,
    pub height: u32,
}

impl TextLine {
    fn measure(metrics: &impl FontMetrics, text: String) -> Self {
        let width = metrics.text_width(&text);
        let height = metrics.text_height(&text);
        Self {
            text,
            width,
            height,
        }
    }
}

/// Split `text` into lines no wider than `max_width`
///
/// Words are appended to the current line while they fit. A word that
/// overflows a non-empty line starts the next one. A word that is too wide
/// on its own is split with [`split_word`] until every piece fits or is a
/// single character.
pub fn wrap_text(metrics: &impl FontMetrics, text: &str, max_width: u32) -> Vec<TextLine> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let tentative = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        if metrics.text_width(&tentative) <= max_width {
            current = tentative;
            continue;
        }

        if !current.is_empty() {
            lines.push(TextLine::measure(metrics, core::mem::take(&mut current)));
            if metrics.text_width(word) <= max_width {
                current = word.to_string();
                continue;
            }
        }

        current = fit_word(metrics, word, max_width, &mut lines);
    }

    if !current.is_empty() {
        lines.push(TextLine::measure(metrics, current));
    }

    lines
}

/// Break an overlong word into full lines, returning the trailing piece
fn fit_word(
    metrics: &impl FontMetrics,
    word: &str,
    max_width: u32,
    lines: &mut Vec<TextLine>,
) -> String {
    let mut pending = vec![word];
    let mut pieces = Vec::new();

    // Depth-first so pieces come out in reading order
    while let Some(piece) = pending.pop() {
        if metrics.text_width(piece) <= max_width || piece.chars().count() < 2 {
            pieces.push(piece);
            continue;
        }
        let (head, tail) = split_word(piece);
        pending.push(tail);
        pending.push(head);
    }

    let last = pieces.pop().unwrap_or_default();
    for piece in pieces {
        lines.push(TextLine::measure(metrics, piece.to_string()));
    }
    last.to_string()
}

/// Split a word in two at the camel-case boundary nearest its midpoint
///
/// Scans outward from the middle character in both directions at once for
/// an uppercase letter that is not the first character, and splits before
/// it. Falls back to the exact midpoint when there is none.
pub fn split_word(word: &str) -> (&str, &str) {
    let boundaries: Vec<(usize, char)> = word.char_indices().collect();
    let count = boundaries.len();
    if count < 2 {
        return (word, "");
    }

    let mid = count / 2;
    let is_split_point = |index: usize| index > 0 && boundaries[index].1.is_uppercase();

    for offset in 0..count {
        let left = mid.checked_sub(offset);
        let right = mid + offset;

        if let Some(index) = left.filter(|&i| is_split_point(i)) {
            return word.split_at(boundaries[index].0);
        }
        if right < count && is_split_point(right) {
            return word.split_at(boundaries[right].0);
        }
        if left.is_none() && right >= count {
            break;
        }
    }

    word.split_at(boundaries[mid].0)
}
