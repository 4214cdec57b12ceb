use std::iter::Peekable;
use std::str::SplitWhitespace;
use unicode_width::UnicodeWidthStr;

/// Tokens wider than a line are cut into chunks of this many characters,
/// regardless of their rendered width.
pub const HARD_SPLIT_CHARS: usize = 30;

/// Rendered width of a piece of text in layout units.
pub trait TextMeasure {
    fn width(&self, text: &str) -> usize;
}

/// Terminal-column measure for fixed-width layouts.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonospaceMeasure;

impl TextMeasure for MonospaceMeasure {
    fn width(&self, text: &str) -> usize {
        text.width()
    }
}

/// Greedily wrap `text` into lines no wider than `max_width`.
///
/// Lines are produced lazily; calling `wrap` again on the same input yields
/// the same sequence.
pub fn wrap<'a, M: TextMeasure>(
    text: &'a str,
    max_width: usize,
    measure: &'a M,
) -> WrappedLines<'a, M> {
    WrappedLines {
        tokens: text.split_whitespace().peekable(),
        overflow: "",
        max_width,
        measure,
    }
}

pub struct WrappedLines<'a, M> {
    tokens: Peekable<SplitWhitespace<'a>>,
    overflow: &'a str,
    max_width: usize,
    measure: &'a M,
}

impl<M> Clone for WrappedLines<'_, M> {
    fn clone(&self) -> Self {
        Self {
            tokens: self.tokens.clone(),
            overflow: self.overflow,
            max_width: self.max_width,
            measure: self.measure,
        }
    }
}

impl<M> WrappedLines<'_, M> {
    fn take_chunk(&mut self) -> String {
        let split = self
            .overflow
            .char_indices()
            .nth(HARD_SPLIT_CHARS)
            .map_or(self.overflow.len(), |(index, _)| index);
        let (chunk, rest) = self.overflow.split_at(split);
        self.overflow = rest;
        chunk.to_string()
    }
}

impl<M: TextMeasure> Iterator for WrappedLines<'_, M> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if !self.overflow.is_empty() {
            return Some(self.take_chunk());
        }

        let mut line = String::new();
        while let Some(&token) = self.tokens.peek() {
            if self.measure.width(token) > self.max_width {
                if !line.is_empty() {
                    return Some(line);
                }
                self.tokens.next();
                self.overflow = token;
                return Some(self.take_chunk());
            }

            if !line.is_empty() {
                let candidate = format!("{line} {token}");
                if self.measure.width(&candidate) > self.max_width {
                    return Some(line);
                }
                line = candidate;
            } else {
                line.push_str(token);
            }
            self.tokens.next();
        }

        (!line.is_empty()).then_some(line)
    }
}
