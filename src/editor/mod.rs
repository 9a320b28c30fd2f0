//! In-place text replacement with revert, for the file surface.
//!
//! Mirrors what an editor does with a selection: substitute the enhanced
//! text over the selected range, keep the original around, and be able to
//! put it back over the same range.

use std::ops::RangeInclusive;
use std::path::Path;

use anyhow::{Context, Result, bail};

/// A byte span within a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    start: usize,
    end: usize,
}

/// An applied substitution, carrying what it replaced.
#[derive(Debug, Clone)]
pub struct Replacement {
    start: usize,
    len: usize,
    original: String,
}

/// An editable text document.
#[derive(Debug, Clone)]
pub struct Buffer {
    text: String,
}

impl Buffer {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Self { text })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.text)
            .with_context(|| format!("failed to write {}", path.display()))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The whole document.
    pub fn select_all(&self) -> Selection {
        Selection {
            start: 0,
            end: self.text.len(),
        }
    }

    /// Select 1-based inclusive lines, like an editor gutter. The
    /// selection covers line content only; terminating newlines stay put.
    pub fn select_lines(&self, lines: RangeInclusive<usize>) -> Result<Selection> {
        let (first, last) = (*lines.start(), *lines.end());
        if first == 0 {
            bail!("line numbers start at 1");
        }
        if last < first {
            bail!("line range {first}:{last} is backwards");
        }

        let mut spans = Vec::new();
        let mut offset = 0;
        for line in self.text.split_inclusive('\n') {
            let content = line
                .strip_suffix('\n')
                .map(|l| l.strip_suffix('\r').unwrap_or(l))
                .unwrap_or(line);
            spans.push((offset, offset + content.len()));
            offset += line.len();
        }
        if spans.is_empty() {
            spans.push((0, 0));
        }

        if last > spans.len() {
            bail!("line {last} is past the end of the file ({} lines)", spans.len());
        }

        Ok(Selection {
            start: spans[first - 1].0,
            end: spans[last - 1].1,
        })
    }

    /// The selected text.
    pub fn slice(&self, selection: &Selection) -> &str {
        &self.text[selection.start..selection.end]
    }

    /// Substitute `text` over the selection. The returned handle can undo
    /// exactly this substitution.
    pub fn replace(&mut self, selection: &Selection, text: &str) -> Replacement {
        let original = self.text[selection.start..selection.end].to_string();
        self.text
            .replace_range(selection.start..selection.end, text);
        Replacement {
            start: selection.start,
            len: text.len(),
            original,
        }
    }

    /// Put the original text back over the same range.
    pub fn revert(&mut self, replacement: &Replacement) {
        let end = replacement.start + replacement.len;
        self.text
            .replace_range(replacement.start..end, &replacement.original);
    }
}

/// Parse a `first:last` line-range argument (1-based, inclusive).
/// A single number selects that one line.
pub fn parse_line_range(spec: &str) -> Result<(usize, usize)> {
    let parse_one = |s: &str| -> Result<usize> {
        s.trim()
            .parse::<usize>()
            .with_context(|| format!("not a line number: {s:?}"))
    };
    match spec.split_once(':') {
        Some((first, last)) => Ok((parse_one(first)?, parse_one(last)?)),
        None => {
            let line = parse_one(spec)?;
            Ok((line, line))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_then_revert_restores_original() {
        let mut buffer = Buffer::from_text("say foo loudly");
        let selection = Selection { start: 4, end: 7 };
        assert_eq!(buffer.slice(&selection), "foo");

        let replacement = buffer.replace(&selection, "bar");
        assert_eq!(buffer.text(), "say bar loudly");

        buffer.revert(&replacement);
        assert_eq!(buffer.text(), "say foo loudly");
        assert!(!buffer.text().contains("bar"));
    }

    #[test]
    fn revert_handles_length_changes() {
        let mut buffer = Buffer::from_text("short");
        let selection = buffer.select_all();

        let replacement = buffer.replace(&selection, "a considerably longer rewrite");
        assert_eq!(buffer.text(), "a considerably longer rewrite");

        buffer.revert(&replacement);
        assert_eq!(buffer.text(), "short");
    }

    #[test]
    fn select_all_covers_everything() {
        let buffer = Buffer::from_text("a\nb\nc");
        let selection = buffer.select_all();
        assert_eq!(buffer.slice(&selection), "a\nb\nc");
    }

    #[test]
    fn select_single_line() {
        let buffer = Buffer::from_text("one\ntwo\nthree\n");
        let selection = buffer.select_lines(2..=2).unwrap();
        assert_eq!(buffer.slice(&selection), "two");
    }

    #[test]
    fn select_line_span_keeps_inner_newlines() {
        let buffer = Buffer::from_text("one\ntwo\nthree\nfour\n");
        let selection = buffer.select_lines(2..=3).unwrap();
        assert_eq!(buffer.slice(&selection), "two\nthree");
    }

    #[test]
    fn replacing_lines_preserves_trailing_newline() {
        let mut buffer = Buffer::from_text("one\ntwo\nthree\n");
        let selection = buffer.select_lines(2..=2).unwrap();
        buffer.replace(&selection, "TWO");
        assert_eq!(buffer.text(), "one\nTWO\nthree\n");
    }

    #[test]
    fn select_lines_rejects_zero() {
        let buffer = Buffer::from_text("one");
        assert!(buffer.select_lines(0..=1).is_err());
    }

    #[test]
    fn select_lines_rejects_past_end() {
        let buffer = Buffer::from_text("one\ntwo");
        let err = buffer.select_lines(1..=9).unwrap_err();
        assert!(err.to_string().contains("past the end"));
    }

    #[test]
    fn select_lines_rejects_backwards_range() {
        let buffer = Buffer::from_text("one\ntwo");
        #[allow(clippy::reversed_empty_ranges)]
        let result = buffer.select_lines(2..=1);
        assert!(result.is_err());
    }

    #[test]
    fn crlf_line_content_excludes_carriage_return() {
        let buffer = Buffer::from_text("one\r\ntwo\r\n");
        let selection = buffer.select_lines(1..=1).unwrap();
        assert_eq!(buffer.slice(&selection), "one");
    }

    #[test]
    fn parse_range_pair() {
        assert_eq!(parse_line_range("10:24").unwrap(), (10, 24));
    }

    #[test]
    fn parse_range_single_line() {
        assert_eq!(parse_line_range("7").unwrap(), (7, 7));
    }

    #[test]
    fn parse_range_tolerates_spaces() {
        assert_eq!(parse_line_range(" 3 : 5 ").unwrap(), (3, 5));
    }

    #[test]
    fn parse_range_rejects_garbage() {
        assert!(parse_line_range("a:b").is_err());
        assert!(parse_line_range("").is_err());
    }

    #[test]
    fn load_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.md");
        std::fs::write(&path, "original prompt").unwrap();

        let mut buffer = Buffer::load(&path).unwrap();
        let selection = buffer.select_all();
        buffer.replace(&selection, "enhanced prompt");
        buffer.save(&path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "enhanced prompt");
    }
}
