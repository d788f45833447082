//! Fixed-width line wrapping for code rows.

use crate::error::{Error, Result};

/// Prefix given to every continuation row of an indented line.
pub const CONTINUATION_INDENT: &str = "    ";

/// Splits `line` into rows no longer than `width` characters.
///
/// Breaks happen at whitespace when a break fits within the budget; a word
/// longer than a whole row is cut. When `line` starts with whitespace, every
/// row after the first is prefixed with [`CONTINUATION_INDENT`].
/// Whitespace-only input yields a single empty row.
pub fn wrap(line: &str, width: usize) -> Result<Vec<String>> {
    if width == 0 {
        return Err(Error::InvalidConfiguration(
            "line width must be greater than zero".to_string(),
        ));
    }

    if line.trim().is_empty() {
        return Ok(vec![String::new()]);
    }

    if line.chars().count() <= width {
        return Ok(vec![line.to_string()]);
    }

    // A continuation indent that eats the whole row would never make progress.
    let indent = if line.starts_with(char::is_whitespace) && CONTINUATION_INDENT.len() < width {
        CONTINUATION_INDENT
    } else {
        ""
    };

    let mut rows = Vec::new();
    let mut row = Row::first();

    for token in tokens(line) {
        if token.starts_with(char::is_whitespace) {
            let len = token.chars().count();
            if row.is_blank() && !row.is_first {
                continue;
            }
            if row.len + len <= width {
                row.push(token, len);
            } else {
                row.flush_into(&mut rows);
                row = Row::continuation(indent);
            }
            continue;
        }

        let mut word = token;
        loop {
            let len = word.chars().count();
            if row.len + len <= width {
                row.push(word, len);
                break;
            }

            // Move the word down if a fresh row can hold it whole.
            if !row.is_blank() && indent.len() + len <= width {
                row.flush_into(&mut rows);
                row = Row::continuation(indent);
                continue;
            }

            let room = width - row.len;
            if room == 0 {
                row.flush_into(&mut rows);
                row = Row::continuation(indent);
                continue;
            }
            let split = word
                .char_indices()
                .nth(room)
                .map(|(idx, _)| idx)
                .unwrap_or(word.len());
            let (head, tail) = word.split_at(split);
            row.push(head, room);
            row.flush_into(&mut rows);
            row = Row::continuation(indent);
            word = tail;
            if word.is_empty() {
                break;
            }
        }
    }

    row.flush_into(&mut rows);
    Ok(rows)
}

/// Row under construction.
struct Row {
    text: String,
    /// Length in characters, prefix included.
    len: usize,
    prefix_len: usize,
    is_first: bool,
}

impl Row {
    fn first() -> Self {
        Self {
            text: String::new(),
            len: 0,
            prefix_len: 0,
            is_first: true,
        }
    }

    fn continuation(indent: &str) -> Self {
        Self {
            text: indent.to_string(),
            len: indent.len(),
            prefix_len: indent.len(),
            is_first: false,
        }
    }

    fn is_blank(&self) -> bool {
        self.len == self.prefix_len
    }

    fn push(&mut self, s: &str, len: usize) {
        self.text.push_str(s);
        self.len += len;
    }

    fn flush_into(&mut self, rows: &mut Vec<String>) {
        let trimmed = self.text.trim_end();
        if !trimmed.trim_start().is_empty() {
            rows.push(trimmed.to_string());
        }
    }
}

/// Splits into alternating runs of whitespace and non-whitespace.
fn tokens(line: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_space = None;

    for (idx, ch) in line.char_indices() {
        let space = ch.is_whitespace();
        match in_space {
            Some(prev) if prev != space => {
                out.push(&line[start..idx]);
                start = idx;
            }
            _ => {}
        }
        in_space = Some(space);
    }
    if start < line.len() {
        out.push(&line[start..]);
    }
    out
}
