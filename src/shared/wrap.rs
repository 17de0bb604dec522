//! Indent-aware word wrapping with a caller-owned cursor.
//!
//! A field value starts at the indent column and every continuation line is
//! re-indented to it. The cursor survives between calls so the items of one
//! list keep packing onto the same visual line.

use std::io::{self, Write};

use super::width::width_of;
use crate::formatting::{FormatContext, WordKind};

/// Column budget for one field: where continuation lines restart and how
/// wide the terminal is. `cols == 0` disables wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pub indent: usize,
    pub cols: usize,
}

impl Layout {
    pub fn new(indent: usize, cols: usize) -> Self {
        Self { indent, cols }
    }

    /// Non-terminal output, or a terminal too narrow for the indent.
    pub fn wrapping_disabled(&self) -> bool {
        self.cols == 0 || self.indent > self.cols
    }

    fn last_column(&self) -> usize {
        self.cols.saturating_sub(1)
    }
}

/// Horizontal write position on the current terminal line.
///
/// `col` already includes any pad still pending from [`pad_into`]; the pad
/// is written only once the next piece of text lands on the same line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LineCursor {
    col: usize,
    pending_pad: usize,
}

impl LineCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(col: usize) -> Self {
        Self { col, pending_pad: 0 }
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn pending_pad(&self) -> usize {
        self.pending_pad
    }

    fn flush_pad<W: Write>(
        &mut self,
        out: &mut W,
        ctx: &FormatContext,
    ) -> io::Result<()> {
        if self.pending_pad > 0 {
            let fill: String =
                std::iter::repeat_n(ctx.pad_char(), self.pending_pad).collect();
            out.write_all(fill.as_bytes())?;
            self.pending_pad = 0;
        }
        Ok(())
    }
}

/// Print `text` to stdout at `cursor`, wrapping at `cols` and re-indenting
/// continuation lines to `indent`.
pub fn wrap_print(
    text: &str,
    indent: u16,
    cols: u16,
    cursor: &mut LineCursor,
) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let layout = Layout::new(usize::from(indent), usize::from(cols));
    wrap_into(&mut out, text, layout, cursor, &FormatContext::plain())?;
    out.flush()
}

/// Write `text` to `out`, wrapping per `layout` and advancing `cursor`.
///
/// Words are split on ASCII space only; runs of spaces collapse into one
/// separator and no trailing space is written. A word too wide for any line
/// is written unsplit on its own line, the remainder of `text` follows it
/// verbatim, and the cursor is parked at the last column so the next write
/// starts a new line.
pub fn wrap_into<W: Write>(
    out: &mut W,
    text: &str,
    layout: Layout,
    cursor: &mut LineCursor,
    ctx: &FormatContext,
) -> io::Result<()> {
    if text.is_empty() {
        return Ok(());
    }

    let mut col = cursor.col.max(layout.indent);

    if layout.wrapping_disabled() {
        cursor.flush_pad(out, ctx)?;
        out.write_all(text.as_bytes())?;
        cursor.col = col.saturating_add(width_of(text));
        return Ok(());
    }

    let room = layout.cols.saturating_sub(col);
    let total = width_of(text);
    if total < room {
        cursor.flush_pad(out, ctx)?;
        write!(out, "{}", ctx.format_word(text, WordKind::Whole))?;
        cursor.col = col + total;
        return Ok(());
    }

    let mut rest = text;
    let mut sep = 0;
    while let Some((word, tail)) = next_word(rest) {
        rest = tail;
        let width = width_of(word);

        if layout.indent + width >= layout.cols {
            if col > layout.indent {
                new_line(out, layout, cursor, ctx)?;
            }
            cursor.flush_pad(out, ctx)?;
            write!(out, "{}", ctx.format_word(word, WordKind::Oversized))?;
            let remainder = rest.trim_matches(' ');
            if !remainder.is_empty() {
                write!(out, " {remainder}")?;
            }
            cursor.col = layout.last_column();
            return Ok(());
        }

        if col + sep + width >= layout.cols {
            new_line(out, layout, cursor, ctx)?;
            col = layout.indent;
            sep = 0;
        }
        cursor.flush_pad(out, ctx)?;
        if sep == 1 {
            out.write_all(b" ")?;
        }
        write!(out, "{}", ctx.format_word(word, WordKind::Wrapped))?;
        col += sep + width;
        sep = 1;
    }

    cursor.col = col;
    Ok(())
}

/// Reserve up to `pad` separator columns between list items.
///
/// When the cursor sits two columns short of the edge no pad fits, so the
/// cursor is parked at the last column and the next item starts a new line.
/// Otherwise the pad is clipped so the cursor never passes the last column. With
/// wrapping disabled the full pad is kept. The pad is dropped if the next
/// item starts on a new line.
pub fn pad_into<W: Write>(
    out: &mut W,
    pad: usize,
    layout: Layout,
    cursor: &mut LineCursor,
    ctx: &FormatContext,
) -> io::Result<()> {
    let col = cursor.col.max(layout.indent);
    if !layout.wrapping_disabled() && layout.cols >= 2 && col == layout.cols - 2
    {
        cursor.col = layout.last_column();
        return Ok(());
    }
    let count = if layout.wrapping_disabled() {
        pad
    } else {
        pad.min(layout.last_column().saturating_sub(col))
    };

    if layout.wrapping_disabled() {
        // no line breaks can follow, so there is nothing to defer
        cursor.flush_pad(out, ctx)?;
        let fill: String = std::iter::repeat_n(ctx.pad_char(), count).collect();
        out.write_all(fill.as_bytes())?;
    } else {
        cursor.pending_pad += count;
    }
    cursor.col = col + count;
    Ok(())
}

fn new_line<W: Write>(
    out: &mut W,
    layout: Layout,
    cursor: &mut LineCursor,
    ctx: &FormatContext,
) -> io::Result<()> {
    cursor.pending_pad = 0;
    write!(out, "\n{}", ctx.continuation(layout.indent))
}

// Next space-delimited word and the text after it, skipping leading spaces.
fn next_word(text: &str) -> Option<(&str, &str)> {
    let text = text.trim_start_matches(' ');
    if text.is_empty() {
        return None;
    }
    Some(match text.find(' ') {
        Some(idx) => (&text[..idx], &text[idx..]),
        None => (text, ""),
    })
}
