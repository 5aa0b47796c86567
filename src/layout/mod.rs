//! Row layout for a single page
//!
//! Consumes text from an offset and produces row rectangles until one page's
//! height budget is filled. The engine owns the wrapping and accumulation
//! decisions; glyph metrics come from the [`TextShaper`] collaborator.

use tracing::trace;

use crate::error::LayoutError;
use crate::traits::{TextShaper, TextSource};
use crate::types::{Margins, RowRect, Viewport};

/// One page's worth of laid-out rows
#[derive(Debug, Clone)]
pub struct RowBatch {
    /// Rows in reading order, top-to-bottom
    pub rows: Vec<RowRect>,
    /// Offset at which the next page begins
    pub next_offset: usize,
    /// True when the source was exhausted before the page filled
    pub reached_end: bool,
}

/// Lazy, forward-only row layout over a text source
pub struct RowLayoutEngine<'a> {
    source: &'a dyn TextSource,
    shaper: &'a dyn TextShaper,
    viewport: Viewport,
    margins: Margins,
}

impl<'a> RowLayoutEngine<'a> {
    pub fn new(
        source: &'a dyn TextSource,
        shaper: &'a dyn TextShaper,
        viewport: Viewport,
        margins: Margins,
    ) -> Self {
        Self {
            source,
            shaper,
            viewport,
            margins,
        }
    }

    /// Lay out rows starting at `offset` until the page height is filled
    ///
    /// The row that would overflow the budget is excluded and its start
    /// offset becomes `next_offset`. A `'\n'` hard-terminates a row; soft
    /// wraps break at the latest word boundary that fits and never split a
    /// character cluster.
    pub fn layout_rows_from(&self, offset: usize) -> Result<RowBatch, LayoutError> {
        let text = self
            .source
            .read_from(offset)
            .map_err(|_| LayoutError::UnreadableSource(offset))?;

        let content_width = (self.viewport.width - self.margins.left - self.margins.right).max(1.0);
        let budget = self.viewport.height - self.margins.bottom;

        let mut rows: Vec<RowRect> = Vec::new();
        let mut y = self.margins.top;
        let mut cursor = 0usize;

        loop {
            if cursor >= text.len() {
                trace!(offset, rows = rows.len(), "layout reached end of source");
                return Ok(RowBatch {
                    rows,
                    next_offset: offset + cursor,
                    reached_end: true,
                });
            }

            let rest = &text[cursor..];
            let line_len = rest.find('\n').unwrap_or(rest.len());
            let hard_line = &rest[..line_len];

            let take = self.fit_row(hard_line, content_width);
            let measure = self.shaper.measure(&hard_line[..take], content_width);

            // a page always advances by at least one row
            if !rows.is_empty() && y + measure.height > budget {
                trace!(offset, rows = rows.len(), next = offset + cursor, "page filled");
                return Ok(RowBatch {
                    rows,
                    next_offset: offset + cursor,
                    reached_end: false,
                });
            }

            rows.push(RowRect {
                start: offset + cursor,
                end: offset + cursor + take,
                x: self.margins.left,
                y,
                width: measure.width,
                height: measure.height,
            });
            y += measure.height;
            cursor += take;

            if take == hard_line.len() {
                // consume the terminating newline, if any
                if line_len < rest.len() {
                    cursor += 1;
                }
            } else {
                // a soft wrap does not carry the break whitespace forward
                cursor += text[cursor..]
                    .chars()
                    .take_while(|c| *c == ' ' || *c == '\t')
                    .map(char::len_utf8)
                    .sum::<usize>();
            }
        }
    }

    /// Byte length of the row taken from the front of `line`
    fn fit_row(&self, line: &str, max_width: f32) -> usize {
        if line.is_empty() {
            return 0;
        }
        let measure = self.shaper.measure(line, max_width);
        if measure.fit >= line.len() {
            return line.len();
        }

        let fit = floor_char_boundary(line, measure.fit);
        if fit == 0 {
            // a row holds at least one cluster
            return line.chars().next().map(char::len_utf8).unwrap_or(0);
        }

        // the overflow starting with whitespace means the prefix ends
        // exactly on a word boundary
        if line[fit..].starts_with(|c: char| c.is_whitespace()) {
            return fit;
        }

        // back up to the latest word boundary that fits
        match line[..fit]
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
        {
            Some((i, _)) if i > 0 => i,
            // single unbroken word: hard break at the cluster boundary
            _ => fit,
        }
    }
}

/// Largest char boundary at or below `index`
fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}
