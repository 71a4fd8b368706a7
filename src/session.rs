//! A diff paired with its navigation state.
//!
//! [`DiffSession`] is what a viewer holds on to: the computed result, the
//! render options and the highlight cursor. Navigation is bounded by the
//! region count of the *rendered* view, so a truncated view never lets the
//! cursor point past the truncation marker.

use crate::algo::{compute_diff, DiffOptions, DiffResult};
use crate::cursor::HighlightCursor;
use crate::render::{render, RenderOptions, RenderedView};

/// A computed diff with a highlight cursor.
#[derive(Debug, Clone)]
pub struct DiffSession<'a> {
    result: DiffResult<'a>,
    options: RenderOptions,
    cursor: HighlightCursor,
    change_count: usize,
}

impl<'a> DiffSession<'a> {
    /// Wrap an existing result.
    pub fn new(result: DiffResult<'a>, options: RenderOptions) -> Self {
        let change_count = render(&result.edits, &options).change_count;
        Self {
            result,
            options,
            cursor: HighlightCursor::new(),
            change_count,
        }
    }

    /// Diff two texts and start a session on the result.
    pub fn compute(
        text_a: &'a str,
        text_b: &'a str,
        diff_options: &DiffOptions,
        render_options: RenderOptions,
    ) -> Self {
        Self::new(compute_diff(text_a, text_b, diff_options), render_options)
    }

    /// Replace the result, keeping the cursor in range.
    pub fn replace(&mut self, result: DiffResult<'a>) {
        self.result = result;
        self.change_count = render(&self.result.edits, &self.options).change_count;
        self.cursor.clamp(self.change_count);
    }

    pub fn result(&self) -> &DiffResult<'a> {
        &self.result
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn cursor(&self) -> HighlightCursor {
        self.cursor
    }

    /// Number of navigable regions in the rendered view.
    pub fn change_count(&self) -> usize {
        self.change_count
    }

    /// Render with the current region highlighted.
    pub fn view(&self) -> RenderedView<'a> {
        let highlight = (self.change_count > 0).then(|| self.cursor.index());
        let options = self.options.clone().with_highlight(highlight);
        render(&self.result.edits, &options)
    }

    /// Move to the next change. Returns whether the cursor moved.
    pub fn next_change(&mut self) -> bool {
        self.cursor.next(self.change_count)
    }

    /// Move to the previous change. Returns whether the cursor moved.
    pub fn previous_change(&mut self) -> bool {
        self.cursor.previous()
    }
}
