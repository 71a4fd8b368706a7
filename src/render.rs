//! Side-by-side rendering of edit scripts.
//!
//! Turns an edit script into two parallel token lists (old text on the left,
//! new text on the right), numbers every change as a navigable region, and
//! renders either side to escaped HTML.

use crate::algo::Edit;

// =============================================================================
// RenderOptions
// =============================================================================

/// Default cap on the number of edits rendered.
pub const DEFAULT_MAX_CHUNKS: usize = 5000;

/// Default attribute name carrying the region index in HTML output.
pub const DEFAULT_REGION_ATTR: &str = "data-region";

/// Text of the marker appended to both sides when output is truncated.
pub const TRUNCATION_NOTICE: &str = "... diff truncated ...";

/// Configuration for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Maximum number of edits rendered before truncating (minimum 1).
    /// Default: 5000
    pub max_chunks: usize,
    /// Region to emphasise, if any.
    pub highlight: Option<usize>,
    /// Attribute name for region indices in HTML (default: "data-region").
    ///
    /// This allows embedding pages to avoid clashes with their own
    /// attributes.
    pub region_attr_name: String,
}

impl RenderOptions {
    /// Create options with the given cap and no highlight.
    pub fn new(max_chunks: usize) -> Self {
        Self {
            max_chunks,
            highlight: None,
            region_attr_name: DEFAULT_REGION_ATTR.to_string(),
        }
    }

    pub fn with_highlight(mut self, highlight: Option<usize>) -> Self {
        self.highlight = highlight;
        self
    }

    pub fn with_max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = max_chunks;
        self
    }

    /// Set custom attribute name for region indices.
    pub fn with_region_attr(mut self, attr_name: impl Into<String>) -> Self {
        self.region_attr_name = attr_name.into();
        self
    }

    /// Get the attribute name for region indices.
    pub fn region_attr(&self) -> &str {
        if self.region_attr_name.is_empty() {
            DEFAULT_REGION_ATTR
        } else {
            &self.region_attr_name
        }
    }

    fn chunk_limit(&self) -> usize {
        self.max_chunks.max(1)
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHUNKS)
    }
}

// =============================================================================
// RenderedView
// =============================================================================

/// What a token stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Role {
    /// Unchanged text, shown on both sides
    Equal,
    /// Text only in the old input (left side)
    Deleted,
    /// Text only in the new input (right side)
    Inserted,
    /// Marker standing in for edits that were not rendered
    Truncated,
}

impl Role {
    /// CSS class used in HTML output.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Equal => "diff-equal",
            Self::Deleted => "diff-delete",
            Self::Inserted => "diff-insert",
            Self::Truncated => "diff-truncated",
        }
    }
}

/// One piece of rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Token<'a> {
    /// Raw (unescaped) text
    pub text: &'a str,
    pub role: Role,
    /// Region index for changed text
    pub region: Option<usize>,
    /// Whether this token belongs to the highlighted region
    pub highlighted: bool,
}

impl<'a> Token<'a> {
    fn equal(text: &'a str) -> Self {
        Self {
            text,
            role: Role::Equal,
            region: None,
            highlighted: false,
        }
    }

    fn change(text: &'a str, role: Role, region: usize, highlight: Option<usize>) -> Self {
        Self {
            text,
            role,
            region: Some(region),
            highlighted: highlight == Some(region),
        }
    }

    fn truncated() -> Self {
        Self {
            text: TRUNCATION_NOTICE,
            role: Role::Truncated,
            region: None,
            highlighted: false,
        }
    }
}

/// Which side of the view a token lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Side {
    Left,
    Right,
}

/// Two aligned views over an edit script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[must_use]
pub struct RenderedView<'a> {
    /// Old text: equalities and deletions
    pub left: Vec<Token<'a>>,
    /// New text: equalities and insertions
    pub right: Vec<Token<'a>>,
    /// Number of navigable regions actually rendered
    pub change_count: usize,
    /// Whether edits were dropped because of the chunk cap
    pub truncated: bool,
}

impl<'a> RenderedView<'a> {
    /// Locate a region: its side and token position.
    pub fn find_region(&self, region: usize) -> Option<(Side, usize)> {
        let on = |tokens: &[Token<'a>]| tokens.iter().position(|t| t.region == Some(region));
        on(self.left.as_slice())
            .map(|i| (Side::Left, i))
            .or_else(|| on(self.right.as_slice()).map(|i| (Side::Right, i)))
    }

    /// Render the left side to HTML.
    pub fn left_html(&self, options: &RenderOptions) -> String {
        render_tokens_html(&self.left, options)
    }

    /// Render the right side to HTML.
    pub fn right_html(&self, options: &RenderOptions) -> String {
        render_tokens_html(&self.right, options)
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Render an edit script into two aligned views.
///
/// Regions are numbered in script order by one counter shared by both sides.
/// After `max_chunks` edits a truncation marker is appended to both sides and
/// the remaining edits are skipped.
pub fn render<'a>(edits: &[Edit<'a>], options: &RenderOptions) -> RenderedView<'a> {
    let mut view = RenderedView::default();
    let mut region = 0;
    let limit = options.chunk_limit();

    for (processed, edit) in edits.iter().enumerate() {
        if processed >= limit {
            view.left.push(Token::truncated());
            view.right.push(Token::truncated());
            view.truncated = true;
            tracing::debug!(
                rendered = processed,
                total = edits.len(),
                "render truncated"
            );
            break;
        }

        match *edit {
            Edit::Equal(text) => {
                view.left.push(Token::equal(text));
                view.right.push(Token::equal(text));
            }
            Edit::Delete(text) => {
                view.left
                    .push(Token::change(text, Role::Deleted, region, options.highlight));
                region += 1;
            }
            Edit::Insert(text) => {
                view.right
                    .push(Token::change(text, Role::Inserted, region, options.highlight));
                region += 1;
            }
        }
    }

    view.change_count = region;
    view
}

/// Render a token list to HTML.
pub fn render_tokens_html(tokens: &[Token<'_>], options: &RenderOptions) -> String {
    let mut output = String::new();
    for token in tokens {
        render_token(token, options, &mut output);
    }
    output
}

/// Render a token to HTML.
fn render_token(token: &Token<'_>, options: &RenderOptions, output: &mut String) {
    output.push_str("<span class=\"");
    output.push_str(token.role.css_class());
    if token.highlighted {
        output.push_str(" diff-highlight");
    }
    output.push('"');

    if let Some(region) = token.region {
        output.push(' ');
        output.push_str(&escape_attr(options.region_attr()));
        output.push_str("=\"");
        output.push_str(&region.to_string());
        output.push('"');
    }

    output.push('>');
    escape_text_into(token.text, output);
    output.push_str("</span>");
}

/// Escape text for HTML, turning line breaks into `<br>`.
///
/// `\r\n` counts as one break; a lone `\r` also breaks.
fn escape_text_into(s: &str, output: &mut String) {
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#39;"),
            '\n' => output.push_str("<br>"),
            '\r' => {
                if chars.peek() != Some(&'\n') {
                    output.push_str("<br>");
                }
            }
            _ => output.push(c),
        }
    }
}

/// Escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    escape_text_into(s, &mut result);
    result
}

/// Escape attribute value special characters.
fn escape_attr(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

// =============================================================================
// Tests
// =============================================================================
