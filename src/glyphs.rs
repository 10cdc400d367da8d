use ratatui::text::{Line, Span};

use crate::context::TreeRowContext;

#[derive(Clone, Copy, Debug)]
pub struct TreeGlyphs<'a> {
    /// Indentation per ancestor level below the roots.
    pub indent: &'a str,
    pub branch: &'a str,
    pub branch_last: &'a str,
    pub expanded: &'a str,
    pub collapsed: &'a str,
    /// Placeholder keeping leaves aligned with expandable siblings.
    pub leaf: &'a str,
    pub tag: &'a str,
    /// Between the name and the trailing text.
    pub separator: &'a str,
}

impl TreeGlyphs<'static> {
    pub const fn unicode() -> Self {
        Self {
            indent: "    ",
            branch: "├─> ",
            branch_last: "└─> ",
            expanded: "+ ",
            collapsed: "- ",
            leaf: "  ",
            tag: "*",
            separator: ": ",
        }
    }

    /// Line-drawing fallback for terminals without box characters: corners
    /// and tees become `+`, horizontal lines `-`.
    pub const fn ascii() -> Self {
        Self {
            indent: "    ",
            branch: "+-> ",
            branch_last: "+-> ",
            expanded: "+ ",
            collapsed: "- ",
            leaf: "  ",
            tag: "*",
            separator: ": ",
        }
    }
}

impl Default for TreeGlyphs<'static> {
    fn default() -> Self {
        Self::unicode()
    }
}

/// Expand marker for a row: nothing in a leaf-only group, a blank for
/// leaves beside expandable siblings, otherwise the expanded or collapsed
/// marker.
pub const fn tree_row_symbol<'a>(ctx: &TreeRowContext, glyphs: &TreeGlyphs<'a>) -> &'a str {
    if ctx.is_flat {
        ""
    } else if !ctx.has_children {
        glyphs.leaf
    } else if ctx.is_expanded {
        glyphs.expanded
    } else {
        glyphs.collapsed
    }
}

/// Builds the display line `<indent><connector><symbol><name><tag><sep><text>`.
pub fn tree_row_line<'a>(
    ctx: &TreeRowContext,
    name: &'a str,
    text: &'a str,
    glyphs: &TreeGlyphs<'a>,
) -> Line<'a> {
    let mut spans = Vec::with_capacity(7);

    if ctx.depth > 0 {
        let indent = glyphs.indent.repeat(usize::from(ctx.depth - 1));
        if !indent.is_empty() {
            spans.push(Span::raw(indent));
        }
        let connector = if ctx.is_last {
            glyphs.branch_last
        } else {
            glyphs.branch
        };
        spans.push(Span::styled(connector, ctx.line_style));
    }

    let symbol = tree_row_symbol(ctx, glyphs);
    if !symbol.is_empty() {
        spans.push(Span::raw(symbol));
    }

    spans.push(Span::raw(name));
    if ctx.is_tagged {
        spans.push(Span::styled(glyphs.tag, ctx.tag_style));
    }
    spans.push(Span::raw(glyphs.separator));
    if !text.is_empty() {
        spans.push(Span::raw(text));
    }
    Line::from(spans)
}
