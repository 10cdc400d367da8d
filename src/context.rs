use ratatui::style::Style;

/// Per-row facts the label renderer needs, resolved from a line and its item.
#[derive(Clone, Copy, Debug)]
pub struct TreeRowContext {
    pub depth: u16,
    pub is_last: bool,
    pub is_flat: bool,
    pub has_children: bool,
    pub is_expanded: bool,
    pub is_tagged: bool,
    pub line_style: Style,
    pub tag_style: Style,
}
