use ratatui::style::{Color, Style};

/// Visual settings for the mode tree widget.
#[derive(Clone, Copy, Debug)]
pub struct ModeTreeStyle {
    /// Base style for list rows and the preview frame.
    pub text_style: Style,
    /// Style of the selected row, applied across the full width.
    pub mode_style: Style,
    /// Style of the tag marker.
    pub tag_style: Style,
    /// Style of the tree connectors.
    pub line_style: Style,
    pub border_style: Style,
    pub caption_style: Style,
    /// Draws the preview frame below the list when there is room for it.
    pub preview: bool,
}

impl Default for ModeTreeStyle {
    fn default() -> Self {
        Self {
            text_style: Style::default(),
            mode_style: Style::default().fg(Color::Black).bg(Color::Yellow),
            tag_style: Style::default(),
            line_style: Style::default(),
            border_style: Style::default(),
            caption_style: Style::default(),
            preview: true,
        }
    }
}
