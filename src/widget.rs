use std::marker::PhantomData;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::Span;
use ratatui::widgets::{Block, Clear, StatefulWidget, Widget};

use crate::context::TreeRowContext;
use crate::glyphs::{TreeGlyphs, tree_row_line};
use crate::item::TreeItem;
use crate::source::TreeSource;
use crate::state::ModeTreeState;
use crate::style::ModeTreeStyle;

/// Paints the visible lines and, when there is room, a framed preview of
/// the selected item below them.
pub struct ModeTreeView<'a, D, S>
where
    S: TreeSource<D> + ?Sized,
{
    source: &'a S,
    style: ModeTreeStyle,
    glyphs: TreeGlyphs<'a>,
    _data: PhantomData<fn(&D)>,
}

impl<'a, D, S> ModeTreeView<'a, D, S>
where
    S: TreeSource<D> + ?Sized,
{
    pub const fn new(source: &'a S, style: ModeTreeStyle) -> Self {
        Self {
            source,
            style,
            glyphs: TreeGlyphs::unicode(),
            _data: PhantomData,
        }
    }

    pub const fn glyphs(mut self, glyphs: TreeGlyphs<'a>) -> Self {
        self.glyphs = glyphs;
        self
    }

    fn render_lines(&self, area: Rect, buf: &mut Buffer, state: &ModeTreeState<D>) {
        let viewport = state.viewport();
        let lines = state.lines();
        let start = viewport.offset().min(lines.len());
        let end = (start + usize::from(viewport.height())).min(lines.len());

        for (row, line) in lines[start..end].iter().enumerate() {
            let Some(item) = state.item(line.item()) else {
                continue;
            };
            let is_selected = start + row == viewport.current();
            let ctx = TreeRowContext {
                depth: line.depth(),
                is_last: line.is_last(),
                is_flat: line.is_flat(),
                has_children: item.has_children(),
                is_expanded: item.is_expanded(),
                is_tagged: item.is_tagged(),
                line_style: self.style.line_style,
                tag_style: self.style.tag_style,
            };

            let y = area.y + u16::try_from(row).unwrap_or(u16::MAX);
            let text = tree_row_line(&ctx, item.name(), item.text(), &self.glyphs);
            buf.set_line(area.x, y, &text, area.width);
            if is_selected {
                buf.set_style(Rect::new(area.x, y, area.width, 1), self.style.mode_style);
            }
        }
    }

    fn render_preview(&self, area: Rect, buf: &mut Buffer, state: &ModeTreeState<D>) {
        let height = state.viewport().height();
        let below = area.height.saturating_sub(height);
        if !self.style.preview || below <= 4 || area.width <= 4 {
            return;
        }
        let Some(item) = state.current_item() else {
            return;
        };

        let frame = Rect::new(area.x, area.y + height, area.width, below);
        Block::bordered()
            .border_style(self.style.border_style)
            .render(frame, buf);

        let caption = format!(" {} (sort: {}) ", item.name(), state.sort_name());
        let room = usize::from(area.width - 2);
        if Span::raw(caption.as_str()).width() <= room {
            buf.set_stringn(frame.x + 1, frame.y, &caption, room, self.style.caption_style);
        }

        let inner = Rect::new(frame.x + 2, frame.y + 1, frame.width - 4, frame.height - 2);
        self.render_item_preview(item, inner, buf);
    }

    // The preview buffer belongs to this call only; cells are copied out.
    fn render_item_preview(&self, item: &TreeItem<D>, inner: Rect, buf: &mut Buffer) {
        let Some(preview) = self.source.draw(item.data(), inner.width, inner.height) else {
            return;
        };
        let origin = preview.area;
        for y in 0..inner.height.min(origin.height) {
            for x in 0..inner.width.min(origin.width) {
                let Some(cell) = preview.cell((origin.x + x, origin.y + y)) else {
                    continue;
                };
                if let Some(target) = buf.cell_mut((inner.x + x, inner.y + y)) {
                    *target = cell.clone();
                }
            }
        }
    }
}

impl<D, S> StatefulWidget for ModeTreeView<'_, D, S>
where
    S: TreeSource<D> + ?Sized,
{
    type State = ModeTreeState<D>;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        state.set_area(area);

        Clear.render(area, buf);
        buf.set_style(area, self.style.text_style);

        self.render_lines(area, buf, state);
        self.render_preview(area, buf, state);
    }
}
