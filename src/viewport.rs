use ratatui::layout::Rect;

/// Number of list rows for a screen of `rows` rows showing `line_count` lines.
///
/// Starts at two thirds of the screen, drops to half when the list is
/// shorter than that, and takes the whole screen when the result is under
/// ten rows or leaves fewer than two rows below the list.
pub const fn viewport_height(rows: u16, line_count: usize) -> u16 {
    let mut height = (rows / 3) * 2;
    if height as usize > line_count {
        height = rows / 2;
    }
    if height < 10 {
        height = rows;
    }
    if rows - height < 2 {
        height = rows;
    }
    height
}

/// Selection and scroll position over the flattened lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub(crate) area: Rect,
    pub(crate) height: u16,
    pub(crate) offset: usize,
    pub(crate) current: usize,
}

impl Viewport {
    pub const fn new(area: Rect) -> Self {
        Self {
            area,
            height: area.height,
            offset: 0,
            current: 0,
        }
    }

    /// Screen area the mode occupies.
    #[inline]
    pub const fn area(&self) -> Rect {
        self.area
    }

    #[inline]
    pub const fn width(&self) -> u16 {
        self.area.width
    }

    /// Rows given to the list; the rest is left for the preview.
    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub const fn current(&self) -> usize {
        self.current
    }

    // Zero-row screens still page one line at a time.
    const fn rows(&self) -> usize {
        if self.height == 0 {
            1
        } else {
            self.height as usize
        }
    }

    /// Recomputes the list height for `line_count` lines.
    pub(crate) const fn fit(&mut self, line_count: usize) {
        self.height = viewport_height(self.area.height, line_count);
    }

    /// Moves up one line, wrapping to the last page from the top.
    pub fn up(&mut self, line_count: usize) {
        if line_count == 0 {
            return;
        }
        if self.current == 0 {
            self.current = line_count - 1;
            self.offset = line_count.saturating_sub(self.rows());
        } else {
            self.current -= 1;
            if self.current < self.offset {
                self.offset -= 1;
            }
        }
        log::trace!("mode tree up: current {} offset {}", self.current, self.offset);
    }

    /// Moves down one line, wrapping to the top from the last line.
    pub fn down(&mut self, line_count: usize) {
        if line_count == 0 {
            return;
        }
        if self.current >= line_count - 1 {
            self.current = 0;
            self.offset = 0;
        } else {
            self.current += 1;
            if self.current > self.offset + self.rows() - 1 {
                self.offset += 1;
            }
        }
        log::trace!("mode tree down: current {} offset {}", self.current, self.offset);
    }

    /// Moves up by a page, stopping at the first line.
    pub fn page_up(&mut self, line_count: usize) {
        for _ in 0..self.rows() {
            if self.current == 0 {
                break;
            }
            self.up(line_count);
        }
    }

    /// Moves down by a page, stopping at the last line.
    pub fn page_down(&mut self, line_count: usize) {
        for _ in 0..self.rows() {
            if self.current + 1 >= line_count {
                break;
            }
            self.down(line_count);
        }
    }

    pub const fn home(&mut self) {
        self.current = 0;
        self.offset = 0;
    }

    pub const fn end(&mut self, line_count: usize) {
        if line_count == 0 {
            self.home();
            return;
        }
        self.current = line_count - 1;
        self.offset = line_count.saturating_sub(self.rows());
    }

    /// Selects the line shown on list row `y`, if there is one.
    pub const fn select_row(&mut self, y: u16, line_count: usize) -> bool {
        if y >= self.height {
            return false;
        }
        let index = self.offset + y as usize;
        if index >= line_count {
            return false;
        }
        self.current = index;
        true
    }

    /// Selects `index` and scrolls the minimum amount to keep it visible.
    pub(crate) fn select(&mut self, index: usize, line_count: usize) {
        self.current = index;
        self.ensure_visible(line_count);
    }

    /// Clamps selection and offset back into range after the lines changed.
    pub(crate) fn ensure_visible(&mut self, line_count: usize) {
        if line_count == 0 {
            self.home();
            return;
        }
        if self.current >= line_count {
            self.current = line_count - 1;
        }
        let rows = self.rows();
        if self.current < self.offset {
            self.offset = self.current;
        } else if self.current >= self.offset + rows {
            self.offset = self.current + 1 - rows;
        }
        let max_offset = line_count.saturating_sub(rows);
        if self.offset > max_offset {
            self.offset = max_offset;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(height: u16) -> Viewport {
        let mut viewport = Viewport::new(Rect::new(0, 0, 80, height));
        viewport.height = height;
        viewport
    }

    fn assert_in_view(viewport: &Viewport) {
        assert!(viewport.offset <= viewport.current);
        assert!(viewport.current < viewport.offset + viewport.height as usize);
    }

    #[test]
    fn height_shrinks_to_half_for_short_lists() {
        assert_eq!(viewport_height(30, 5), 15);
    }

    #[test]
    fn height_keeps_two_thirds_for_long_lists() {
        assert_eq!(viewport_height(30, 100), 20);
    }

    #[test]
    fn height_takes_full_screen_when_small() {
        assert_eq!(viewport_height(12, 100), 12);
        assert_eq!(viewport_height(0, 0), 0);
        assert_eq!(viewport_height(19, 3), 19);
    }

    #[test]
    fn height_leaves_room_below_or_takes_everything() {
        // 2/3 of 16 is 10, leaving 6 rows below.
        assert_eq!(viewport_height(16, 50), 10);
        // 2/3 of 11 is 6 -> under the floor -> full screen.
        assert_eq!(viewport_height(11, 50), 11);
    }

    #[test]
    fn up_from_top_wraps_to_last_page() {
        let mut vp = viewport(10);
        vp.up(25);
        assert_eq!(vp.current, 24);
        assert_eq!(vp.offset, 15);
        assert_in_view(&vp);
    }

    #[test]
    fn down_from_bottom_wraps_to_top() {
        let mut vp = viewport(10);
        vp.end(25);
        vp.down(25);
        assert_eq!((vp.current, vp.offset), (0, 0));
    }

    #[test]
    fn navigation_keeps_selection_in_view() {
        let mut vp = viewport(10);
        let len = 37;
        for step in 0..200 {
            if step % 7 < 4 {
                vp.down(len);
            } else {
                vp.up(len);
            }
            assert_in_view(&vp);
        }
    }

    #[test]
    fn scrolling_moves_one_line_at_a_time() {
        let mut vp = viewport(5);
        for _ in 0..5 {
            vp.down(20);
        }
        assert_eq!((vp.current, vp.offset), (5, 1));
        vp.down(20);
        assert_eq!(vp.offset, 2);
    }

    #[test]
    fn paging_stops_at_boundaries() {
        let mut vp = viewport(10);
        vp.page_down(15);
        assert_eq!(vp.current, 10);
        vp.page_down(15);
        assert_eq!(vp.current, 14);
        assert_in_view(&vp);
        vp.page_up(15);
        assert_eq!(vp.current, 4);
        vp.page_up(15);
        assert_eq!(vp.current, 0);
    }

    #[test]
    fn end_shows_last_page() {
        let mut vp = viewport(10);
        vp.end(25);
        assert_eq!((vp.current, vp.offset), (24, 15));
        vp.end(4);
        assert_eq!((vp.current, vp.offset), (3, 0));
    }

    #[test]
    fn select_row_uses_offset() {
        let mut vp = viewport(10);
        vp.offset = 2;
        vp.current = 2;
        assert!(vp.select_row(3, 20));
        assert_eq!(vp.current, 5);
        assert!(!vp.select_row(9, 8));
        assert_eq!(vp.current, 5);
    }

    #[test]
    fn navigation_on_empty_list_is_a_no_op() {
        let mut vp = viewport(10);
        vp.up(0);
        vp.down(0);
        vp.page_down(0);
        vp.end(0);
        assert_eq!((vp.current, vp.offset), (0, 0));
    }
}
