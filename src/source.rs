use ratatui::buffer::Buffer;

use crate::item::TreeBuilder;

/// Data contract supplied by each concrete mode.
///
/// `build` enumerates the underlying objects in the order implied by
/// `sort_index` and adds them through the builder; the previous generation is
/// only reachable through tag lookups inside [`TreeBuilder::add`].
///
/// `draw` renders a preview of one item into a fresh buffer of exactly
/// `width` x `height` cells, or returns `None` when there is nothing to show
/// (for example the object vanished since the last build).
pub trait TreeSource<D> {
    /// Rebuilds the forest for the active sort order.
    fn build(&mut self, builder: &mut TreeBuilder<'_, D>, sort_index: usize);

    /// Renders a preview for the item carrying `data`.
    fn draw(&self, data: &D, width: u16, height: u16) -> Option<Buffer> {
        let _ = (data, width, height);
        None
    }
}
