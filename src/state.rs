use ratatui::layout::{Position, Rect};

use crate::action::{TreeAction, TreeEvent};
use crate::error::ModeTreeError;
use crate::item::{ItemRef, ItemStore, TreeBuilder, TreeItem};
use crate::line::{TreeLine, flatten};
use crate::source::TreeSource;
use crate::viewport::Viewport;

#[cfg(feature = "keymap")]
use crate::keymap::TreeKeyBindings;
#[cfg(feature = "keymap")]
use crossterm::event::{Event, KeyEvent};

/// Engine state for one mode instance: items, visible lines, viewport and
/// sort order.
///
/// The item forest is rebuilt from scratch by [`build`](Self::build); expand
/// and tag flags and the selection survive through item tags.
pub struct ModeTreeState<D> {
    store: ItemStore<D>,
    lines: Vec<TreeLine>,
    viewport: Viewport,
    sort_list: &'static [&'static str],
    sort_index: usize,
    #[cfg(feature = "keymap")]
    keymap: TreeKeyBindings,
}

impl<D> ModeTreeState<D> {
    /// Creates an empty state for a mode occupying `area`.
    ///
    /// The tree is empty until the first [`build`](Self::build).
    pub fn start(area: Rect, sort_list: &'static [&'static str]) -> Result<Self, ModeTreeError> {
        if sort_list.is_empty() {
            return Err(ModeTreeError::EmptySortList);
        }
        Ok(Self {
            store: ItemStore::new(),
            lines: Vec::new(),
            viewport: Viewport::new(area),
            sort_list,
            sort_index: 0,
            #[cfg(feature = "keymap")]
            keymap: TreeKeyBindings::new(),
        })
    }

    #[cfg(feature = "keymap")]
    /// Returns a mutable reference to the key binding set.
    pub const fn keymap_mut(&mut self) -> &mut TreeKeyBindings {
        &mut self.keymap
    }

    /// Replaces the forest with a fresh one from `source`.
    ///
    /// Expand and tag flags are carried over by tag, the selection moves to
    /// the line carrying the previously selected tag, or to the top when
    /// that tag is gone.
    pub fn build<S: TreeSource<D> + ?Sized>(&mut self, source: &mut S) {
        let selected = self.current_tag();
        let saved = self.store.saved_flags();
        let mut store = self.store.next_generation();
        source.build(&mut TreeBuilder::new(&mut store, &saved), self.sort_index);
        self.store = store;

        self.lines = flatten(&self.store);
        self.viewport.fit(self.lines.len());

        let restored = selected.and_then(|tag| self.line_of_tag(tag));
        match restored {
            Some(index) => self.viewport.select(index, self.lines.len()),
            None => self.viewport.home(),
        }
        log::debug!(
            "mode tree build: sort {}, {} items, {} lines, selection {}",
            self.sort_name(),
            self.store.len(),
            self.lines.len(),
            if restored.is_some() { "kept" } else { "reset" }
        );
    }

    /// Moves to a new screen area and rebuilds.
    pub fn resize<S: TreeSource<D> + ?Sized>(&mut self, source: &mut S, area: Rect) {
        self.viewport.area = area;
        self.build(source);
    }

    /// Moves to a new screen area without rebuilding.
    pub fn set_area(&mut self, area: Rect) {
        if self.viewport.area == area {
            return;
        }
        self.viewport.area = area;
        self.viewport.fit(self.lines.len());
        self.viewport.ensure_visible(self.lines.len());
    }

    #[inline]
    pub const fn area(&self) -> Rect {
        self.viewport.area
    }

    #[inline]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Visible lines in display order.
    #[inline]
    pub fn lines(&self) -> &[TreeLine] {
        &self.lines
    }

    #[inline]
    pub const fn line_count(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The current generation of items.
    #[inline]
    pub const fn items(&self) -> &ItemStore<D> {
        &self.store
    }

    pub fn item(&self, item: ItemRef) -> Option<&TreeItem<D>> {
        self.store.get(item)
    }

    pub fn current_line(&self) -> Option<&TreeLine> {
        self.lines.get(self.viewport.current)
    }

    pub fn current_item(&self) -> Option<&TreeItem<D>> {
        self.current_line().and_then(|line| self.store.get(line.item))
    }

    /// Handle of the selected item; `None` only when the tree is empty.
    pub fn current_data(&self) -> Option<&D> {
        self.current_item().map(TreeItem::data)
    }

    pub fn current_tag(&self) -> Option<u64> {
        self.current_item().map(TreeItem::tag)
    }

    /// Handles of the tagged items among the visible lines, in display order.
    pub fn each_tagged(&self) -> impl Iterator<Item = &D> + '_ {
        self.lines
            .iter()
            .filter_map(|line| self.store.get(line.item))
            .filter(|item| item.tagged)
            .map(TreeItem::data)
    }

    pub fn tagged_count(&self) -> usize {
        self.each_tagged().count()
    }

    #[inline]
    pub const fn sort_index(&self) -> usize {
        self.sort_index
    }

    #[inline]
    pub const fn sort_list(&self) -> &'static [&'static str] {
        self.sort_list
    }

    pub fn sort_name(&self) -> &'static str {
        self.sort_list.get(self.sort_index).copied().unwrap_or_default()
    }

    /// Chooses a sort order; takes effect on the next build.
    pub const fn set_sort_index(&mut self, sort_index: usize) {
        self.sort_index = sort_index % self.sort_list.len();
    }

    /// Advances to the next sort order and rebuilds.
    pub fn cycle_sort<S: TreeSource<D> + ?Sized>(&mut self, source: &mut S) {
        self.sort_index = (self.sort_index + 1) % self.sort_list.len();
        self.build(source);
    }

    pub fn select_prev(&mut self) {
        self.viewport.up(self.lines.len());
    }

    pub fn select_next(&mut self) {
        self.viewport.down(self.lines.len());
    }

    pub fn page_up(&mut self) {
        self.viewport.page_up(self.lines.len());
    }

    pub fn page_down(&mut self) {
        self.viewport.page_down(self.lines.len());
    }

    pub const fn select_first(&mut self) {
        self.viewport.home();
    }

    pub const fn select_last(&mut self) {
        self.viewport.end(self.lines.len());
    }

    /// Selects a visible item; returns `false` if it is hidden or stale.
    pub fn select_item(&mut self, item: ItemRef) -> bool {
        let Some(index) = self.line_of(item) else {
            return false;
        };
        self.viewport.select(index, self.lines.len());
        true
    }

    /// Toggles the tag on the selected item and moves down.
    pub fn toggle_tag(&mut self) {
        let Some(item) = self.current_line().map(|line| line.item) else {
            return;
        };
        if let Some(item) = self.store.get_mut(item) {
            item.tagged = !item.tagged;
        }
        self.select_next();
    }

    /// Sets the tag on every visible item.
    pub fn tag_all(&mut self) {
        self.set_all_tagged(true);
    }

    /// Clears the tag on every visible item.
    pub fn untag_all(&mut self) {
        self.set_all_tagged(false);
    }

    fn set_all_tagged(&mut self, tagged: bool) {
        for line in &self.lines {
            if let Some(item) = self.store.get_mut(line.item) {
                item.tagged = tagged;
            }
        }
    }

    /// Expands or collapses an item and re-flattens without rebuilding.
    ///
    /// The selected item stays selected; if it was hidden by the collapse,
    /// the collapsed item is selected instead.
    pub fn set_expanded(&mut self, item: ItemRef, expand: bool) -> bool {
        let Some(node) = self.store.get_mut(item) else {
            return false;
        };
        if node.expanded == expand {
            return false;
        }
        node.expanded = expand;
        let selected = self.current_line().map(|line| line.item);
        self.reflatten(selected, Some(item));
        true
    }

    pub fn toggle_expanded(&mut self, item: ItemRef) -> bool {
        match self.store.get(item) {
            Some(node) => {
                let expand = !node.expanded;
                self.set_expanded(item, expand)
            }
            None => false,
        }
    }

    /// Expands the selected item.
    pub fn expand_current(&mut self) {
        if let Some(item) = self.current_line().map(|line| line.item) {
            self.set_expanded(item, true);
        }
    }

    /// Collapses the selected item, or selects and collapses its parent when
    /// the item has nothing to hide.
    pub fn collapse_current(&mut self) {
        let Some(item) = self.current_line().map(|line| line.item) else {
            return;
        };
        let target = match self.store.get(item) {
            Some(node) if node.expanded && node.has_children() => item,
            Some(_) => match self.store.parent(item) {
                Some(parent) => parent,
                None => return,
            },
            None => return,
        };
        if !self.set_expanded(target, false) {
            self.select_item(target);
        }
    }

    /// Handles a tree action and returns the resulting event.
    ///
    /// `source` is only called back for actions that rebuild (sort cycling).
    pub fn handle_action<S, C>(&mut self, source: &mut S, action: TreeAction<C>) -> TreeEvent<C>
    where
        S: TreeSource<D> + ?Sized,
    {
        match action {
            TreeAction::SelectPrev => self.select_prev(),
            TreeAction::SelectNext => self.select_next(),
            TreeAction::PageUp => self.page_up(),
            TreeAction::PageDown => self.page_down(),
            TreeAction::SelectFirst => self.select_first(),
            TreeAction::SelectLast => self.select_last(),
            TreeAction::Expand => self.expand_current(),
            TreeAction::Collapse => self.collapse_current(),
            TreeAction::ToggleTag => self.toggle_tag(),
            TreeAction::UntagAll => self.untag_all(),
            TreeAction::TagAll => self.tag_all(),
            TreeAction::CycleSort => self.cycle_sort(source),
            TreeAction::Click { column, row } => return self.click(column, row),
            TreeAction::Quit => return TreeEvent::Finished,
            TreeAction::Custom(_) => return TreeEvent::Action(action),
        }
        TreeEvent::Handled
    }

    #[cfg(feature = "keymap")]
    /// Resolves an input event into an action and handles it.
    pub fn handle_event<S>(&mut self, source: &mut S, event: &Event) -> TreeEvent<()>
    where
        S: TreeSource<D> + ?Sized,
    {
        let Some(action) = self.keymap.resolve(event) else {
            return TreeEvent::Unhandled;
        };
        self.handle_action(source, action)
    }

    #[cfg(feature = "keymap")]
    /// Resolves an input event with a caller-specific key mapping and handles it.
    pub fn handle_event_with<S, C, F>(
        &mut self,
        source: &mut S,
        event: &Event,
        custom: F,
    ) -> TreeEvent<C>
    where
        S: TreeSource<D> + ?Sized,
        F: Fn(KeyEvent) -> Option<C>,
    {
        let Some(action) = self.keymap.resolve_with(event, custom) else {
            return TreeEvent::Unhandled;
        };
        self.handle_action(source, action)
    }

    // Clicks are always consumed; only a click on a populated list row
    // changes state.
    fn click<C>(&mut self, column: u16, row: u16) -> TreeEvent<C> {
        let area = self.viewport.area;
        if !area.contains(Position::new(column, row)) {
            log::trace!("mode tree click outside {area:?} at {column},{row}");
            return TreeEvent::Handled;
        }
        if self.viewport.select_row(row - area.y, self.lines.len()) {
            TreeEvent::Activate
        } else {
            TreeEvent::Handled
        }
    }

    fn line_of(&self, item: ItemRef) -> Option<usize> {
        self.lines.iter().position(|line| line.item == item)
    }

    fn line_of_tag(&self, tag: u64) -> Option<usize> {
        self.lines.iter().position(|line| {
            self.store
                .get(line.item)
                .is_some_and(|item| item.tag() == tag)
        })
    }

    fn reflatten(&mut self, keep: Option<ItemRef>, fallback: Option<ItemRef>) {
        self.lines = flatten(&self.store);
        self.viewport.fit(self.lines.len());
        let index = [keep, fallback]
            .into_iter()
            .flatten()
            .find_map(|item| self.line_of(item))
            .unwrap_or(0);
        self.viewport.select(index, self.lines.len());
    }
}
