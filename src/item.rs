use rustc_hash::{FxBuildHasher, FxHashMap};
use smallvec::SmallVec;

/// Handle to an item in a specific build generation of an [`ItemStore`].
///
/// Handles from an earlier generation are rejected by every lookup, so a
/// handle kept across a rebuild can never alias a new item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ItemRef {
    generation: u32,
    index: u32,
}

impl ItemRef {
    pub(crate) const fn index(self) -> usize {
        self.index as usize
    }

    /// Returns the build generation this handle belongs to.
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

/// A node of the tree: display text, UI flags and the caller's handle.
#[derive(Clone, Debug)]
pub struct TreeItem<D> {
    tag: u64,
    name: String,
    text: String,
    pub(crate) expanded: bool,
    pub(crate) tagged: bool,
    parent: Option<u32>,
    children: SmallVec<[u32; 4]>,
    data: D,
}

impl<D> TreeItem<D> {
    /// Identity tag used to carry state across rebuilds.
    #[inline]
    pub const fn tag(&self) -> u64 {
        self.tag
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub const fn is_expanded(&self) -> bool {
        self.expanded
    }

    #[inline]
    pub const fn is_tagged(&self) -> bool {
        self.tagged
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Caller-supplied handle passed back through callbacks.
    #[inline]
    pub const fn data(&self) -> &D {
        &self.data
    }

    pub(crate) fn child_indices(&self) -> &[u32] {
        &self.children
    }

    pub(crate) const fn parent_index(&self) -> Option<u32> {
        self.parent
    }
}

/// Flags remembered from the previous generation, keyed by tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SavedFlags {
    pub(crate) expanded: bool,
    pub(crate) tagged: bool,
}

/// Arena holding one generation of the forest.
///
/// Items are appended in `add` order; parents own their children through
/// index lists and roots keep insertion order.
#[derive(Clone, Debug)]
pub struct ItemStore<D> {
    generation: u32,
    items: Vec<TreeItem<D>>,
    roots: Vec<u32>,
}

impl<D> Default for ItemStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> ItemStore<D> {
    pub const fn new() -> Self {
        Self {
            generation: 0,
            items: Vec::new(),
            roots: Vec::new(),
        }
    }

    /// Creates an empty store for the generation after `self`.
    pub(crate) fn next_generation(&self) -> Self {
        Self {
            generation: self.generation.wrapping_add(1),
            items: Vec::with_capacity(self.items.len()),
            roots: Vec::with_capacity(self.roots.len()),
        }
    }

    #[inline]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the item for a handle of this generation.
    pub fn get(&self, item: ItemRef) -> Option<&TreeItem<D>> {
        if item.generation != self.generation {
            return None;
        }
        self.items.get(item.index())
    }

    pub(crate) fn get_mut(&mut self, item: ItemRef) -> Option<&mut TreeItem<D>> {
        if item.generation != self.generation {
            return None;
        }
        self.items.get_mut(item.index())
    }

    /// Returns the handles of the root items in insertion order.
    pub fn roots(&self) -> impl Iterator<Item = ItemRef> + '_ {
        self.roots.iter().map(|&index| self.handle(index))
    }

    /// Returns the handles of an item's children in insertion order.
    pub fn children(&self, item: ItemRef) -> impl Iterator<Item = ItemRef> + '_ {
        self.get(item)
            .map(TreeItem::child_indices)
            .unwrap_or_default()
            .iter()
            .map(|&index| self.handle(index))
    }

    /// Returns the parent of an item, or `None` for roots and stale handles.
    pub fn parent(&self, item: ItemRef) -> Option<ItemRef> {
        self.get(item)
            .and_then(TreeItem::parent_index)
            .map(|index| self.handle(index))
    }

    /// Finds the first item carrying `tag` in depth-first pre-order.
    pub fn find_by_tag(&self, tag: u64) -> Option<ItemRef> {
        let mut stack: Vec<u32> = self.roots.iter().rev().copied().collect();
        while let Some(index) = stack.pop() {
            let item = &self.items[index as usize];
            if item.tag == tag {
                return Some(self.handle(index));
            }
            stack.extend(item.children.iter().rev().copied());
        }
        None
    }

    pub(crate) const fn handle(&self, index: u32) -> ItemRef {
        ItemRef {
            generation: self.generation,
            index,
        }
    }

    pub(crate) fn root_indices(&self) -> &[u32] {
        &self.roots
    }

    pub(crate) fn item_at(&self, index: u32) -> &TreeItem<D> {
        &self.items[index as usize]
    }

    /// Builds the tag index used to carry flags into the next generation.
    ///
    /// Walks in pre-order and keeps the first item per tag, matching a
    /// recursive first-hit search over the whole forest.
    pub(crate) fn saved_flags(&self) -> FxHashMap<u64, SavedFlags> {
        let mut saved = FxHashMap::with_capacity_and_hasher(self.items.len(), FxBuildHasher);
        let mut stack: Vec<u32> = self.roots.iter().rev().copied().collect();
        while let Some(index) = stack.pop() {
            let item = &self.items[index as usize];
            saved.entry(item.tag).or_insert(SavedFlags {
                expanded: item.expanded,
                tagged: item.tagged,
            });
            stack.extend(item.children.iter().rev().copied());
        }
        saved
    }

    fn push(&mut self, parent: Option<u32>, item: TreeItem<D>) -> ItemRef {
        let index = u32::try_from(self.items.len()).unwrap_or(u32::MAX);
        self.items.push(item);
        match parent {
            Some(parent) => self.items[parent as usize].children.push(index),
            None => self.roots.push(index),
        }
        self.handle(index)
    }
}

/// The `add()` surface handed to [`TreeSource::build`](crate::TreeSource::build).
///
/// Every added item looks up its tag in the previous generation: a hit
/// carries `expanded` over, and `tagged` too when the item is a root or its
/// new parent is expanded. A miss starts expanded and untagged.
pub struct TreeBuilder<'a, D> {
    store: &'a mut ItemStore<D>,
    saved: &'a FxHashMap<u64, SavedFlags>,
}

impl<'a, D> TreeBuilder<'a, D> {
    pub(crate) const fn new(
        store: &'a mut ItemStore<D>,
        saved: &'a FxHashMap<u64, SavedFlags>,
    ) -> Self {
        Self { store, saved }
    }

    /// Adds an item under `parent` (or as a root) and returns its handle.
    pub fn add(
        &mut self,
        parent: Option<ItemRef>,
        tag: u64,
        name: impl Into<String>,
        text: impl Into<String>,
        data: D,
    ) -> ItemRef {
        let name = name.into();
        let text = text.into();
        log::debug!("mode tree add: {tag}, {name} {text}");

        let parent = parent.and_then(|parent| {
            if self.store.get(parent).is_some() {
                Some(parent.index)
            } else {
                log::warn!("mode tree add: stale parent {parent:?} for {tag}, adding as root");
                None
            }
        });

        let (expanded, tagged) = match self.saved.get(&tag) {
            Some(saved) => {
                let parent_expanded = parent.is_none_or(|index| self.store.item_at(index).expanded);
                (saved.expanded, parent_expanded && saved.tagged)
            }
            None => (true, false),
        };

        self.store.push(
            parent,
            TreeItem {
                tag,
                name,
                text,
                expanded,
                tagged,
                parent,
                children: SmallVec::new(),
                data,
            },
        )
    }

    /// Returns the item added so far for `item`.
    pub fn get(&self, item: ItemRef) -> Option<&TreeItem<D>> {
        self.store.get(item)
    }

    /// Number of items added so far in this build.
    pub const fn len(&self) -> usize {
        self.store.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build<D>(
        store: &mut ItemStore<D>,
        saved: &FxHashMap<u64, SavedFlags>,
        f: impl FnOnce(&mut TreeBuilder<'_, D>),
    ) {
        let mut builder = TreeBuilder::new(store, saved);
        f(&mut builder);
    }

    #[test]
    fn add_keeps_insertion_order_and_parents() {
        let mut store = ItemStore::<()>::new();
        let saved = FxHashMap::default();
        let mut refs = Vec::new();
        build(&mut store, &saved, |b| {
            let a = b.add(None, 1, "a", "", ());
            let a1 = b.add(Some(a), 2, "a1", "", ());
            let a2 = b.add(Some(a), 3, "a2", "", ());
            let c = b.add(None, 4, "c", "", ());
            refs.extend([a, a1, a2, c]);
        });

        let roots: Vec<_> = store.roots().collect();
        assert_eq!(roots, vec![refs[0], refs[3]]);
        let children: Vec<_> = store.children(refs[0]).collect();
        assert_eq!(children, vec![refs[1], refs[2]]);
        assert_eq!(store.parent(refs[2]), Some(refs[0]));
        assert_eq!(store.parent(refs[0]), None);
        assert!(store.get(refs[1]).is_some_and(|item| item.is_expanded() && !item.is_tagged()));
    }

    #[test]
    fn stale_handles_are_rejected() {
        let mut old = ItemStore::<()>::new();
        let saved = FxHashMap::default();
        let mut stale = None;
        build(&mut old, &saved, |b| stale = Some(b.add(None, 7, "x", "", ())));
        let Some(stale) = stale else {
            panic!("item not added");
        };

        let mut new = old.next_generation();
        build(&mut new, &saved, |b| {
            let item = b.add(Some(stale), 8, "y", "", ());
            assert_eq!(b.get(item).map(TreeItem::name), Some("y"));
        });

        assert!(new.get(stale).is_none());
        assert_eq!(new.roots().count(), 1);
    }

    #[test]
    fn saved_flags_keep_first_preorder_match() {
        let mut store = ItemStore::<()>::new();
        let saved = FxHashMap::default();
        build(&mut store, &saved, |b| {
            let a = b.add(None, 1, "a", "", ());
            b.add(Some(a), 5, "deep", "", ());
            b.add(None, 5, "shallow", "", ());
        });
        if let Some(deep) = store.find_by_tag(5) {
            if let Some(item) = store.get_mut(deep) {
                item.expanded = false;
            }
            assert_eq!(store.get(deep).map(TreeItem::name), Some("deep"));
        }

        let flags = store.saved_flags();
        assert_eq!(
            flags.get(&5),
            Some(&SavedFlags {
                expanded: false,
                tagged: false
            })
        );
    }

    #[test]
    fn tag_is_not_carried_into_collapsed_parent() {
        let mut saved = FxHashMap::default();
        saved.insert(
            1,
            SavedFlags {
                expanded: false,
                tagged: true,
            },
        );
        saved.insert(
            2,
            SavedFlags {
                expanded: true,
                tagged: true,
            },
        );

        let mut store = ItemStore::<()>::new();
        let mut child = None;
        let mut root = None;
        build(&mut store, &saved, |b| {
            let r = b.add(None, 1, "root", "", ());
            child = Some(b.add(Some(r), 2, "child", "", ()));
            root = Some(r);
        });

        let root = root.and_then(|r| store.get(r));
        assert!(root.is_some_and(|item| item.is_tagged() && !item.is_expanded()));
        let child = child.and_then(|c| store.get(c));
        assert!(child.is_some_and(|item| item.is_expanded() && !item.is_tagged()));
    }
}
