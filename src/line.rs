use crate::item::{ItemRef, ItemStore};

/// A visible row of the flattened tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeLine {
    pub(crate) item: ItemRef,
    pub(crate) depth: u16,
    pub(crate) last: bool,
    pub(crate) flat: bool,
}

impl TreeLine {
    #[inline]
    pub const fn item(&self) -> ItemRef {
        self.item
    }

    #[inline]
    pub const fn depth(&self) -> u16 {
        self.depth
    }

    /// `true` if the item is the last of its siblings.
    #[inline]
    pub const fn is_last(&self) -> bool {
        self.last
    }

    /// `true` if no sibling of the item has children.
    #[inline]
    pub const fn is_flat(&self) -> bool {
        self.flat
    }
}

/// Flattens the expanded part of the forest into rows in depth-first pre-order.
pub fn flatten<D>(store: &ItemStore<D>) -> Vec<TreeLine> {
    let mut lines = Vec::with_capacity(store.len());
    flatten_group(store, store.root_indices(), 0, &mut lines);
    lines
}

fn flatten_group<D>(store: &ItemStore<D>, group: &[u32], depth: u16, lines: &mut Vec<TreeLine>) {
    let flat = group
        .iter()
        .all(|&index| !store.item_at(index).has_children());
    let last_idx = group.len().saturating_sub(1);

    for (idx, &index) in group.iter().enumerate() {
        lines.push(TreeLine {
            item: store.handle(index),
            depth,
            last: idx == last_idx,
            flat,
        });

        let item = store.item_at(index);
        if item.expanded {
            flatten_group(store, item.child_indices(), depth.saturating_add(1), lines);
        }
    }
}

#[cfg(test)]
mod tests {
    use rustc_hash::FxHashMap;

    use super::*;
    use crate::item::TreeBuilder;

    fn sample() -> (ItemStore<()>, Vec<ItemRef>) {
        let mut store = ItemStore::new();
        let saved = FxHashMap::default();
        let mut refs = Vec::new();
        {
            let mut b = TreeBuilder::new(&mut store, &saved);
            let s1 = b.add(None, 1, "s1", "", ());
            let w1 = b.add(Some(s1), 2, "w1", "", ());
            let w2 = b.add(Some(s1), 3, "w2", "", ());
            let p1 = b.add(Some(w2), 4, "p1", "", ());
            let s2 = b.add(None, 5, "s2", "", ());
            refs.extend([s1, w1, w2, p1, s2]);
        }
        (store, refs)
    }

    #[test]
    fn flattens_in_preorder_with_depth() {
        let (store, refs) = sample();
        let lines = flatten(&store);

        let items: Vec<_> = lines.iter().map(TreeLine::item).collect();
        let depths: Vec<_> = lines.iter().map(TreeLine::depth).collect();
        assert_eq!(items, vec![refs[0], refs[1], refs[2], refs[3], refs[4]]);
        assert_eq!(depths, vec![0, 1, 1, 2, 0]);
    }

    #[test]
    fn marks_last_sibling_and_flat_groups() {
        let (store, _) = sample();
        let lines = flatten(&store);

        let last: Vec<_> = lines.iter().map(TreeLine::is_last).collect();
        let flat: Vec<_> = lines.iter().map(TreeLine::is_flat).collect();
        assert_eq!(last, vec![false, false, true, true, true]);
        // Roots: s1 has children. Windows: w2 has a pane. Panes: leaf-only.
        assert_eq!(flat, vec![false, false, false, true, false]);
    }

    #[test]
    fn collapsed_items_hide_their_subtree() {
        let (mut store, refs) = sample();
        if let Some(item) = store.get_mut(refs[2]) {
            item.expanded = false;
        }
        let lines = flatten(&store);
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(|line| line.item() != refs[3]));
    }

    #[test]
    fn empty_store_flattens_to_nothing() {
        let store = ItemStore::<()>::new();
        assert!(flatten(&store).is_empty());
    }
}
