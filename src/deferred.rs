//! Shared ownership of a mode across deferred completions.
//!
//! A mode may hand work to the host that finishes later (a prompt, a queued
//! command followed by a rebuild). Each such operation holds a [`Deferred`]
//! reference, so the mode outlives the operation even if it is torn down in
//! the meantime. Completions that arrive after teardown are dropped.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

struct ModeCell<M> {
    dead: Cell<bool>,
    mode: RefCell<M>,
}

impl<M> ModeCell<M> {
    fn with<R>(&self, f: impl FnOnce(&mut M) -> R) -> Option<R> {
        if self.dead.get() {
            return None;
        }
        let Ok(mut mode) = self.mode.try_borrow_mut() else {
            log::warn!("mode is already borrowed; skipping re-entrant access");
            return None;
        };
        Some(f(&mut mode))
    }
}

/// Owning handle of a live mode.
pub struct ModeHandle<M> {
    cell: Rc<ModeCell<M>>,
}

impl<M> ModeHandle<M> {
    pub fn new(mode: M) -> Self {
        Self {
            cell: Rc::new(ModeCell {
                dead: Cell::new(false),
                mode: RefCell::new(mode),
            }),
        }
    }

    /// Runs `f` on the mode unless it has been torn down.
    pub fn with<R>(&self, f: impl FnOnce(&mut M) -> R) -> Option<R> {
        self.cell.with(f)
    }

    /// Takes a reference for an operation that completes later.
    pub fn defer(&self) -> Deferred<M> {
        Deferred {
            cell: Rc::clone(&self.cell),
        }
    }

    /// Marks the mode as torn down; it is freed once the last reference drops.
    pub fn tear_down(&self) {
        self.cell.dead.set(true);
    }

    pub fn is_dead(&self) -> bool {
        self.cell.dead.get()
    }

    /// Number of live references, including this handle.
    pub fn references(&self) -> usize {
        Rc::strong_count(&self.cell)
    }
}

/// One in-flight operation's reference to a mode.
pub struct Deferred<M> {
    cell: Rc<ModeCell<M>>,
}

impl<M> Deferred<M> {
    /// Finishes the operation: runs `f` if the mode is still live, then
    /// releases the reference.
    pub fn complete<R>(self, f: impl FnOnce(&mut M) -> R) -> Option<R> {
        let result = self.cell.with(f);
        if result.is_none() {
            log::debug!("deferred completion skipped: mode torn down");
        }
        result
    }

    pub fn is_dead(&self) -> bool {
        self.cell.dead.get()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;

    struct Mode {
        rebuilds: usize,
        dropped: Rc<Cell<bool>>,
    }

    impl Drop for Mode {
        fn drop(&mut self) {
            self.dropped.set(true);
        }
    }

    fn mode() -> (ModeHandle<Mode>, Rc<Cell<bool>>) {
        let dropped = Rc::new(Cell::new(false));
        let handle = ModeHandle::new(Mode {
            rebuilds: 0,
            dropped: Rc::clone(&dropped),
        });
        (handle, dropped)
    }

    #[test]
    fn completion_runs_while_live() {
        let (handle, _) = mode();
        let prompt = handle.defer();
        assert_eq!(handle.references(), 2);

        let result = prompt.complete(|mode| {
            mode.rebuilds += 1;
            mode.rebuilds
        });
        assert_eq!(result, Some(1));
        assert_eq!(handle.references(), 1);
    }

    #[test]
    fn teardown_waits_for_pending_operations() {
        let (handle, dropped) = mode();
        let prompt = handle.defer();
        let rebuild = handle.defer();

        handle.tear_down();
        drop(handle);
        assert!(!dropped.get());
        assert!(prompt.is_dead());

        assert_eq!(prompt.complete(|mode| mode.rebuilds += 1), None);
        assert!(!dropped.get());
        assert_eq!(rebuild.complete(|mode| mode.rebuilds += 1), None);
        assert!(dropped.get());
    }

    #[test]
    fn reentrant_access_is_refused() {
        let (handle, _) = mode();
        let inner = handle.defer();
        let nested = handle.with(|_| inner.complete(|mode| mode.rebuilds += 1));
        assert_eq!(nested, Some(None));
    }

    #[test]
    fn torn_down_handle_refuses_access() {
        let (handle, _) = mode();
        handle.tear_down();
        assert!(handle.is_dead());
        assert_eq!(handle.with(|mode| mode.rebuilds), None);
    }
}
