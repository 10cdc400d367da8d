//! Rebuildable, taggable tree picker engine for ratatui, the core of
//! multiplexer-style "choose" modes (sessions, windows, buffers, clients).
//!
//! A mode supplies a [`TreeSource`]; [`ModeTreeState`] rebuilds the forest
//! from it, carries expand/tag flags and the selection across rebuilds by
//! item tag, and handles navigation. [`ModeTreeView`] paints the list and a
//! preview of the selected item.
//!
//! Feature flags:
//! - `keymap`: crossterm-based key bindings and `ModeTreeState::handle_event*` helpers.

mod action;
mod buffer;
mod command;
mod context;
mod deferred;
mod error;
mod glyphs;
mod item;
#[cfg(feature = "keymap")]
mod keymap;
mod line;
pub mod prelude;
mod source;
mod state;
mod style;
mod viewport;
mod widget;

pub use action::{TreeAction, TreeEvent};
pub use buffer::{
    BUFFER_SORT_LIST, BufferAction, BufferChooser, BufferSource, DEFAULT_BUFFER_COMMAND,
    PasteBuffer, PasteStore, escape_line,
};
pub use command::{CommandHost, run_command, template_replace};
pub use context::TreeRowContext;
pub use deferred::{Deferred, ModeHandle};
pub use error::{CommandError, ModeTreeError};
pub use glyphs::{TreeGlyphs, tree_row_line, tree_row_symbol};
pub use item::{ItemRef, ItemStore, TreeBuilder, TreeItem};
#[cfg(feature = "keymap")]
pub use keymap::{KeymapProfile, TreeKeyBindings};
pub use line::{TreeLine, flatten};
pub use source::TreeSource;
pub use state::ModeTreeState;
pub use style::ModeTreeStyle;
pub use viewport::{Viewport, viewport_height};
pub use widget::ModeTreeView;
