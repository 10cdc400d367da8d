pub use crate::{
    CommandError, CommandHost, ItemRef, ModeTreeError, ModeTreeState, ModeTreeStyle, ModeTreeView,
    TreeAction, TreeBuilder, TreeEvent, TreeGlyphs, TreeItem, TreeSource, run_command,
};

#[cfg(feature = "keymap")]
pub use crate::{KeymapProfile, TreeKeyBindings};
