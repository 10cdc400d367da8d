/// Actions that a user or host can initiate on the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeAction<Custom = ()> {
    /// Move selection to the previous line, wrapping to the last.
    SelectPrev,
    /// Move selection to the next line, wrapping to the first.
    SelectNext,
    /// Move up by a page, stopping at the first line.
    PageUp,
    /// Move down by a page, stopping at the last line.
    PageDown,
    /// Select the first line.
    SelectFirst,
    /// Select the last line.
    SelectLast,
    /// Expand the selected item.
    Expand,
    /// Collapse the selected item, or its parent when it has nothing to hide.
    Collapse,
    /// Toggle the tag on the selected item and move down.
    ToggleTag,
    /// Clear the tag on every visible item.
    UntagAll,
    /// Set the tag on every visible item.
    TagAll,
    /// Advance to the next sort order and rebuild.
    CycleSort,
    /// Primary button press at an absolute screen position.
    Click { column: u16, row: u16 },
    /// Leave the mode.
    Quit,
    /// Custom action forwarded to the caller without internal handling.
    Custom(Custom),
}

/// Result of handling an action or input event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeEvent<Custom = ()> {
    /// The input was consumed; state may have changed.
    Handled,
    /// The input is not a tree binding; the host may interpret it.
    Unhandled,
    /// A click selected a line; the mode should treat it as activation.
    Activate,
    /// The mode should be torn down.
    Finished,
    /// The action is forwarded to the caller for handling.
    Action(TreeAction<Custom>),
}
