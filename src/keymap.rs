use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::action::TreeAction;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum KeymapProfile {
    /// Arrow keys, page keys and vi keys.
    #[default]
    Default,
    /// vi keys only for navigation (`k`/`j`, `C-b`/`C-f`, `h`/`l`).
    Vim,
    /// Arrow and page keys only.
    Arrows,
}

#[derive(Clone, Copy, Debug)]
pub struct TreeKeyBindings {
    profile: KeymapProfile,
}

impl Default for TreeKeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeKeyBindings {
    pub const fn new() -> Self {
        Self {
            profile: KeymapProfile::Default,
        }
    }

    pub const fn with_profile(profile: KeymapProfile) -> Self {
        Self { profile }
    }

    pub const fn profile(&self) -> KeymapProfile {
        self.profile
    }

    pub const fn set_profile(&mut self, profile: KeymapProfile) {
        self.profile = profile;
    }

    /// Maps a terminal event to a tree action.
    ///
    /// Key releases and events with no tree binding resolve to `None`.
    pub fn resolve<C>(&self, event: &Event) -> Option<TreeAction<C>> {
        match event {
            Event::Key(key) => self.resolve_key(*key),
            Event::Mouse(mouse) => Self::resolve_mouse(*mouse),
            _ => None,
        }
    }

    /// Like [`resolve`](Self::resolve), but offers keys to `custom` first.
    pub fn resolve_with<C, F>(&self, event: &Event, custom: F) -> Option<TreeAction<C>>
    where
        F: Fn(KeyEvent) -> Option<C>,
    {
        if let Event::Key(key) = event
            && key.kind != KeyEventKind::Release
            && let Some(action) = custom(*key)
        {
            return Some(TreeAction::Custom(action));
        }

        self.resolve(event)
    }

    pub fn resolve_key<C>(&self, key: KeyEvent) -> Option<TreeAction<C>> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('t') => Some(TreeAction::TagAll),
                KeyCode::Char('b') if self.profile != KeymapProfile::Arrows => {
                    Some(TreeAction::PageUp)
                }
                KeyCode::Char('f') if self.profile != KeymapProfile::Arrows => {
                    Some(TreeAction::PageDown)
                }
                _ => None,
            };
        }

        let nav_action = match self.profile {
            KeymapProfile::Default => self
                .resolve_arrow_nav(key)
                .or_else(|| self.resolve_vim_nav(key)),
            KeymapProfile::Vim => self.resolve_vim_nav(key),
            KeymapProfile::Arrows => self.resolve_arrow_nav(key),
        };
        if nav_action.is_some() {
            return nav_action;
        }

        self.resolve_common(key)
    }

    /// Maps mouse input: primary press becomes a click, the wheel scrolls.
    pub const fn resolve_mouse<C>(mouse: MouseEvent) -> Option<TreeAction<C>> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => Some(TreeAction::Click {
                column: mouse.column,
                row: mouse.row,
            }),
            MouseEventKind::ScrollUp => Some(TreeAction::SelectPrev),
            MouseEventKind::ScrollDown => Some(TreeAction::SelectNext),
            _ => None,
        }
    }

    const fn resolve_vim_nav<C>(&self, key: KeyEvent) -> Option<TreeAction<C>> {
        match key.code {
            KeyCode::Char('k') => Some(TreeAction::SelectPrev),
            KeyCode::Char('j') => Some(TreeAction::SelectNext),
            KeyCode::Char('h') => Some(TreeAction::Collapse),
            KeyCode::Char('l') => Some(TreeAction::Expand),
            _ => None,
        }
    }

    const fn resolve_arrow_nav<C>(&self, key: KeyEvent) -> Option<TreeAction<C>> {
        match key.code {
            KeyCode::Up => Some(TreeAction::SelectPrev),
            KeyCode::Down => Some(TreeAction::SelectNext),
            KeyCode::Left => Some(TreeAction::Collapse),
            KeyCode::Right => Some(TreeAction::Expand),
            KeyCode::PageUp => Some(TreeAction::PageUp),
            KeyCode::PageDown => Some(TreeAction::PageDown),
            _ => None,
        }
    }

    const fn resolve_common<C>(&self, key: KeyEvent) -> Option<TreeAction<C>> {
        match key.code {
            KeyCode::Home => Some(TreeAction::SelectFirst),
            KeyCode::End => Some(TreeAction::SelectLast),
            KeyCode::Char('-') => Some(TreeAction::Collapse),
            KeyCode::Char('+') => Some(TreeAction::Expand),
            KeyCode::Char('t') => Some(TreeAction::ToggleTag),
            KeyCode::Char('T') => Some(TreeAction::UntagAll),
            KeyCode::Char('O') => Some(TreeAction::CycleSort),
            KeyCode::Char('q') | KeyCode::Esc => Some(TreeAction::Quit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyEventState, MouseEvent};

    use super::*;
    use crate::action::TreeEvent;
    use crate::state::tests::{Fixture, started};
    use ratatui::layout::Rect;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn default_profile_maps_arrows_and_vi_keys() {
        let keys = TreeKeyBindings::new();
        assert_eq!(keys.resolve::<()>(&key(KeyCode::Up)), Some(TreeAction::SelectPrev));
        assert_eq!(keys.resolve::<()>(&key(KeyCode::Char('k'))), Some(TreeAction::SelectPrev));
        assert_eq!(keys.resolve::<()>(&key(KeyCode::Down)), Some(TreeAction::SelectNext));
        assert_eq!(keys.resolve::<()>(&key(KeyCode::Char('j'))), Some(TreeAction::SelectNext));
        assert_eq!(keys.resolve::<()>(&ctrl('b')), Some(TreeAction::PageUp));
        assert_eq!(keys.resolve::<()>(&key(KeyCode::PageDown)), Some(TreeAction::PageDown));
    }

    #[test]
    fn tagging_keys_distinguish_case_and_control() {
        let keys = TreeKeyBindings::new();
        assert_eq!(keys.resolve::<()>(&key(KeyCode::Char('t'))), Some(TreeAction::ToggleTag));
        assert_eq!(keys.resolve::<()>(&key(KeyCode::Char('T'))), Some(TreeAction::UntagAll));
        assert_eq!(keys.resolve::<()>(&ctrl('t')), Some(TreeAction::TagAll));
        assert_eq!(keys.resolve::<()>(&key(KeyCode::Char('O'))), Some(TreeAction::CycleSort));
        assert_eq!(keys.resolve::<()>(&key(KeyCode::Esc)), Some(TreeAction::Quit));
    }

    #[test]
    fn arrows_profile_ignores_vi_keys() {
        let keys = TreeKeyBindings::with_profile(KeymapProfile::Arrows);
        assert_eq!(keys.resolve::<()>(&key(KeyCode::Char('j'))), None);
        assert_eq!(keys.resolve::<()>(&ctrl('f')), None);
        assert_eq!(keys.resolve::<()>(&key(KeyCode::Down)), Some(TreeAction::SelectNext));
    }

    #[test]
    fn releases_and_unbound_keys_resolve_to_none() {
        let keys = TreeKeyBindings::new();
        let release = Event::Key(KeyEvent {
            code: KeyCode::Char('j'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert_eq!(keys.resolve::<()>(&release), None);
        assert_eq!(keys.resolve::<()>(&key(KeyCode::Enter)), None);
        assert_eq!(keys.resolve::<()>(&Event::FocusGained), None);
    }

    #[test]
    fn mouse_maps_clicks_and_wheel() {
        let keys = TreeKeyBindings::new();
        assert_eq!(
            keys.resolve::<()>(&mouse(MouseEventKind::Down(MouseButton::Left), 3, 4)),
            Some(TreeAction::Click { column: 3, row: 4 })
        );
        assert_eq!(
            keys.resolve::<()>(&mouse(MouseEventKind::ScrollDown, 0, 0)),
            Some(TreeAction::SelectNext)
        );
        assert_eq!(
            keys.resolve::<()>(&mouse(MouseEventKind::Down(MouseButton::Right), 3, 4)),
            None
        );
    }

    #[test]
    fn custom_keys_take_precedence() {
        let keys = TreeKeyBindings::new();
        let custom = |key: KeyEvent| (key.code == KeyCode::Char('t')).then_some("paste");
        assert_eq!(
            keys.resolve_with(&key(KeyCode::Char('t')), custom),
            Some(TreeAction::Custom("paste"))
        );
        assert_eq!(
            keys.resolve_with(&key(KeyCode::Char('j')), custom),
            Some(TreeAction::SelectNext)
        );
    }

    #[test]
    fn state_passes_unbound_keys_through() {
        let mut source = Fixture::numbered(5);
        let mut state = started(&mut source, Rect::new(0, 0, 40, 20));
        assert_eq!(
            state.handle_event(&mut source, &key(KeyCode::Enter)),
            TreeEvent::Unhandled
        );
        assert_eq!(
            state.handle_event(&mut source, &key(KeyCode::Char('j'))),
            TreeEvent::Handled
        );
        assert_eq!(state.current_tag(), Some(1));
        assert_eq!(
            state.handle_event(&mut source, &mouse(MouseEventKind::Down(MouseButton::Left), 2, 3)),
            TreeEvent::Activate
        );
        assert_eq!(state.current_tag(), Some(3));
    }
}
