//! Paste-buffer chooser built on the mode tree.
//!
//! Buffers are listed flat, one root item per buffer, tagged by creation
//! order. Activating a buffer runs the command template with its name;
//! `d` and `D` delete the current or the tagged buffers.

use std::cmp::Reverse;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;

use crate::action::{TreeAction, TreeEvent};
use crate::command::{CommandHost, run_command};
use crate::error::ModeTreeError;
use crate::item::TreeBuilder;
use crate::source::TreeSource;
use crate::state::ModeTreeState;

#[cfg(feature = "keymap")]
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

pub const BUFFER_SORT_LIST: &[&str] = &["name", "time", "size"];

/// Command run on the chosen buffer when none is given.
pub const DEFAULT_BUFFER_COMMAND: &str = "paste-buffer -b '%%'";

/// Snapshot of one paste buffer as listed by the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PasteBuffer {
    pub name: String,
    pub created: DateTime<Utc>,
    /// Creation sequence number; larger is newer.
    pub order: u32,
    pub size: usize,
}

/// The host's paste buffers.
pub trait PasteStore {
    fn buffers(&self) -> Vec<PasteBuffer>;

    fn data(&self, name: &str) -> Option<&[u8]>;

    /// Removes a buffer; returns `false` if it no longer exists.
    fn delete(&mut self, name: &str) -> bool;
}

/// Mode-specific actions of the buffer chooser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferAction {
    /// Run the command template on the current buffer and leave.
    Paste,
    /// Delete the current buffer.
    Delete,
    /// Delete every tagged buffer.
    DeleteTagged,
}

/// [`TreeSource`] over a [`PasteStore`].
pub struct BufferSource<'a, P: ?Sized> {
    store: &'a P,
}

impl<'a, P: PasteStore + ?Sized> BufferSource<'a, P> {
    pub const fn new(store: &'a P) -> Self {
        Self { store }
    }
}

impl<P: PasteStore + ?Sized> TreeSource<PasteBuffer> for BufferSource<'_, P> {
    fn build(&mut self, builder: &mut TreeBuilder<'_, PasteBuffer>, sort_index: usize) {
        let mut buffers = self.store.buffers();
        match BUFFER_SORT_LIST.get(sort_index).copied() {
            Some("time") => buffers.sort_by(|a, b| {
                Reverse(a.order)
                    .cmp(&Reverse(b.order))
                    .then_with(|| a.name.cmp(&b.name))
            }),
            Some("size") => buffers.sort_by(|a, b| {
                Reverse(a.size)
                    .cmp(&Reverse(b.size))
                    .then_with(|| a.name.cmp(&b.name))
            }),
            _ => buffers.sort_by(|a, b| a.name.cmp(&b.name)),
        }

        for buffer in buffers {
            let text = format!(
                "{} bytes ({})",
                buffer.size,
                buffer.created.format("%a %b %e %H:%M:%S %Y")
            );
            builder.add(None, u64::from(buffer.order), buffer.name.clone(), text, buffer);
        }
    }

    fn draw(&self, data: &PasteBuffer, width: u16, height: u16) -> Option<Buffer> {
        let contents = self.store.data(&data.name)?;
        let mut buf = Buffer::empty(Rect::new(0, 0, width, height));
        for (y, line) in (0..height).zip(contents.split(|&byte| byte == b'\n')) {
            let line = escape_line(line);
            if !line.is_empty() {
                buf.set_stringn(0, y, &line, usize::from(width), Style::default());
            }
        }
        Some(buf)
    }
}

/// Makes a line of buffer data printable: tabs become `\t`, backslashes are
/// doubled and any other non-printable byte is written as `\ooo`.
pub fn escape_line(line: &[u8]) -> String {
    let mut out = String::with_capacity(line.len());
    for &byte in line {
        match byte {
            b'\t' => out.push_str("\\t"),
            b'\\' => out.push_str("\\\\"),
            0x20..=0x7e => out.push(char::from(byte)),
            _ => {
                let _ = write!(out, "\\{byte:03o}");
            }
        }
    }
    out
}

/// A running buffer chooser: tree state plus the command template.
pub struct BufferChooser {
    tree: ModeTreeState<PasteBuffer>,
    command: String,
}

impl BufferChooser {
    /// Enters the chooser and builds the initial list.
    ///
    /// `command` defaults to [`DEFAULT_BUFFER_COMMAND`].
    pub fn start<H, P>(
        host: &H,
        store: &P,
        area: Rect,
        command: Option<&str>,
    ) -> Result<Self, ModeTreeError>
    where
        H: CommandHost + ?Sized,
        P: PasteStore + ?Sized,
    {
        if !host.has_client() {
            return Err(ModeTreeError::NoClient);
        }
        let mut tree = ModeTreeState::start(area, BUFFER_SORT_LIST)?;
        tree.build(&mut BufferSource::new(store));
        Ok(Self {
            tree,
            command: command.unwrap_or(DEFAULT_BUFFER_COMMAND).to_string(),
        })
    }

    #[inline]
    pub const fn tree(&self) -> &ModeTreeState<PasteBuffer> {
        &self.tree
    }

    #[inline]
    pub const fn tree_mut(&mut self) -> &mut ModeTreeState<PasteBuffer> {
        &mut self.tree
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn rebuild<P: PasteStore + ?Sized>(&mut self, store: &P) {
        self.tree.build(&mut BufferSource::new(store));
    }

    pub fn resize<P: PasteStore + ?Sized>(&mut self, store: &P, area: Rect) {
        self.tree.resize(&mut BufferSource::new(store), area);
    }

    /// Handles an action and returns [`TreeEvent::Finished`] once the
    /// chooser should be torn down.
    pub fn handle_action<H, P>(
        &mut self,
        host: &mut H,
        store: &mut P,
        action: TreeAction<BufferAction>,
    ) -> TreeEvent<BufferAction>
    where
        H: CommandHost + ?Sized,
        P: PasteStore + ?Sized,
    {
        let event = self.tree.handle_action(&mut BufferSource::new(&*store), action);
        self.finish_event(host, store, event)
    }

    #[cfg(feature = "keymap")]
    /// Resolves an input event with the chooser's keys (`Enter`, `d`, `D`)
    /// on top of the tree bindings and handles it.
    pub fn handle_event<H, P>(
        &mut self,
        host: &mut H,
        store: &mut P,
        event: &Event,
    ) -> TreeEvent<BufferAction>
    where
        H: CommandHost + ?Sized,
        P: PasteStore + ?Sized,
    {
        let event = self
            .tree
            .handle_event_with(&mut BufferSource::new(&*store), event, buffer_key);
        self.finish_event(host, store, event)
    }

    /// Runs `template` once for each tagged buffer, then rebuilds.
    ///
    /// Returns how many commands were queued.
    pub fn command_tagged<H, P>(&mut self, host: &mut H, store: &P, template: &str) -> usize
    where
        H: CommandHost + ?Sized,
        P: PasteStore + ?Sized,
    {
        let queued = self
            .tree
            .each_tagged()
            .filter(|buffer| run_command(host, template, &buffer.name).is_ok())
            .count();
        self.rebuild(store);
        queued
    }

    fn finish_event<H, P>(
        &mut self,
        host: &mut H,
        store: &mut P,
        event: TreeEvent<BufferAction>,
    ) -> TreeEvent<BufferAction>
    where
        H: CommandHost + ?Sized,
        P: PasteStore + ?Sized,
    {
        let event = match event {
            TreeEvent::Activate | TreeEvent::Action(TreeAction::Custom(BufferAction::Paste)) => {
                self.paste(host)
            }
            TreeEvent::Action(TreeAction::Custom(BufferAction::Delete)) => {
                self.delete_current(store);
                TreeEvent::Handled
            }
            TreeEvent::Action(TreeAction::Custom(BufferAction::DeleteTagged)) => {
                self.delete_tagged(store);
                TreeEvent::Handled
            }
            other => other,
        };

        if event != TreeEvent::Finished && store.buffers().is_empty() {
            log::debug!("buffer chooser: no buffers left");
            return TreeEvent::Finished;
        }
        event
    }

    fn paste<H: CommandHost + ?Sized>(&self, host: &mut H) -> TreeEvent<BufferAction> {
        let Some(buffer) = self.tree.current_data() else {
            return TreeEvent::Handled;
        };
        if let Err(err) = run_command(host, &self.command, &buffer.name) {
            log::debug!("buffer chooser: {} not pasted: {err}", buffer.name);
        }
        TreeEvent::Finished
    }

    fn delete_current<P: PasteStore + ?Sized>(&mut self, store: &mut P) {
        let Some(name) = self.tree.current_data().map(|buffer| buffer.name.clone()) else {
            return;
        };
        self.tree.select_next();
        store.delete(&name);
        self.rebuild(store);
    }

    fn delete_tagged<P: PasteStore + ?Sized>(&mut self, store: &mut P) {
        let names: Vec<String> = self
            .tree
            .each_tagged()
            .map(|buffer| buffer.name.clone())
            .collect();
        if self.tree.current_item().is_some_and(|item| item.is_tagged()) {
            self.tree.select_next();
        }
        for name in &names {
            store.delete(name);
        }
        log::debug!("buffer chooser: deleted {} tagged buffers", names.len());
        self.rebuild(store);
    }
}

#[cfg(feature = "keymap")]
fn buffer_key(key: KeyEvent) -> Option<BufferAction> {
    if !key.modifiers.difference(KeyModifiers::SHIFT).is_empty() {
        return None;
    }
    match key.code {
        KeyCode::Enter => Some(BufferAction::Paste),
        KeyCode::Char('d') => Some(BufferAction::Delete),
        KeyCode::Char('D') => Some(BufferAction::DeleteTagged),
        _ => None,
    }
}
