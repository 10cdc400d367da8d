// Interactive session/window/pane picker over synthetic data.
//
// Keys: arrows or j/k move, +/- expand and collapse, t tags, T untags all,
// C-t tags all, O cycles the sort order, Enter "switches" to the selection,
// q quits. The mouse selects rows and scrolls.
use std::fs::File;
use std::io;
use std::time::Duration;

use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent};
use crossterm::execute;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::{DefaultTerminal, Frame};
use simplelog::{Config, LevelFilter, WriteLogger};

use tui_modetree::{
    CommandHost, ModeTreeState, ModeTreeStyle, ModeTreeView, TreeAction, TreeBuilder, TreeEvent,
    TreeSource, run_command,
};

const SORTS: &[&str] = &["index", "name", "time"];

#[derive(Clone, Copy, Debug)]
enum Target {
    Session(usize),
    Window(usize, usize),
    Pane(usize, usize, usize),
}

struct Pane {
    command: &'static str,
}

struct Window {
    name: &'static str,
    panes: Vec<Pane>,
}

struct Session {
    name: &'static str,
    created: u32,
    windows: Vec<Window>,
}

// Session list shaped like a small multiplexer server.
struct Server {
    sessions: Vec<Session>,
}

impl Server {
    fn synthetic() -> Self {
        let window = |name, commands: &[&'static str]| Window {
            name,
            panes: commands.iter().map(|&command| Pane { command }).collect(),
        };
        Self {
            sessions: vec![
                Session {
                    name: "work",
                    created: 3,
                    windows: vec![
                        window("editor", &["nvim src/lib.rs", "cargo watch"]),
                        window("shell", &["zsh"]),
                        window("logs", &["tail -f app.log", "htop", "journalctl -f"]),
                    ],
                },
                Session {
                    name: "dotfiles",
                    created: 1,
                    windows: vec![window("config", &["nvim init.lua"])],
                },
                Session {
                    name: "music",
                    created: 2,
                    windows: vec![window("player", &["ncmpcpp"]), window("mixer", &["alsamixer"])],
                },
            ],
        }
    }

    // Unique per target across rebuilds.
    const fn tag(target: Target) -> u64 {
        match target {
            Target::Session(s) => (s as u64 + 1) << 32,
            Target::Window(s, w) => ((s as u64 + 1) << 32) | ((w as u64 + 1) << 16),
            Target::Pane(s, w, p) => {
                ((s as u64 + 1) << 32) | ((w as u64 + 1) << 16) | (p as u64 + 1)
            }
        }
    }

    fn name(&self, target: Target) -> String {
        match target {
            Target::Session(s) => self.sessions[s].name.to_string(),
            Target::Window(s, w) => format!("{}:{w}", self.sessions[s].name),
            Target::Pane(s, w, p) => format!("{}:{w}.{p}", self.sessions[s].name),
        }
    }
}

impl TreeSource<Target> for Server {
    fn build(&mut self, builder: &mut TreeBuilder<'_, Target>, sort_index: usize) {
        let mut order: Vec<usize> = (0..self.sessions.len()).collect();
        match SORTS.get(sort_index).copied() {
            Some("name") => order.sort_by_key(|&s| self.sessions[s].name),
            Some("time") => order.sort_by_key(|&s| self.sessions[s].created),
            _ => {}
        }

        for s in order {
            let session = &self.sessions[s];
            let text = format!("{} windows", session.windows.len());
            let target = Target::Session(s);
            let parent = builder.add(None, Self::tag(target), session.name, text, target);

            for (w, window) in session.windows.iter().enumerate() {
                let target = Target::Window(s, w);
                let text = format!("{} ({} panes)", window.name, window.panes.len());
                let window_ref = builder.add(Some(parent), Self::tag(target), w.to_string(), text, target);
                if window.panes.len() < 2 {
                    continue;
                }
                for (p, pane) in window.panes.iter().enumerate() {
                    let target = Target::Pane(s, w, p);
                    builder.add(Some(window_ref), Self::tag(target), p.to_string(), pane.command, target);
                }
            }
        }
    }

    fn draw(&self, data: &Target, width: u16, height: u16) -> Option<Buffer> {
        let mut buf = Buffer::empty(Rect::new(0, 0, width, height));
        let lines: Vec<String> = match *data {
            Target::Session(s) => self.sessions[s]
                .windows
                .iter()
                .enumerate()
                .map(|(w, window)| format!("{w}: {}", window.name))
                .collect(),
            Target::Window(s, w) => self.sessions[s].windows[w]
                .panes
                .iter()
                .map(|pane| format!("$ {}", pane.command))
                .collect(),
            Target::Pane(s, w, p) => vec![
                format!("$ {}", self.sessions[s].windows[w].panes[p].command),
                String::from("..."),
            ],
        };
        for (y, line) in (0..height).zip(lines) {
            buf.set_stringn(0, y, line, usize::from(width), Style::default());
        }
        Some(buf)
    }
}

// Accepts `switch-client` only and shows what would have run.
#[derive(Default)]
struct StatusHost {
    status: String,
}

impl CommandHost for StatusHost {
    type Command = String;

    fn parse(&mut self, command: &str) -> Result<String, String> {
        if command.starts_with("switch-client ") {
            Ok(command.to_string())
        } else {
            Err(format!("unknown command: {command}"))
        }
    }

    fn enqueue(&mut self, command: String) {
        self.status = format!("would run: {command}");
    }

    fn status_message(&mut self, message: &str) {
        self.status = message.to_string();
    }
}

fn activate(host: &mut StatusHost, server: &Server, state: &ModeTreeState<Target>) {
    if let Some(&target) = state.current_data() {
        let _ = run_command(host, "switch-client -t '%%'", &server.name(target));
    }
}

fn activate_key(key: KeyEvent) -> Option<()> {
    (key.code == KeyCode::Enter).then_some(())
}

fn render(frame: &mut Frame, server: &Server, state: &mut ModeTreeState<Target>, host: &StatusHost) {
    let [tree, status] = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)])
        .areas(frame.area());

    let style = ModeTreeStyle {
        tag_style: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        line_style: Style::default().fg(Color::DarkGray),
        ..ModeTreeStyle::default()
    };
    frame.render_stateful_widget(ModeTreeView::<Target, Server>::new(server, style), tree, state);

    let tagged = state.tagged_count();
    let line = if host.status.is_empty() {
        format!("{tagged} tagged, sort: {}", state.sort_name())
    } else {
        host.status.clone()
    };
    frame.render_widget(Line::from(line), status);
}

fn run_app(mut terminal: DefaultTerminal, mut server: Server) -> io::Result<()> {
    let mut host = StatusHost::default();
    let area = terminal.get_frame().area();
    let Ok(mut state) = ModeTreeState::<Target>::start(area, SORTS) else {
        return Ok(());
    };
    state.build(&mut server);

    loop {
        terminal.draw(|frame| render(frame, &server, &mut state, &host))?;

        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        let input = event::read()?;
        if let Event::Resize(_, _) = input {
            // The next draw re-fits; a rebuild keeps the data fresh.
            let area = terminal.get_frame().area();
            state.resize(&mut server, area);
            continue;
        }
        match state.handle_event_with(&mut server, &input, activate_key) {
            TreeEvent::Finished => break,
            TreeEvent::Activate | TreeEvent::Action(TreeAction::Custom(())) => {
                activate(&mut host, &server, &state);
            }
            TreeEvent::Handled | TreeEvent::Unhandled | TreeEvent::Action(_) => {}
        }
    }

    Ok(())
}

fn main() -> io::Result<()> {
    let log_path = std::env::temp_dir().join("choose_tree.log");
    let log_file = File::create(&log_path)?;
    let _ = WriteLogger::init(LevelFilter::Debug, Config::default(), log_file);

    let terminal = ratatui::init();
    execute!(io::stdout(), EnableMouseCapture)?;
    let result = run_app(terminal, Server::synthetic());
    execute!(io::stdout(), DisableMouseCapture)?;
    ratatui::restore();
    result
}
