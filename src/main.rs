//! A terminal inspector for C type declarations.
//!
//! Type declarations into the top pane; the bottom pane shows how the chosen
//! target platform lays them out (widths, alignments, member offsets, ...).
//! Parsing is delegated to an external type host, see [`core::host`].
//!
//! Run with `--dump FILE` to print the type tree once without the TUI.

mod app;
mod config;
mod core;
mod prefs;
mod ui;

use std::io::{self, stderr, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    session::{Session, UpdateOutcome},
    state::{ActiveView, AppState, PaneFocus},
};
use crate::config::AppConfig;
use crate::core::{
    host::HostRegistry,
    platform::{resolve_platform, PlatformRef, PlatformRegistry},
};
use crate::prefs::{FileSettings, MemorySettings};
use crate::ui::{editor_widget::EditorWidget, popup, theme::Theme, tree_widget::TreeWidget};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    about = "Inspect how C type declarations lay out on a target platform"
)]
struct Cli {
    /// Platform to parse against (overrides the remembered choice).
    #[arg(long)]
    platform: Option<String>,

    /// Type host program (overrides `host_command` in the config file).
    #[arg(long)]
    host: Option<String>,

    /// Argument passed to the host before its subcommand.  Repeatable;
    /// replaces `host_args` from the config file.
    #[arg(long = "host-arg", value_name = "ARG", allow_hyphen_values = true)]
    host_args: Vec<String>,

    /// Parse FILE once (`-` for stdin), print the type tree and exit.
    #[arg(long, value_name = "FILE")]
    dump: Option<PathBuf>,

    /// With `--dump`, print JSON instead of indented text.
    #[arg(long, requires = "dump")]
    json: bool,

    /// Print the platforms the type host knows and exit.
    #[arg(long)]
    list_platforms: bool,
}

impl Cli {
    fn registry(&self, config: &AppConfig) -> HostRegistry {
        let program = self.host.clone().or_else(|| config.host_command.clone());
        let args = if self.host_args.is_empty() {
            config.host_args.clone()
        } else {
            self.host_args.clone()
        };
        HostRegistry::new(program, args)
    }

    /// `--platform`, checked against what the host offers.
    fn resolved_platform(&self, registry: &dyn PlatformRegistry) -> Result<Option<PlatformRef>> {
        self.platform
            .as_deref()
            .map(|name| resolve_platform(registry, name))
            .transpose()
            .context("invalid --platform")
    }
}

// ───────────────────────────────────────── one-shot modes ────

fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("reading declarations from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }
}

fn run_dump(cli: &Cli, path: &Path, config: &AppConfig) -> Result<ExitCode> {
    let registry = cli.registry(config);
    let platform = cli
        .resolved_platform(&registry)?
        .unwrap_or_else(|| PlatformRef::new(config.default_platform.clone()));

    let mut session = Session {
        platform,
        ..Session::default()
    };
    session.set_source(&read_source(path)?);

    match session.update_types(&registry, &mut MemorySettings::default()) {
        UpdateOutcome::Rendered => {
            let Some(forest) = session.forest else {
                return Ok(ExitCode::SUCCESS);
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&forest)?);
            } else {
                print!("{}", forest.to_text());
            }
            Ok(ExitCode::SUCCESS)
        }
        UpdateOutcome::Rejected => {
            if let Some(err) = session.error {
                eprintln!("{}: {}", path.display(), err.message);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_list(cli: &Cli, config: &AppConfig) -> Result<ExitCode> {
    let registry = cli.registry(config);
    for platform in registry.list_platforms()? {
        println!("{platform}");
    }
    Ok(ExitCode::SUCCESS)
}

// ───────────────────────────────────────── drawing ───────────

fn pane_block(title: &str, focused: bool) -> Block<'static> {
    Block::default()
        .title(format!(" {title} "))
        .title_style(Theme::title_style())
        .borders(Borders::ALL)
        .border_style(if focused {
            Theme::focused_border_style()
        } else {
            Theme::border_style()
        })
}

fn editor_widget(state: &AppState) -> EditorWidget<'static> {
    let focused = state.focus == PaneFocus::Editor;
    EditorWidget::new()
        .block(pane_block("Declarations", focused))
        .invalid(state.session.is_invalid())
        .error_line(
            state
                .session
                .error
                .as_ref()
                .and_then(|e| e.position)
                .map(|p| p.line),
        )
}

fn draw(frame: &mut Frame, state: &mut AppState) {
    state.terminal_area = frame.area();
    let layout = state.layout();
    let main_view = state.active_view == ActiveView::Main;

    let platform_bar = Line::from(vec![
        Span::raw(" Platform: "),
        Span::styled(state.session.platform.to_string(), Theme::platform_bar_style()),
    ]);
    frame.render_widget(Paragraph::new(platform_bar), layout.platform_area);

    frame.render_stateful_widget(editor_widget(state), layout.editor_area, &mut state.editor);
    if main_view && state.focus == PaneFocus::Editor {
        if let Some(pos) = editor_widget(state).cursor_position(layout.editor_area, &state.editor) {
            frame.set_cursor_position(pos);
        }
    }

    if let Some(err) = &state.session.error {
        let error = Paragraph::new(err.message.as_str())
            .style(Theme::error_message_style())
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(" Error ")
                    .borders(Borders::ALL)
                    .border_style(Theme::error_message_style()),
            );
        frame.render_widget(error, layout.error_area);
    }

    let tree_focused = state.focus == PaneFocus::Tree;
    let tree_widget = TreeWidget::new(&state.view)
        .indent(state.config.indent_width)
        .focused(tree_focused)
        .block(pane_block("Types", tree_focused));
    frame.render_stateful_widget(tree_widget, layout.tree_area, &mut state.tree_state);

    let hint = state.config.status_bar_hint();
    let status_text = match state.active_view {
        ActiveView::Main => state.status_message.as_deref().unwrap_or(&hint),
        ActiveView::PlatformPicker => "",
    };
    let status = Paragraph::new(status_text).style(Theme::status_bar_style());
    frame.render_widget(status, layout.status_area);

    if state.active_view == ActiveView::PlatformPicker {
        frame.render_widget(
            popup::PlatformPopup {
                platforms: &state.platforms,
                selected: state.picker_selected,
                current: &state.session.platform,
            },
            frame.area(),
        );
    }
}

// ───────────────────────────────────────── main ─────────────

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr; stdout belongs to `--dump`.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = config::config_path();
    let user_config = AppConfig::load_from(&config_path);

    // ── one-shot modes ────────────────────────────────────────
    if cli.list_platforms {
        return run_list(&cli, &user_config);
    }
    if let Some(path) = cli.dump.as_deref() {
        return run_dump(&cli, path, &user_config);
    }

    // Leave a commented default config behind for the user to edit.
    if !config_path.exists() {
        if let Err(e) = user_config.save_to(&config_path) {
            tracing::warn!("could not write default config: {e:#}");
        }
    }

    let registry = cli.registry(&user_config);
    if !registry.is_configured() {
        tracing::warn!(
            "no type host configured; set host_command in {} or pass --host",
            config_path.display()
        );
    }
    let platform = cli.resolved_platform(&registry)?;
    let store = FileSettings::open_default();
    tracing::debug!("settings at {}", store.path().display());

    let mut state = AppState::new(user_config, Box::new(registry), Box::new(store), platform);

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(
        stderr_handle,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    let mut events = spawn_event_reader(Duration::from_millis(100));

    // ── event loop ────────────────────────────────────────────
    loop {
        terminal.draw(|frame| draw(frame, &mut state))?;

        let Some(event) = events.recv().await else {
            break;
        };
        match event {
            AppEvent::Key(k) => handler::handle_key(&mut state, k),
            AppEvent::Mouse(m) => handler::handle_mouse(&mut state, m),
            AppEvent::Paste(text) => handler::handle_paste(&mut state, &text),
            AppEvent::Resize(_, _) | AppEvent::Tick => {}
        }

        if state.should_quit {
            break;
        }
    }

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(ExitCode::SUCCESS)
}
