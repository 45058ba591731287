//! User configuration — keybindings, type host and display settings.
//!
//! Stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/type-inspector/config.toml` (default
//! `~/.config/type-inspector/config.toml`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::platform::DEFAULT_PLATFORM;

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions in the tree pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    Expand,
    Collapse,
    ExpandAll,
    CollapseAll,
    ScrollLeft,
    ScrollRight,
    FocusEditor,
    PickPlatform,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used when writing the config file).
    pub const ALL: &[Action] = &[
        Action::MoveUp,
        Action::MoveDown,
        Action::PageUp,
        Action::PageDown,
        Action::Expand,
        Action::Collapse,
        Action::ExpandAll,
        Action::CollapseAll,
        Action::ScrollLeft,
        Action::ScrollRight,
        Action::FocusEditor,
        Action::PickPlatform,
        Action::Quit,
    ];

    /// Key used in the config file.
    fn config_key(self) -> &'static str {
        match self {
            Action::MoveUp => "move_up",
            Action::MoveDown => "move_down",
            Action::PageUp => "page_up",
            Action::PageDown => "page_down",
            Action::Expand => "expand",
            Action::Collapse => "collapse",
            Action::ExpandAll => "expand_all",
            Action::CollapseAll => "collapse_all",
            Action::ScrollLeft => "scroll_left",
            Action::ScrollRight => "scroll_right",
            Action::FocusEditor => "focus_editor",
            Action::PickPlatform => "pick_platform",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding — key code + modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

const MODIFIER_MASK: KeyModifiers = KeyModifiers::CONTROL
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::SHIFT);

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Only CTRL/ALT/SHIFT are compared.
    pub fn matches(&self, event: KeyEvent) -> bool {
        self.code == event.code
            && (self.modifiers & MODIFIER_MASK) == (event.modifiers & MODIFIER_MASK)
    }

    /// Short form for the status bar (e.g. `"↑"`, `"Ctrl+p"`).
    pub fn display(&self) -> String {
        let mut s = modifier_prefix(self.modifiers);
        s.push_str(&match self.code {
            KeyCode::Up => "↑".into(),
            KeyCode::Down => "↓".into(),
            KeyCode::Left => "←".into(),
            KeyCode::Right => "→".into(),
            other => key_name(other),
        });
        s
    }

    fn to_config_string(&self) -> String {
        let mut s = modifier_prefix(self.modifiers);
        s.push_str(&key_name(self.code));
        s
    }

    /// Parse a key string like `"Ctrl+p"`, `"Shift+Left"`, `"q"`, `"Tab"`.
    fn parse(s: &str) -> Option<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let parts: Vec<&str> = s.split('+').collect();
        let key_part = parts.last()?;

        for &part in &parts[..parts.len() - 1] {
            match part.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "alt" => modifiers |= KeyModifiers::ALT,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        let code = match key_part.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            k if k.starts_with('f') && k.len() > 1 => KeyCode::F(k[1..].parse().ok()?),
            _ if key_part.chars().count() == 1 => KeyCode::Char(key_part.chars().next()?),
            _ => return None,
        };

        Some(KeyBind { code, modifiers })
    }
}

fn modifier_prefix(modifiers: KeyModifiers) -> String {
    let mut s = String::new();
    if modifiers.contains(KeyModifiers::CONTROL) {
        s.push_str("Ctrl+");
    }
    if modifiers.contains(KeyModifiers::ALT) {
        s.push_str("Alt+");
    }
    if modifiers.contains(KeyModifiers::SHIFT) {
        s.push_str("Shift+");
    }
    s
}

fn key_name(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".into(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Up => "Up".into(),
        KeyCode::Down => "Down".into(),
        KeyCode::Left => "Left".into(),
        KeyCode::Right => "Right".into(),
        KeyCode::Enter => "Enter".into(),
        KeyCode::Esc => "Esc".into(),
        KeyCode::Tab => "Tab".into(),
        KeyCode::Home => "Home".into(),
        KeyCode::End => "End".into(),
        KeyCode::PageUp => "PageUp".into(),
        KeyCode::PageDown => "PageDown".into(),
        KeyCode::F(n) => format!("F{n}"),
        other => format!("{other:?}"),
    }
}

// ───────────────────────────────────────── config ────────────

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    /// Type host program.  `None` means no parsing is possible.
    pub host_command: Option<String>,
    /// Extra arguments passed to the host before its subcommand.
    pub host_args: Vec<String>,
    /// Platform used when nothing has been picked yet.
    pub default_platform: String,
    /// Cells of indentation per tree level.
    pub indent_width: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            host_command: None,
            host_args: Vec::new(),
            default_platform: DEFAULT_PLATFORM.to_string(),
            indent_width: 2,
        }
    }
}

impl AppConfig {
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;
        let ctrl = KeyModifiers::CONTROL;
        let shift = KeyModifiers::SHIFT;
        let mut m = HashMap::new();

        m.insert(MoveUp, vec![KeyBind::new(Up, n), KeyBind::new(Char('k'), n)]);
        m.insert(MoveDown, vec![KeyBind::new(Down, n), KeyBind::new(Char('j'), n)]);
        m.insert(Action::PageUp, vec![KeyBind::new(KeyCode::PageUp, n)]);
        m.insert(Action::PageDown, vec![KeyBind::new(KeyCode::PageDown, n)]);
        m.insert(Expand, vec![KeyBind::new(Right, n), KeyBind::new(Char('l'), n)]);
        m.insert(Collapse, vec![KeyBind::new(Left, n), KeyBind::new(Char('h'), n)]);
        m.insert(ExpandAll, vec![KeyBind::new(Char('e'), n)]);
        m.insert(CollapseAll, vec![KeyBind::new(Char('c'), n)]);
        m.insert(ScrollLeft, vec![KeyBind::new(Left, shift), KeyBind::new(Char('['), n)]);
        m.insert(ScrollRight, vec![KeyBind::new(Right, shift), KeyBind::new(Char(']'), n)]);
        m.insert(FocusEditor, vec![KeyBind::new(Tab, n), KeyBind::new(Char('i'), n)]);
        m.insert(PickPlatform, vec![KeyBind::new(Char('p'), n), KeyBind::new(Char('p'), ctrl)]);
        m.insert(Quit, vec![KeyBind::new(Char('q'), n)]);

        m
    }

    /// Find the action that matches a key event.  When several bindings
    /// match, the one with the most modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        let mut best: Option<(Action, u32)> = None;
        for (&action, binds) in &self.bindings {
            for bind in binds {
                if bind.matches(event) {
                    let mc = bind.modifiers.bits().count_ones();
                    if best.map_or(true, |(_, m)| mc > m) {
                        best = Some((action, mc));
                    }
                }
            }
        }
        best.map(|(a, _)| a)
    }

    /// Short display of the first binding only (for the status bar).
    fn short_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}: navigate | {}: expand/collapse | {}: expand all | {}: edit | {}: platform | {}: quit",
            self.short_binding(Action::MoveUp),
            self.short_binding(Action::Expand),
            self.short_binding(Action::ExpandAll),
            self.short_binding(Action::FocusEditor),
            self.short_binding(Action::PickPlatform),
            self.short_binding(Action::Quit),
        )
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from `path`, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse_config(&contents),
            Err(_) => Self::default(),
        }
    }

    /// Persist current config to `path`.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, self.serialise())?;
        Ok(())
    }

    fn parse_config(s: &str) -> Self {
        let mut config = Self::default();

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "host_command" => {
                    let v = value.trim_matches('"');
                    config.host_command = (!v.is_empty()).then(|| v.to_string());
                    continue;
                }
                "host_args" => {
                    config.host_args = value
                        .trim_matches('"')
                        .split_whitespace()
                        .map(str::to_string)
                        .collect();
                    continue;
                }
                "default_platform" => {
                    let v = value.trim_matches('"');
                    if !v.is_empty() {
                        config.default_platform = v.to_string();
                    }
                    continue;
                }
                "indent_width" => {
                    if let Ok(v) = value.parse::<usize>() {
                        config.indent_width = v.clamp(1, 8);
                    }
                    continue;
                }
                _ => {}
            }

            let Some(action) = Action::from_config_key(key) else {
                tracing::debug!("ignoring unknown config key `{key}`");
                continue;
            };

            let parsed: Vec<KeyBind> = value
                .split(',')
                .filter_map(|part| KeyBind::parse(part.trim().trim_matches('"')))
                .collect();
            if !parsed.is_empty() {
                config.bindings.insert(action, parsed);
            }
        }

        config
    }

    fn serialise(&self) -> String {
        let mut lines = vec![
            "# type-inspector configuration".to_string(),
            String::new(),
            "# Type host".to_string(),
            format!(
                "host_command = \"{}\"",
                self.host_command.as_deref().unwrap_or("")
            ),
            format!("host_args = \"{}\"", self.host_args.join(" ")),
            format!("default_platform = \"{}\"", self.default_platform),
            String::new(),
            "# Display".to_string(),
            format!("indent_width = {}", self.indent_width),
            String::new(),
            "# Key bindings (tree pane)".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            String::new(),
        ];

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(|b| b.to_config_string()).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// `$XDG_CONFIG_HOME/type-inspector`, falling back to `~/.config`.
pub fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    base.join("type-inspector")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn defaults_match_keys() {
        let config = AppConfig::default();
        assert_eq!(
            config.match_key(key(KeyCode::Char('j'), KeyModifiers::NONE)),
            Some(Action::MoveDown)
        );
        assert_eq!(
            config.match_key(key(KeyCode::Right, KeyModifiers::SHIFT)),
            Some(Action::ScrollRight)
        );
        assert_eq!(
            config.match_key(key(KeyCode::Right, KeyModifiers::NONE)),
            Some(Action::Expand)
        );
        assert_eq!(config.match_key(key(KeyCode::Char('z'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn parses_host_and_bindings() {
        let config = AppConfig::parse_config(
            "# comment\n\
             host_command = \"/opt/bn/type-host\"\n\
             host_args = \"--headless --quiet\"\n\
             default_platform = \"linux-aarch64\"\n\
             indent_width = 40\n\
             quit = Ctrl+x, Esc\n\
             bogus = q\n",
        );
        assert_eq!(config.host_command.as_deref(), Some("/opt/bn/type-host"));
        assert_eq!(config.host_args, ["--headless", "--quiet"]);
        assert_eq!(config.default_platform, "linux-aarch64");
        assert_eq!(config.indent_width, 8);
        assert_eq!(
            config.bindings[&Action::Quit],
            [
                KeyBind::new(KeyCode::Char('x'), KeyModifiers::CONTROL),
                KeyBind::new(KeyCode::Esc, KeyModifiers::NONE),
            ]
        );
        assert_eq!(config.bindings[&Action::MoveUp], AppConfig::default_bindings()[&Action::MoveUp]);
    }

    #[test]
    fn serialised_config_parses_back() {
        let mut config = AppConfig::default();
        config.host_command = Some("type-host".into());
        config.host_args = vec!["-v".into()];
        let parsed = AppConfig::parse_config(&config.serialise());
        assert_eq!(parsed.host_command, config.host_command);
        assert_eq!(parsed.host_args, config.host_args);
        assert_eq!(parsed.bindings, config.bindings);
    }

    #[test]
    fn save_then_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("type-inspector").join("config.toml");
        assert_eq!(AppConfig::load_from(&path).indent_width, 2);

        let mut config = AppConfig::default();
        config.indent_width = 4;
        config.default_platform = "linux-x86".into();
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded.indent_width, 4);
        assert_eq!(loaded.default_platform, "linux-x86");
    }

    #[test]
    fn empty_host_command_means_none() {
        let config = AppConfig::parse_config("host_command = \"\"\n");
        assert_eq!(config.host_command, None);
    }

    #[test]
    fn key_display() {
        assert_eq!(KeyBind::new(KeyCode::Up, KeyModifiers::NONE).display(), "↑");
        assert_eq!(
            KeyBind::new(KeyCode::Char('p'), KeyModifiers::CONTROL).display(),
            "Ctrl+p"
        );
        assert_eq!(KeyBind::parse("Shift+Left"), Some(KeyBind::new(KeyCode::Left, KeyModifiers::SHIFT)));
        assert_eq!(KeyBind::parse("Hyper+q"), None);
    }
}
