//! Keyboard mapping from terminal key events to game commands

use crate::game::Action;
use crate::settings::Settings;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press asks the driver to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Play(Action),
    Restart,
    Quit,
}

/// Key bindings configuration - supports multiple keys per action
#[derive(Debug, Clone)]
pub struct KeyMap {
    rotate_cw: Vec<KeyCode>,
    rotate_ccw: Vec<KeyCode>,
    move_left: Vec<KeyCode>,
    move_right: Vec<KeyCode>,
    soft_drop: Vec<KeyCode>,
    restart: Vec<KeyCode>,
    quit: Vec<KeyCode>,
}

impl KeyMap {
    /// Parse a key string into KeyCode
    fn parse_key(s: &str) -> Option<KeyCode> {
        let code = match s.to_lowercase().as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "esc" | "escape" => KeyCode::Esc,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return None,
                }
            }
        };
        Some(code)
    }

    /// Parse a list of key strings into KeyCodes, skipping unknown names
    fn parse_keys(keys: &[String]) -> Vec<KeyCode> {
        keys.iter()
            .filter_map(|s| {
                let code = Self::parse_key(s);
                if code.is_none() {
                    tracing::warn!("Unknown key binding {:?}", s);
                }
                code
            })
            .collect()
    }

    /// Create keybindings from settings
    pub fn from_settings(settings: &Settings) -> Self {
        let keys = &settings.keys;
        Self {
            rotate_cw: Self::parse_keys(&keys.rotate_cw),
            rotate_ccw: Self::parse_keys(&keys.rotate_ccw),
            move_left: Self::parse_keys(&keys.move_left),
            move_right: Self::parse_keys(&keys.move_right),
            soft_drop: Self::parse_keys(&keys.soft_drop),
            restart: Self::parse_keys(&keys.restart),
            quit: Self::parse_keys(&keys.quit),
        }
    }

    /// Translate a key press. Ctrl+C always quits.
    pub fn command(&self, key: KeyEvent) -> Option<Command> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Command::Quit);
        }

        let code = normalize_key(key.code);
        let command = if self.rotate_cw.contains(&code) {
            Command::Play(Action::RotateClockwise)
        } else if self.rotate_ccw.contains(&code) {
            Command::Play(Action::RotateCounterClockwise)
        } else if self.move_left.contains(&code) {
            Command::Play(Action::MoveLeft)
        } else if self.move_right.contains(&code) {
            Command::Play(Action::MoveRight)
        } else if self.soft_drop.contains(&code) {
            Command::Play(Action::SoftDrop)
        } else if self.restart.contains(&code) {
            Command::Restart
        } else if self.quit.contains(&code) {
            Command::Quit
        } else {
            return None;
        };
        Some(command)
    }

    /// Display names for the controls panel
    pub fn describe(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Rotate", format!("{} / {}", names(&self.rotate_ccw), names(&self.rotate_cw))),
            ("Move", format!("{} / {}", names(&self.move_left), names(&self.move_right))),
            ("Drop", names(&self.soft_drop)),
            ("Restart", names(&self.restart)),
            ("Quit", names(&self.quit)),
        ]
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Letter keys match regardless of case
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

fn names(codes: &[KeyCode]) -> String {
    codes
        .iter()
        .map(|code| match code {
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Esc => "Esc".to_string(),
            other => format!("{:?}", other),
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_default_bindings() {
        let keys = KeyMap::default();
        assert_eq!(
            keys.command(press(KeyCode::Char('e'))),
            Some(Command::Play(Action::RotateClockwise))
        );
        assert_eq!(
            keys.command(press(KeyCode::Char('q'))),
            Some(Command::Play(Action::RotateCounterClockwise))
        );
        assert_eq!(
            keys.command(press(KeyCode::Char('a'))),
            Some(Command::Play(Action::MoveLeft))
        );
        assert_eq!(
            keys.command(press(KeyCode::Char('d'))),
            Some(Command::Play(Action::MoveRight))
        );
        assert_eq!(
            keys.command(press(KeyCode::Char('s'))),
            Some(Command::Play(Action::SoftDrop))
        );
        assert_eq!(keys.command(press(KeyCode::Char('r'))), Some(Command::Restart));
        assert_eq!(keys.command(press(KeyCode::Esc)), Some(Command::Quit));
        assert_eq!(keys.command(press(KeyCode::Char('z'))), None);
    }

    #[test]
    fn test_uppercase_matches() {
        let keys = KeyMap::default();
        assert_eq!(
            keys.command(press(KeyCode::Char('A'))),
            Some(Command::Play(Action::MoveLeft))
        );
    }

    #[test]
    fn test_ctrl_c_quits() {
        let keys = KeyMap::default();
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(keys.command(event), Some(Command::Quit));
    }

    #[test]
    fn test_custom_bindings_from_settings() {
        let mut settings = Settings::default();
        settings.keys.move_left = vec!["Left".to_string(), "h".to_string()];
        settings.keys.rotate_cw = vec!["nonsense".to_string(), "Up".to_string()];
        let keys = KeyMap::from_settings(&settings);

        assert_eq!(
            keys.command(press(KeyCode::Left)),
            Some(Command::Play(Action::MoveLeft))
        );
        assert_eq!(
            keys.command(press(KeyCode::Char('h'))),
            Some(Command::Play(Action::MoveLeft))
        );
        assert_eq!(
            keys.command(press(KeyCode::Up)),
            Some(Command::Play(Action::RotateClockwise))
        );
        assert_eq!(keys.command(press(KeyCode::Char('a'))), None);
    }

    #[test]
    fn test_describe_lists_keys() {
        let rows = KeyMap::default().describe();
        assert_eq!(rows[0], ("Rotate", "q / e".to_string()));
        assert_eq!(rows[4], ("Quit", "Esc".to_string()));
    }
}
