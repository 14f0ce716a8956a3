use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::App;

impl App {
    /// Returns `true` when the shell should quit.
    pub(super) fn handle_key(&mut self, key: KeyEvent) -> bool {
        // Holding a key down must not toggle repeatedly.
        if key.kind != KeyEventKind::Press {
            return false;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => true,
            KeyCode::Char(' ') => {
                self.toggle();
                false
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.show_daily_average();
                false
            }
            KeyCode::Char('h') | KeyCode::Char('H') => {
                self.toggle_history();
                false
            }
            _ => false,
        }
    }
}
