use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Which surface currently receives keys: the section view, or the logs
/// overlay when it is open.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum InputMode {
    Sections,
    Logs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextSection,
    PrevSection,
    NextNamespace,
    PrevNamespace,
    Down,
    Up,
    Refresh,
    ViewLogs,
    NextContainer,
    PrevContainer,
    NextTailLines,
    PrevTailLines,
    ToggleHelp,
    CloseOverlay,
}

pub fn map_key(mode: InputMode, key: KeyEvent) -> Option<Action> {
    match mode {
        InputMode::Sections => map_sections_key(key),
        InputMode::Logs => map_logs_key(key),
    }
}

fn map_sections_key(key: KeyEvent) -> Option<Action> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }
    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Right | KeyCode::Tab => Some(Action::NextSection),
        KeyCode::Left | KeyCode::BackTab => Some(Action::PrevSection),
        KeyCode::Char('j') | KeyCode::Down => Some(Action::Down),
        KeyCode::Char('k') | KeyCode::Up => Some(Action::Up),
        KeyCode::Char('n') => Some(Action::NextNamespace),
        KeyCode::Char('N') | KeyCode::Char('p') => Some(Action::PrevNamespace),
        KeyCode::Char('r') | KeyCode::F(5) => Some(Action::Refresh),
        KeyCode::Char('l') | KeyCode::Enter => Some(Action::ViewLogs),
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        KeyCode::Esc => Some(Action::CloseOverlay),
        _ => None,
    }
}

fn map_logs_key(key: KeyEvent) -> Option<Action> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => Some(Action::CloseOverlay),
        KeyCode::Char('c') => Some(Action::NextContainer),
        KeyCode::Char('C') => Some(Action::PrevContainer),
        KeyCode::Char('t') => Some(Action::NextTailLines),
        KeyCode::Char('T') => Some(Action::PrevTailLines),
        KeyCode::Char('r') | KeyCode::F(5) => Some(Action::Refresh),
        KeyCode::Char('j') | KeyCode::Down => Some(Action::Down),
        KeyCode::Char('k') | KeyCode::Up => Some(Action::Up),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, InputMode, map_key};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn sections_mode_maps_quit() {
        let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(map_key(InputMode::Sections, key), Some(Action::Quit));
    }

    #[test]
    fn sections_mode_maps_tab_switching() {
        let right = KeyEvent::new(KeyCode::Right, KeyModifiers::NONE);
        let left = KeyEvent::new(KeyCode::Left, KeyModifiers::NONE);
        assert_eq!(map_key(InputMode::Sections, right), Some(Action::NextSection));
        assert_eq!(map_key(InputMode::Sections, left), Some(Action::PrevSection));
    }

    #[test]
    fn sections_mode_maps_l_to_view_logs() {
        let key = KeyEvent::new(KeyCode::Char('l'), KeyModifiers::NONE);
        assert_eq!(map_key(InputMode::Sections, key), Some(Action::ViewLogs));
    }

    #[test]
    fn logs_mode_maps_selector_cycling() {
        let container = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        let tail = KeyEvent::new(KeyCode::Char('t'), KeyModifiers::NONE);
        assert_eq!(map_key(InputMode::Logs, container), Some(Action::NextContainer));
        assert_eq!(map_key(InputMode::Logs, tail), Some(Action::NextTailLines));
    }

    #[test]
    fn logs_mode_maps_escape_to_close() {
        let key = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(map_key(InputMode::Logs, key), Some(Action::CloseOverlay));
    }

    #[test]
    fn ctrl_c_quits_in_both_modes() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(InputMode::Sections, key), Some(Action::Quit));
        assert_eq!(map_key(InputMode::Logs, key), Some(Action::Quit));
    }
}
