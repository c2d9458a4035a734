use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub struct KeyHandler;

impl KeyHandler {
    pub fn handle_normal_mode_key(key_event: KeyEvent) -> NormalModeAction {
        match key_event.code {
            KeyCode::Char('q') => NormalModeAction::Quit,
            KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                NormalModeAction::Quit
            }
            KeyCode::Esc => NormalModeAction::ClearSelection,
            KeyCode::Up | KeyCode::Char('k') => NormalModeAction::MoveUp,
            KeyCode::Down | KeyCode::Char('j') => NormalModeAction::MoveDown,
            KeyCode::Char(' ') => NormalModeAction::ToggleSelection,
            KeyCode::Char('a') => NormalModeAction::SelectAllVisible,
            KeyCode::Char('A') => NormalModeAction::DeselectAllVisible,
            KeyCode::Tab => NormalModeAction::NextView,
            KeyCode::BackTab => NormalModeAction::PreviousView,
            KeyCode::Char('/') => NormalModeAction::EnterSearchMode,
            KeyCode::Char('d') => NormalModeAction::BulkDelete,
            KeyCode::Char('e') => NormalModeAction::BulkFindEmail,
            KeyCode::Char('g') => NormalModeAction::BulkGenerateOutreach,
            KeyCode::Char('x') => NormalModeAction::CancelBatch,
            KeyCode::Char('r') => NormalModeAction::RetryCurrent,
            KeyCode::Char('R') => NormalModeAction::Reload,
            KeyCode::Char('c') => NormalModeAction::DismissNotification,
            KeyCode::Char('?') => NormalModeAction::ToggleHelpMode,
            _ => NormalModeAction::None,
        }
    }

    pub fn handle_help_mode_key(key_event: KeyEvent) -> HelpModeAction {
        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc | KeyCode::Char('?') => {
                HelpModeAction::ExitHelpMode
            }
            _ => HelpModeAction::None,
        }
    }

    pub fn handle_search_mode_key(key_event: KeyEvent) -> SearchModeAction {
        match key_event.code {
            KeyCode::Esc => SearchModeAction::CancelSearch,
            KeyCode::Enter => SearchModeAction::ConfirmSearch,
            KeyCode::Backspace => SearchModeAction::Backspace,
            KeyCode::Char(c) => SearchModeAction::InsertChar(c),
            _ => SearchModeAction::None,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum NormalModeAction {
    None,
    Quit,
    ClearSelection,
    MoveUp,
    MoveDown,
    ToggleSelection,
    SelectAllVisible,
    DeselectAllVisible,
    NextView,
    PreviousView,
    EnterSearchMode,
    BulkDelete,
    BulkFindEmail,
    BulkGenerateOutreach,
    CancelBatch,
    RetryCurrent,
    Reload,
    DismissNotification,
    ToggleHelpMode,
}

#[derive(Debug, PartialEq)]
pub enum HelpModeAction {
    None,
    ExitHelpMode,
}

#[derive(Debug, PartialEq)]
pub enum SearchModeAction {
    None,
    CancelSearch,
    ConfirmSearch,
    Backspace,
    InsertChar(char),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_mode_basic_keys() {
        let key_event = KeyEvent::from(KeyCode::Char('q'));
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::Quit);

        let key_event = KeyEvent::from(KeyCode::Esc);
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::ClearSelection);

        let key_event = KeyEvent::from(KeyCode::Char(' '));
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::ToggleSelection);

        let key_event = KeyEvent::from(KeyCode::Char('?'));
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::ToggleHelpMode);
    }

    #[test]
    fn test_normal_mode_navigation_keys() {
        let key_event = KeyEvent::from(KeyCode::Up);
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::MoveUp);

        let key_event = KeyEvent::from(KeyCode::Char('j'));
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::MoveDown);

        let key_event = KeyEvent::from(KeyCode::Tab);
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::NextView);

        let key_event = KeyEvent::from(KeyCode::BackTab);
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::PreviousView);
    }

    #[test]
    fn test_normal_mode_bulk_keys() {
        let key_event = KeyEvent::from(KeyCode::Char('a'));
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::SelectAllVisible);

        let mut key_event = KeyEvent::from(KeyCode::Char('A'));
        key_event.modifiers = KeyModifiers::SHIFT;
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::DeselectAllVisible);

        let key_event = KeyEvent::from(KeyCode::Char('d'));
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::BulkDelete);

        let key_event = KeyEvent::from(KeyCode::Char('e'));
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::BulkFindEmail);

        let key_event = KeyEvent::from(KeyCode::Char('g'));
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::BulkGenerateOutreach);

        let key_event = KeyEvent::from(KeyCode::Char('x'));
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::CancelBatch);

        let key_event = KeyEvent::from(KeyCode::Char('r'));
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::RetryCurrent);

        let key_event = KeyEvent::from(KeyCode::Char('R'));
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::Reload);
    }

    #[test]
    fn test_normal_mode_ctrl_keys() {
        let mut key_event = KeyEvent::from(KeyCode::Char('c'));
        key_event.modifiers = KeyModifiers::CONTROL;
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::Quit);

        let key_event = KeyEvent::from(KeyCode::Char('c'));
        assert_eq!(KeyHandler::handle_normal_mode_key(key_event), NormalModeAction::DismissNotification);
    }

    #[test]
    fn test_help_mode_keys() {
        let key_event = KeyEvent::from(KeyCode::Esc);
        assert_eq!(KeyHandler::handle_help_mode_key(key_event), HelpModeAction::ExitHelpMode);

        let key_event = KeyEvent::from(KeyCode::Char('?'));
        assert_eq!(KeyHandler::handle_help_mode_key(key_event), HelpModeAction::ExitHelpMode);

        let key_event = KeyEvent::from(KeyCode::Char('x'));
        assert_eq!(KeyHandler::handle_help_mode_key(key_event), HelpModeAction::None);
    }

    #[test]
    fn test_search_mode_keys() {
        let key_event = KeyEvent::from(KeyCode::Esc);
        assert_eq!(KeyHandler::handle_search_mode_key(key_event), SearchModeAction::CancelSearch);

        let key_event = KeyEvent::from(KeyCode::Enter);
        assert_eq!(KeyHandler::handle_search_mode_key(key_event), SearchModeAction::ConfirmSearch);

        let key_event = KeyEvent::from(KeyCode::Backspace);
        assert_eq!(KeyHandler::handle_search_mode_key(key_event), SearchModeAction::Backspace);

        let key_event = KeyEvent::from(KeyCode::Char('d'));
        assert_eq!(KeyHandler::handle_search_mode_key(key_event), SearchModeAction::InsertChar('d'));
    }
}
