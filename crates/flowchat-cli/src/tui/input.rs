//! Input handling for TUI key events.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use flowchat_core::RelayRequest;

use crate::app::ChatSession;

use super::TermEvent;

/// Process a terminal event. Returns the request to send when Enter
/// dispatched a query.
pub fn handle_term_event(session: &mut ChatSession, event: TermEvent) -> Option<RelayRequest> {
    match event {
        TermEvent::Key(key) => handle_key(session, key),
        TermEvent::Resize(_, _) => None, // redrawn on the next tick
    }
}

fn handle_key(session: &mut ChatSession, key: KeyEvent) -> Option<RelayRequest> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    match key.code {
        KeyCode::Char('c' | 'd') if ctrl => session.should_quit = true,
        KeyCode::Esc => session.should_quit = true,
        KeyCode::Enter => return session.begin_submit(),
        KeyCode::Char(c) => session.insert_char(c),
        KeyCode::Backspace => session.delete_before_cursor(),
        KeyCode::Left => session.cursor_left(),
        KeyCode::Right => session.cursor_right(),
        KeyCode::Home => session.cursor_pos = 0,
        KeyCode::End if shift => session.scroll_to_bottom(),
        KeyCode::End => session.cursor_pos = session.input.len(),
        KeyCode::Up if shift => session.scroll_up(1),
        KeyCode::Down if shift => session.scroll_down(1),
        KeyCode::Up => session.history_up(),
        KeyCode::Down => session.history_down(),
        KeyCode::PageUp => session.scroll_up(session.viewport_height.max(1)),
        KeyCode::PageDown => session.scroll_down(session.viewport_height.max(1)),
        _ => {}
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::app::{ChatSettings, EMPTY_INPUT};

    fn key(code: KeyCode) -> TermEvent {
        TermEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(session: &mut ChatSession, text: &str) {
        for c in text.chars() {
            handle_term_event(session, key(KeyCode::Char(c)));
        }
    }

    fn session() -> ChatSession {
        ChatSession::new(ChatSettings::default(), None)
    }

    #[test]
    fn enter_dispatches_typed_query() {
        let mut session = session();
        type_text(&mut session, "top posts?");
        let request = handle_term_event(&mut session, key(KeyCode::Enter)).unwrap();
        assert_eq!(request.input_value, "top posts?");
        assert!(session.is_loading);
    }

    #[test]
    fn enter_on_blank_input_prompts() {
        let mut session = session();
        assert!(handle_term_event(&mut session, key(KeyCode::Enter)).is_none());
        assert_eq!(session.messages().last().unwrap().content, EMPTY_INPUT);
    }

    #[test]
    fn enter_while_loading_keeps_input() {
        let mut session = session();
        type_text(&mut session, "one");
        handle_term_event(&mut session, key(KeyCode::Enter)).unwrap();
        type_text(&mut session, "two");
        assert!(handle_term_event(&mut session, key(KeyCode::Enter)).is_none());
        assert_eq!(session.input, "two");
    }

    #[test]
    fn ctrl_c_quits() {
        let mut session = session();
        let event = TermEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        handle_term_event(&mut session, event);
        assert!(session.should_quit);
        assert!(session.input.is_empty());
    }

    #[test]
    fn backspace_and_arrows_edit_input() {
        let mut session = session();
        type_text(&mut session, "ab•");
        handle_term_event(&mut session, key(KeyCode::Left));
        handle_term_event(&mut session, key(KeyCode::Backspace));
        assert_eq!(session.input, "a•");
        handle_term_event(&mut session, key(KeyCode::Right));
        type_text(&mut session, "c");
        assert_eq!(session.input, "a•c");
    }

    #[test]
    fn up_recalls_previous_query() {
        let mut session = session();
        type_text(&mut session, "first");
        handle_term_event(&mut session, key(KeyCode::Enter)).unwrap();
        handle_term_event(&mut session, key(KeyCode::Up));
        assert_eq!(session.input, "first");
        handle_term_event(&mut session, key(KeyCode::Down));
        assert!(session.input.is_empty());
    }
}
