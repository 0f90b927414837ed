use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, InputMode, Screen};
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
            app.poll_diagnosis().await;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Works in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Screen switching, mirroring the nav bar
        KeyCode::Char('1') => app.goto(Screen::Home),
        KeyCode::Char('2') => app.goto(Screen::Diagnose),
        KeyCode::Char('3') => app.goto(Screen::Report),
        KeyCode::Char('4') => app.goto(Screen::Profile),

        KeyCode::Char('w') => app.connect_wallet(),

        _ => match app.screen {
            Screen::Home => handle_home(app, key),
            Screen::Diagnose => handle_diagnose_normal(app, key),
            Screen::Report => handle_report(app, key),
            Screen::Profile => handle_profile(app, key),
        },
    }
}

fn handle_home(app: &mut App, key: KeyEvent) {
    // The "Get Diagnosed" call to action
    if key.code == KeyCode::Enter {
        app.goto(Screen::Diagnose);
    }
}

fn handle_diagnose_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.goto(Screen::Home),
        KeyCode::Char('i') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('j') | KeyCode::Down => app.scroll_chat_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_chat_up(),
        KeyCode::Char('g') => app.chat_scroll = 0,
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),
        _ => {}
    }
}

fn handle_report(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.report_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.report_nav_up(),
        KeyCode::Esc => app.goto(Screen::Home),
        _ => {}
    }
}

fn handle_profile(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab | KeyCode::Char('l') | KeyCode::Right => {
            app.profile_tab = app.profile_tab.next();
        }
        KeyCode::BackTab | KeyCode::Char('h') | KeyCode::Left => {
            app.profile_tab = app.profile_tab.prev();
        }
        KeyCode::Esc => app.goto(Screen::Home),
        _ => {}
    }
}

/// Editing mode only exists on the Diagnose screen: it edits the session
/// draft. While a request is in flight the input is disabled; only Esc (and
/// Enter, which the session itself refuses) get through.
fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => app.submit_draft(),
        _ if app.session.in_flight() => {}
        KeyCode::Backspace => app.session.delete_back(),
        KeyCode::Delete => app.session.delete_forward(),
        KeyCode::Left => app.session.cursor_left(),
        KeyCode::Right => app.session.cursor_right(),
        KeyCode::Home => app.session.cursor_home(),
        KeyCode::End => app.session.cursor_end(),
        KeyCode::Char(c) => app.session.insert_char(c),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown => match app.screen {
            Screen::Diagnose => {
                app.scroll_chat_down();
                app.scroll_chat_down();
                app.scroll_chat_down();
            }
            Screen::Report => app.report_nav_down(),
            _ => {}
        },
        MouseEventKind::ScrollUp => match app.screen {
            Screen::Diagnose => {
                app.scroll_chat_up();
                app.scroll_chat_up();
                app.scroll_chat_up();
            }
            Screen::Report => app.report_nav_up(),
            _ => {}
        },
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnosis::DiagnoseClient;
    use crate::records::PatientRecord;
    use crate::wallet::WalletProvider;
    use anyhow::anyhow;

    struct NoWallet;

    impl WalletProvider for NoWallet {
        fn request_address(&self) -> anyhow::Result<String> {
            Err(anyhow!("not installed"))
        }
    }

    fn test_app() -> App {
        App::new(
            DiagnoseClient::new("http://127.0.0.1:9"),
            Box::new(NoWallet),
            PatientRecord::sample(),
        )
    }

    fn press(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[tokio::test]
    async fn digit_keys_switch_screens() {
        let mut app = test_app();
        handle_event(&mut app, press(KeyCode::Char('4'))).await.unwrap();
        assert_eq!(app.screen, Screen::Profile);
        handle_event(&mut app, press(KeyCode::Char('3'))).await.unwrap();
        assert_eq!(app.screen, Screen::Report);
    }

    #[tokio::test]
    async fn enter_on_home_opens_diagnose_in_editing_mode() {
        let mut app = test_app();
        handle_event(&mut app, press(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.screen, Screen::Diagnose);
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[tokio::test]
    async fn typed_characters_land_in_the_draft() {
        let mut app = test_app();
        app.goto(Screen::Diagnose);
        for code in [KeyCode::Char('f'), KeyCode::Char('l'), KeyCode::Char('u')] {
            handle_event(&mut app, press(code)).await.unwrap();
        }
        assert_eq!(app.session.draft(), "flu");
    }

    #[tokio::test]
    async fn typing_is_blocked_while_in_flight() {
        let mut app = test_app();
        app.goto(Screen::Diagnose);
        for c in "fever".chars() {
            app.session.insert_char(c);
        }
        app.submit_draft();
        assert!(app.session.in_flight());

        handle_event(&mut app, press(KeyCode::Char('x'))).await.unwrap();
        assert_eq!(app.session.draft(), "");
    }

    #[tokio::test]
    async fn q_quits_in_normal_mode_but_types_in_editing_mode() {
        let mut app = test_app();
        app.goto(Screen::Diagnose);
        handle_event(&mut app, press(KeyCode::Char('q'))).await.unwrap();
        assert!(!app.should_quit);
        assert_eq!(app.session.draft(), "q");

        handle_event(&mut app, press(KeyCode::Esc)).await.unwrap();
        handle_event(&mut app, press(KeyCode::Char('q'))).await.unwrap();
        assert!(app.should_quit);
    }
}
