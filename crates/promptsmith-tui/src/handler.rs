use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, InputMode, Screen};
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Tick => {
            app.tick_animation();
            app.poll_turn().await;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                app.should_quit = true;
                return;
            }
            KeyCode::Char('n') => {
                app.new_chat();
                return;
            }
            KeyCode::Char('y') => {
                app.copy_result();
                return;
            }
            KeyCode::Char('s') => {
                app.save_result();
                return;
            }
            _ => {}
        }
    }

    match (app.screen, app.input_mode) {
        (Screen::Compose, InputMode::Editing) => handle_compose_editing(app, key),
        (Screen::Compose, InputMode::Normal) => handle_compose_normal(app, key),
        (Screen::Result, _) => handle_result(app, key),
    }
}

fn handle_compose_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            if app.conversation.error().is_some() {
                app.conversation.dismiss_error();
            } else {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Enter => app.submit(),
        KeyCode::Tab => app.open_result(),
        KeyCode::Backspace => app.conversation.backspace(),
        KeyCode::Delete => app.conversation.delete(),
        KeyCode::Left => app.conversation.cursor_left(),
        KeyCode::Right => app.conversation.cursor_right(),
        KeyCode::Home => app.conversation.cursor_home(),
        KeyCode::End => app.conversation.cursor_end(),
        KeyCode::Up => app.chat_scroll = app.chat_scroll.saturating_sub(1),
        KeyCode::Down => app.chat_scroll = app.chat_scroll.saturating_add(1),
        KeyCode::Char(c) => app.conversation.insert_char(c),
        _ => {}
    }
}

fn handle_compose_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('i') | KeyCode::Enter => app.input_mode = InputMode::Editing,
        KeyCode::Char('n') => app.new_chat(),
        KeyCode::Tab | KeyCode::Char('r') => app.open_result(),
        KeyCode::Esc => app.conversation.dismiss_error(),
        KeyCode::Char('j') | KeyCode::Down => app.chat_scroll = app.chat_scroll.saturating_add(1),
        KeyCode::Char('k') | KeyCode::Up => app.chat_scroll = app.chat_scroll.saturating_sub(1),
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),
        KeyCode::Char('g') => app.chat_scroll = 0,
        _ => {}
    }
}

fn handle_result(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Esc | KeyCode::Tab | KeyCode::Char('b') => app.back_to_compose(),
        KeyCode::Char('c') | KeyCode::Char('y') => app.copy_result(),
        KeyCode::Char('s') => app.save_result(),
        // "Create another prompt"
        KeyCode::Char('n') => app.new_chat(),
        KeyCode::Char('j') | KeyCode::Down => {
            app.result_scroll = app.result_scroll.saturating_add(1)
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.result_scroll = app.result_scroll.saturating_sub(1)
        }
        KeyCode::Char('g') => app.result_scroll = 0,
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let delta: i32 = match mouse.kind {
        MouseEventKind::ScrollDown => 3,
        MouseEventKind::ScrollUp => -3,
        _ => return,
    };
    let scroll = match app.screen {
        Screen::Compose => &mut app.chat_scroll,
        Screen::Result => &mut app.result_scroll,
    };
    *scroll = (*scroll as i32 + delta).clamp(0, u16::MAX as i32) as u16;
}
