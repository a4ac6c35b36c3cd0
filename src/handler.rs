use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, InputMode};
use crate::tui::AppEvent;

/// Convert a char index to a byte index for string editing
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Ctrl+C quits from any mode
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
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,

        KeyCode::Char('i') | KeyCode::Enter => app.input_mode = InputMode::Editing,

        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(),
        KeyCode::Char('G') => app.scroll_to_bottom(),
        KeyCode::Char('g') => app.chat_scroll = 0,

        KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_conversation();
        }

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            submit_input(app);
        }
        KeyCode::Backspace => {
            if app.draft.cursor > 0 {
                app.draft.cursor -= 1;
                let byte_pos = char_to_byte_index(&app.draft.text, app.draft.cursor);
                app.draft.text.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.draft.text.chars().count();
            if app.draft.cursor < char_count {
                let byte_pos = char_to_byte_index(&app.draft.text, app.draft.cursor);
                app.draft.text.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.draft.cursor = app.draft.cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.draft.text.chars().count();
            app.draft.cursor = (app.draft.cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.draft.cursor = 0;
        }
        KeyCode::End => {
            app.draft.cursor = app.draft.text.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.draft.text, app.draft.cursor);
            app.draft.text.insert(byte_pos, c);
            app.draft.cursor += 1;
        }
        _ => {}
    }
}

/// Input-line commands standing in for the original file pickers.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Image(String),
    File(String),
    Clear,
}

fn parse_command(input: &str) -> Option<Command> {
    let input = input.trim();
    if let Some(reference) = input.strip_prefix("/image ") {
        let reference = reference.trim();
        return (!reference.is_empty()).then(|| Command::Image(reference.to_string()));
    }
    if let Some(name) = input.strip_prefix("/file ") {
        let name = name.trim();
        return (!name.is_empty()).then(|| Command::File(name.to_string()));
    }
    if input == "/clear" {
        return Some(Command::Clear);
    }
    None
}

fn submit_input(app: &mut App) {
    if let Some(command) = parse_command(&app.draft.text) {
        match command {
            Command::Image(reference) => app.draft.image = Some(reference),
            Command::File(name) => app.draft.file = Some(name),
            Command::Clear => app.clear_conversation(),
        }
        app.draft.text.clear();
        app.draft.cursor = 0;
        return;
    }

    app.submit();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_image_command() {
        assert_eq!(
            parse_command("/image photo.png"),
            Some(Command::Image("photo.png".to_string()))
        );
        assert_eq!(parse_command("/image   "), None);
    }

    #[test]
    fn test_parse_file_command() {
        assert_eq!(
            parse_command("/file report with spaces.pdf"),
            Some(Command::File("report with spaces.pdf".to_string()))
        );
        assert_eq!(parse_command("/file"), None);
    }

    #[test]
    fn test_parse_clear_command() {
        assert_eq!(parse_command("/clear"), Some(Command::Clear));
        assert_eq!(parse_command(" /clear "), Some(Command::Clear));
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(parse_command("tell me about /clear"), None);
        assert_eq!(parse_command("hello"), None);
    }

    #[test]
    fn test_char_to_byte_index_handles_multibyte() {
        let s = "héllo";
        assert_eq!(char_to_byte_index(s, 0), 0);
        assert_eq!(char_to_byte_index(s, 2), 3); // é is two bytes
        assert_eq!(char_to_byte_index(s, 99), s.len());
    }
}
