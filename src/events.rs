//! Event handling functions for user input and animation pacing.

use std::time::Duration;

use color_eyre::eyre::Result;
use ratatui::crossterm::event::{
    self, Event, KeyCode, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};

use crate::{grid::Direction, ui, App};

/// How long to wait for input when nothing is animating.
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Handles input events and advances the running animation.
///
/// This function waits for input no longer than the time left until the next animation step, so
/// that steps stay evenly spaced while the UI remains responsive. Keyboard and mouse events are
/// dispatched to their handlers before the animation is given a chance to advance.
pub(crate) fn handle_events(app: &mut App) -> Result<()> {
    let timeout = if app.is_animating() {
        app.timer.remaining()
    } else {
        IDLE_POLL
    };

    if event::poll(timeout)? {
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key.code)?,
            Event::Mouse(mouse) => handle_mouse(app, mouse)?,
            _ => {}
        }
    }

    app.tick();

    Ok(())
}

/// Handles a key press.
///
/// Editing keys are ignored by the application while an algorithm owns the grid; `Esc` aborts it
/// and `q` quits at any time.
pub(crate) fn handle_key(app: &mut App, code: KeyCode) -> Result<()> {
    match code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Esc => app.abort(),
        KeyCode::Char('h') | KeyCode::Left => app.move_cursor(Direction::Left),
        KeyCode::Char('j') | KeyCode::Down => app.move_cursor(Direction::Down),
        KeyCode::Char('k') | KeyCode::Up => app.move_cursor(Direction::Up),
        KeyCode::Char('l') | KeyCode::Right => app.move_cursor(Direction::Right),
        KeyCode::Char('w') => app.paint(app.cursor, true)?,
        KeyCode::Char('x') => app.paint(app.cursor, false)?,
        KeyCode::Char(' ') => app.flip_at_cursor()?,
        KeyCode::Char('c') => app.clear_walls(),
        KeyCode::Char('s') => app.begin_search(),
        KeyCode::Char('g') => app.begin_maze(),
        _ => {}
    }

    Ok(())
}

/// Handles a mouse event.
///
/// Pressing or dragging with the left button paints walls, the right button erases them. The cursor
/// follows the pointer.
pub(crate) fn handle_mouse(app: &mut App, mouse: MouseEvent) -> Result<()> {
    let wall = match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) => true,
        MouseEventKind::Down(MouseButton::Right) | MouseEventKind::Drag(MouseButton::Right) => {
            false
        }
        _ => return Ok(()),
    };

    if let Some(index) = ui::cell_under(app, mouse.column, mouse.row) {
        app.cursor = index;
        app.paint(index, wall)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use ratatui::{
        backend::TestBackend,
        crossterm::event::KeyModifiers,
        layout::Rect,
        Terminal,
    };

    use super::*;
    use crate::{app::Mode, config::Config};

    /// Creates a test app whose grid is drawn at a known place.
    fn create_test_app() -> App {
        let mut app = App::new(Config {
            width: 6,
            height: 4,
            seed: Some(2),
            ..Config::default()
        })
        .expect("test app should build");
        app.grid_area = Rect::new(10, 5, 12, 4);
        app
    }

    /// Builds a mouse event at the given terminal position.
    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_quit_key() {
        let mut app = create_test_app();
        handle_key(&mut app, KeyCode::Char('q')).expect("key should be handled");

        assert!(app.exit);
    }

    #[test]
    fn test_cursor_keys() {
        let mut app = create_test_app();
        handle_key(&mut app, KeyCode::Char('l')).expect("key should be handled");
        handle_key(&mut app, KeyCode::Right).expect("key should be handled");
        handle_key(&mut app, KeyCode::Char('j')).expect("key should be handled");
        assert_eq!(app.cursor, 8);

        handle_key(&mut app, KeyCode::Char('h')).expect("key should be handled");
        handle_key(&mut app, KeyCode::Up).expect("key should be handled");
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn test_wall_keys() {
        let mut app = create_test_app();
        app.cursor = 7;

        handle_key(&mut app, KeyCode::Char('w')).expect("key should be handled");
        assert!(app.grid.cell_at(7).expect("cell exists").is_wall());

        handle_key(&mut app, KeyCode::Char('x')).expect("key should be handled");
        assert!(!app.grid.cell_at(7).expect("cell exists").is_wall());

        handle_key(&mut app, KeyCode::Char(' ')).expect("key should be handled");
        assert!(app.grid.cell_at(7).expect("cell exists").is_wall());

        handle_key(&mut app, KeyCode::Char('c')).expect("key should be handled");
        assert_eq!(app.grid.wall_count(), 0);
    }

    #[test]
    fn test_endpoint_cannot_be_painted() {
        let mut app = create_test_app();
        handle_key(&mut app, KeyCode::Char('w')).expect("key should be handled");

        assert!(!app.grid.cell_at(0).expect("cell exists").is_wall());
    }

    #[test]
    fn test_search_and_abort_keys() {
        let mut app = create_test_app();
        handle_key(&mut app, KeyCode::Char('s')).expect("key should be handled");
        assert!(matches!(app.mode, Mode::Searching(_)));

        handle_key(&mut app, KeyCode::Char('g')).expect("key should be handled");
        assert!(matches!(app.mode, Mode::Searching(_)));

        handle_key(&mut app, KeyCode::Esc).expect("key should be handled");
        assert!(matches!(app.mode, Mode::Editing));

        handle_key(&mut app, KeyCode::Char('g')).expect("key should be handled");
        assert!(matches!(app.mode, Mode::Generating(_)));
    }

    #[test]
    fn test_mouse_paints_and_erases() {
        let mut app = create_test_app();

        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 13, 6))
            .expect("mouse should be handled");
        assert_eq!(app.cursor, 7);
        assert!(app.grid.cell_at(7).expect("cell exists").is_wall());

        handle_mouse(&mut app, mouse(MouseEventKind::Drag(MouseButton::Left), 14, 6))
            .expect("mouse should be handled");
        assert!(app.grid.cell_at(8).expect("cell exists").is_wall());

        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Right), 12, 6))
            .expect("mouse should be handled");
        assert!(!app.grid.cell_at(7).expect("cell exists").is_wall());
        assert_eq!(app.grid.wall_count(), 1);
    }

    #[test]
    fn test_mouse_outside_grid_is_ignored() {
        let mut app = create_test_app();

        handle_mouse(&mut app, mouse(MouseEventKind::Down(MouseButton::Left), 2, 2))
            .expect("mouse should be handled");
        handle_mouse(&mut app, mouse(MouseEventKind::Moved, 13, 6))
            .expect("mouse should be handled");

        assert_eq!(app.cursor, 0);
        assert_eq!(app.grid.wall_count(), 0);
    }

    #[test]
    fn test_mouse_after_redraw() {
        let mut app = create_test_app();
        let mut terminal = Terminal::new(TestBackend::new(40, 12)).expect("terminal should build");
        let _ = terminal
            .draw(|frame| ui::draw(&mut app, frame).expect("drawing should succeed in test"))
            .expect("drawing should succeed");
        let area = app.grid_area;

        handle_mouse(
            &mut app,
            mouse(MouseEventKind::Down(MouseButton::Left), area.x + 2, area.y + 1),
        )
        .expect("mouse should be handled");

        assert!(app.grid.cell_at(7).expect("cell exists").is_wall());
    }
}
