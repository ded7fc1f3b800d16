//! User interface rendering of the grid and the status bar.

use color_eyre::eyre::{OptionExt as _, Result};
use glam::DVec2;
use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::{line, DOT},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use crate::{
    app::{App, Mode},
    grid::{Cell, Direction, Directions, Grid, VisitStatus, MARGIN},
    stepping::Stepwise as _,
};

/// Terminal columns used to draw a single cell, keeping cells roughly square.
pub(crate) const CELL_COLUMNS: u16 = 2;

/// Middle dot marking the cells on a route.
const ROUTE: &str = "\u{b7}";

/// Key bindings shown in the status bar.
const KEYS: &str = "hjkl move w wall x erase spc flip c clear g maze s search esc abort q quit";

/// Overlay drawn on top of a cell while a route is being followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// The cell lies on the route.
    Route,
    /// The agent has passed through the cell.
    Trail,
    /// The agent is in the cell.
    Agent,
}

/// Updates the application UI based on the persistent state.
///
/// This function draws the grid centered in the frame, with the status bar underneath. The area the
/// grid ends up in is stored in the [`App`] so that mouse events can be mapped back to cells.
///
/// # Errors
///
/// This function may return errors if the layout cannot be split.
pub(crate) fn draw(app: &mut App, frame: &mut Frame) -> Result<()> {
    clear(frame);

    let overall_layout = Layout::vertical([
        Constraint::Min(1),    // Grid and padding area
        Constraint::Length(3), // Status block
    ])
    .split(frame.area());

    let grid_content_area = *overall_layout
        .first()
        .ok_or_eyre("failed to get grid content area from layout")?;
    let status_area = *overall_layout
        .last()
        .ok_or_eyre("failed to get status area from layout")?;

    let space = centered(
        grid_content_area,
        app.grid.width().saturating_mul(CELL_COLUMNS),
        app.grid.height(),
    )?;
    app.grid_area = space;

    let marks = route_marks(app);
    let lines = (0..app.grid.height())
        .map(|row| grid_line(app, &marks, row))
        .collect::<Vec<_>>();
    frame.render_widget(Paragraph::new(lines), space);

    let status_block = Block::bordered()
        .title(KEYS)
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(Color::Green))
        .border_type(BorderType::Plain)
        .borders(Borders::TOP);
    let status_inner = status_block.inner(status_area);

    frame.render_widget(status_block, status_area);
    frame.render_widget(
        Paragraph::new(status(app)).alignment(Alignment::Center),
        status_inner,
    );

    Ok(())
}

/// Clears the terminal screen by rendering a [`Clear`] widget.
pub(crate) fn clear(frame: &mut Frame) {
    let clear = Clear;
    frame.render_widget(clear, frame.area());
}

/// Centers a rectangle of the given size inside an area, shrinking it if the area is too small.
fn centered(area: Rect, width: u16, height: u16) -> Result<Rect> {
    let rows = *Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .split(area)
        .first()
        .ok_or_eyre("failed to get grid rows from layout")?;

    Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .split(rows)
        .first()
        .copied()
        .ok_or_eyre("failed to get grid columns from layout")
}

/// Maps a terminal position to the cell drawn there during the last redraw.
pub(crate) fn cell_under(app: &App, column: u16, row: u16) -> Option<usize> {
    let area = app.grid_area;
    if column < area.x || row < area.y || column >= area.right() || row >= area.bottom() {
        return None;
    }

    app.grid
        .index_of(row - area.y, (column - area.x) / CELL_COLUMNS)
}

/// World point at the middle of the cell an agent at `position` is drawn in.
///
/// Agent positions follow cell positions, which sit one margin inside the cell's corner.
pub(crate) fn agent_center(grid: &Grid, position: DVec2) -> DVec2 {
    let half_cell = rounded_div::i32(i32::from(grid.cell_size()), 2);
    position + DVec2::splat(f64::from(half_cell) - MARGIN)
}

/// Collects the route overlay of every cell while a route is being followed.
fn route_marks(app: &App) -> Vec<Option<Mark>> {
    let mut marks = vec![None; app.grid.len()];
    let Mode::Following { path, agent, trail } = &app.mode else {
        return marks;
    };

    let route = path
        .points()
        .iter()
        .filter_map(|&point| app.grid.cell_at_point(point))
        .map(|index| (index, Mark::Route));
    let travelled = trail.iter().map(|&index| (index, Mark::Trail));
    let current = app
        .grid
        .cell_at_point(agent_center(&app.grid, agent.position()))
        .map(|index| (index, Mark::Agent));

    for (index, mark) in route.chain(travelled).chain(current) {
        if let Some(slot) = marks.get_mut(index) {
            *slot = Some(mark);
        }
    }

    marks
}

/// Builds the terminal line drawing a single grid row.
fn grid_line(app: &App, marks: &[Option<Mark>], row: u16) -> Line<'static> {
    let spans = (0..app.grid.width())
        .filter_map(|col| app.grid.index_of(row, col))
        .filter_map(|index| {
            let cell = app.grid.cell_at(index).ok()?;
            let mark = marks.get(index).copied().flatten();
            Some(cell_span(app, index, cell, mark))
        })
        .collect::<Vec<_>>();

    Line::from(spans)
}

/// Builds the styled pair of terminal columns drawing a single cell.
fn cell_span(app: &App, index: usize, cell: &Cell, mark: Option<Mark>) -> Span<'static> {
    let mut style = Style::default().fg(Color::White).bg(background(app, cell));
    if index == app.cursor && !app.is_busy() {
        style = style.add_modifier(Modifier::REVERSED);
    }

    let symbol = match mark {
        Some(Mark::Agent) => {
            style = style.fg(Color::LightRed).add_modifier(Modifier::BOLD);
            "()".to_owned()
        }
        Some(Mark::Trail) => {
            style = style.fg(Color::Red);
            DOT.repeat(2)
        }
        Some(Mark::Route) => ROUTE.repeat(2),
        None if matches!(app.mode, Mode::Generating(_)) => passage_symbol(&app.grid, index, cell),
        None => "  ".to_owned(),
    };

    Span::styled(symbol, style)
}

/// Background color of a cell.
///
/// Endpoints turn red when the latest search could not connect them.
const fn background(app: &App, cell: &Cell) -> Color {
    if cell.is_endpoint() && matches!(app.mode, Mode::Unreachable) {
        Color::Red
    } else if cell.is_start() {
        Color::Cyan
    } else if cell.is_goal() {
        Color::Magenta
    } else if cell.is_wall() {
        Color::Green
    } else {
        match cell.visit_status() {
            VisitStatus::Unvisited => Color::Reset,
            VisitStatus::Open => Color::Yellow,
            VisitStatus::Closed => Color::Blue,
        }
    }
}

/// Box-drawing glyphs tracing the passages carved so far through a cell.
fn passage_symbol(grid: &Grid, index: usize, cell: &Cell) -> String {
    if cell.in_maze() {
        let directions = cell.open_directions();
        let tail = if directions.contains(Direction::Right) {
            line::HORIZONTAL
        } else {
            " "
        };
        return [junction(directions), tail].concat();
    }

    if cell.is_wall() {
        return "  ".to_owned();
    }

    // Cleared cells between two carved cells continue the passage through them.
    let carved_towards = |direction: Direction| {
        grid.offset(index, direction.opposite(), 1)
            .and_then(|from| grid.cell_at(from).ok())
            .is_some_and(|from| from.open_directions().contains(direction))
    };

    if carved_towards(Direction::Right) {
        line::HORIZONTAL.repeat(2)
    } else if carved_towards(Direction::Down) {
        [line::VERTICAL, " "].concat()
    } else {
        "  ".to_owned()
    }
}

/// Glyph joining the passages carved out of a cell.
const fn junction(directions: Directions) -> &'static str {
    match (
        directions.contains(Direction::Up),
        directions.contains(Direction::Down),
        directions.contains(Direction::Left),
        directions.contains(Direction::Right),
    ) {
        (false, false, false, false) => ROUTE,
        (true, false, false, false) => "\u{2575}",
        (false, true, false, false) => "\u{2577}",
        (false, false, true, false) => "\u{2574}",
        (false, false, false, true) => "\u{2576}",
        (true, true, false, false) => line::VERTICAL,
        (false, false, true, true) => line::HORIZONTAL,
        (true, false, false, true) => line::BOTTOM_LEFT,
        (true, false, true, false) => line::BOTTOM_RIGHT,
        (false, true, false, true) => line::TOP_LEFT,
        (false, true, true, false) => line::TOP_RIGHT,
        (true, true, false, true) => line::VERTICAL_RIGHT,
        (true, true, true, false) => line::VERTICAL_LEFT,
        (true, false, true, true) => line::HORIZONTAL_UP,
        (false, true, true, true) => line::HORIZONTAL_DOWN,
        (true, true, true, true) => line::CROSS,
    }
}

/// One-line description of what the application is doing.
fn status(app: &App) -> String {
    match &app.mode {
        Mode::Editing => format!(
            "editing {}x{} grid, {} walls",
            app.grid.width(),
            app.grid.height(),
            app.grid.wall_count()
        ),
        Mode::Generating(generator) => format!(
            "carving maze: {} passages, branch depth {} ({:?})",
            generator.carved(),
            generator.stack().len(),
            generator.progress()
        ),
        Mode::Searching(finder) => format!(
            "searching: step {}, {} open cells",
            finder.steps(),
            finder.open_set().len()
        ),
        Mode::Following { path, agent, .. } if agent.is_finished() => {
            format!("arrived: route of {} cells", path.len())
        }
        Mode::Following { path, agent, .. } => format!(
            "following route of {} cells: {:.0}% done, one frame every {} ms",
            path.len(),
            agent.progress() * 100.,
            app.timer.delay().as_millis()
        ),
        Mode::Unreachable => "no route between start and goal".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    use super::*;
    use crate::config::Config;

    /// Creates a small test app for UI testing.
    fn create_test_app(width: u16, height: u16) -> App {
        App::new(Config {
            width,
            height,
            seed: Some(3),
            ..Config::default()
        })
        .expect("test app should build")
    }

    /// Creates a test terminal with known dimensions for UI testing.
    fn create_test_terminal() -> Terminal<TestBackend> {
        let backend = TestBackend::new(80, 24);
        Terminal::new(backend).expect("failed to create test terminal")
    }

    /// Draws the app once and returns the rendered buffer.
    fn render(app: &mut App) -> Buffer {
        let mut terminal = create_test_terminal();
        let result = terminal.draw(|frame| {
            draw(app, frame).expect("drawing should succeed in test");
        });

        assert!(result.is_ok(), "drawing should succeed");
        terminal.backend().buffer().clone()
    }

    /// Concatenates the symbols of a buffer row.
    fn row_text(buffer: &Buffer, row: u16) -> String {
        (0..buffer.area.width)
            .filter_map(|col| buffer.cell((col, row)))
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[test]
    fn test_draw_centers_grid() {
        let mut app = create_test_app(10, 5);
        let _ = render(&mut app);

        assert_eq!(app.grid_area.width, 20);
        assert_eq!(app.grid_area.height, 5);
        assert_eq!(app.grid_area.x, 30);
    }

    #[test]
    fn test_draw_colors_cells() {
        let mut app = create_test_app(10, 5);
        app.paint(3, true).expect("index is valid");
        let buffer = render(&mut app);
        let area = app.grid_area;

        let start = buffer.cell((area.x, area.y)).expect("start is drawn");
        let wall = buffer.cell((area.x + 6, area.y)).expect("wall is drawn");
        let goal = buffer
            .cell((area.right() - 1, area.bottom() - 1))
            .expect("goal is drawn");

        assert_eq!(start.bg, Color::Cyan);
        assert_eq!(wall.bg, Color::Green);
        assert_eq!(goal.bg, Color::Magenta);
    }

    #[test]
    fn test_draw_status_bar() {
        let mut app = create_test_app(10, 5);
        let buffer = render(&mut app);

        assert!(row_text(&buffer, 21).contains("q quit"));
        assert!(row_text(&buffer, 22).contains("editing 10x5 grid, 0 walls"));
    }

    #[test]
    fn test_draw_search_progress() {
        let mut app = create_test_app(6, 4);
        app.begin_search();
        app.advance();
        app.advance();
        let buffer = render(&mut app);

        assert!(row_text(&buffer, 22).contains("searching: step 2"));
        assert!(buffer
            .content()
            .iter()
            .any(|cell| cell.bg == Color::Blue));
    }

    #[test]
    fn test_draw_unreachable_endpoints() {
        let mut app = create_test_app(3, 3);
        app.paint(5, true).expect("index is valid");
        app.paint(7, true).expect("index is valid");
        app.begin_search();
        while app.is_animating() {
            app.advance();
        }
        let buffer = render(&mut app);
        let area = app.grid_area;

        let start = buffer.cell((area.x, area.y)).expect("start is drawn");
        assert_eq!(start.bg, Color::Red);
        assert!(row_text(&buffer, 22).contains("no route"));
    }

    #[test]
    fn test_draw_following_route() {
        let mut app = create_test_app(5, 1);
        app.begin_search();
        while matches!(app.mode, Mode::Searching(_)) {
            app.advance();
        }
        let buffer = render(&mut app);
        let area = app.grid_area;

        assert!(matches!(app.mode, Mode::Following { .. }));
        assert_eq!(
            buffer.cell((area.x + 4, area.y)).expect("route is drawn").symbol(),
            ROUTE
        );
        assert_eq!(
            buffer.cell((area.x, area.y)).expect("agent is drawn").symbol(),
            "("
        );
    }

    #[test]
    fn test_draw_maze_passages() {
        let mut app = create_test_app(9, 7);
        app.begin_maze();
        for _ in 0..10 {
            app.advance();
        }
        let buffer = render(&mut app);

        assert!(row_text(&buffer, 22).contains("carving maze"));
        assert!(buffer
            .content()
            .iter()
            .any(|cell| [line::HORIZONTAL, line::VERTICAL, line::TOP_LEFT, line::BOTTOM_RIGHT]
                .contains(&cell.symbol())));
    }

    #[test]
    fn test_draw_tiny_terminal() {
        let mut app = create_test_app(60, 40);
        let mut terminal = Terminal::new(TestBackend::new(20, 6)).expect("terminal should build");

        let result = terminal.draw(|frame| {
            draw(&mut app, frame).expect("drawing should succeed in test");
        });

        assert!(result.is_ok());
        assert!(app.grid_area.width <= 20);
    }

    #[test]
    fn test_cell_under() {
        let mut app = create_test_app(10, 5);
        let _ = render(&mut app);
        let area = app.grid_area;

        assert_eq!(cell_under(&app, area.x, area.y), Some(0));
        assert_eq!(cell_under(&app, area.x + 3, area.y + 1), Some(11));
        assert_eq!(cell_under(&app, area.right() - 1, area.bottom() - 1), Some(49));
        assert_eq!(cell_under(&app, area.x - 1, area.y), None);
        assert_eq!(cell_under(&app, area.x, area.bottom()), None);
    }

    #[test]
    fn test_agent_center() {
        let grid = Grid::new(4, 4).expect("grid should build");
        let center = agent_center(&grid, DVec2::new(31., 61.));

        assert_eq!(center, DVec2::new(45., 75.));
        assert_eq!(grid.cell_at_point(center), Some(9));
    }

    #[test]
    fn test_junction_glyphs() {
        let mut directions = Directions::empty();
        assert_eq!(junction(directions), ROUTE);

        directions.insert(Direction::Down);
        directions.insert(Direction::Right);
        assert_eq!(junction(directions), line::TOP_LEFT);

        directions.insert(Direction::Up);
        directions.insert(Direction::Left);
        assert_eq!(junction(directions), line::CROSS);
    }
}
