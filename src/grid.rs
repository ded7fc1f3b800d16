//! Grid and cell model.
//!
//! This module contains the cell grid the rest of the crate operates on. It owns every cell, their
//! wall state, the scratch fields used by the search and the maze carver, and the adjacency rules
//! shared by both algorithms. Renderers only ever read from it.

use glam::DVec2;
use log::debug;
use thiserror::Error;

/// Default side length of a cell in world units.
///
/// World coordinates are what the path follower moves through; a renderer scales them to whatever
/// surface it draws on.
pub const DEFAULT_CELL_SIZE: u16 = 30;

/// Offset added to every cell position in world units.
pub const MARGIN: f64 = 1.;

/// Errors raised by grid construction and cell lookup.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// The grid was requested with a zero width, height or cell size.
    #[error("invalid grid dimensions {width}x{height} with cell size {cell_size}")]
    InvalidDimensions {
        /// Requested number of columns.
        width: u16,
        /// Requested number of rows.
        height: u16,
        /// Requested cell side length.
        cell_size: u16,
    },
    /// A cell index outside of the grid was used.
    #[error("cell index {index} out of bounds for a grid of {len} cells")]
    IndexOutOfBounds {
        /// Offending index.
        index: usize,
        /// Number of cells in the grid.
        len: usize,
    },
}

/// Search progress of a single cell.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum VisitStatus {
    /// The search has not reached the cell yet.
    #[default]
    Unvisited,
    /// The cell sits in the open set.
    Open,
    /// The cell has been expanded.
    Closed,
}

/// Orthogonal direction on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards row zero.
    Up,
    /// Towards the last row.
    Down,
    /// Towards column zero.
    Left,
    /// Towards the last column.
    Right,
}

impl Direction {
    /// Every direction, in the order the maze carver shuffles from.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Returns the direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Row and column deltas of a single step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }

    /// Bit used to store the direction inside [`Directions`].
    const fn bit(self) -> u8 {
        match self {
            Self::Up => 0b0001,
            Self::Down => 0b0010,
            Self::Left => 0b0100,
            Self::Right => 0b1000,
        }
    }
}

/// Set of directions in which a maze cell has a carved passage.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Directions(u8);

impl Directions {
    /// Returns an empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Checks whether the set holds the given direction.
    #[must_use]
    pub const fn contains(self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    /// Adds a direction to the set.
    pub fn insert(&mut self, direction: Direction) {
        self.0 |= direction.bit();
    }

    /// Checks whether no passage has been carved.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of directions in the set.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }
}

/// Fixed role of an endpoint cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    /// The search origin.
    Start,
    /// The search target.
    Goal,
    /// A one cell grid, where the origin is also the target.
    Both,
}

/// A single grid position with its wall state and algorithm scratch data.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Row of the cell.
    row: u16,
    /// Column of the cell.
    col: u16,
    /// World coordinates of the cell's top left corner plus the margin.
    position: DVec2,
    /// Whether the cell blocks movement.
    wall: bool,
    /// Endpoint role, if any.
    endpoint: Option<Endpoint>,
    /// Search status, reset on every search.
    pub(crate) status: VisitStatus,
    /// Cost of the best known route from the start.
    pub(crate) cost_so_far: f64,
    /// Estimated remaining cost to the goal.
    pub(crate) heuristic: f64,
    /// Sum of the known cost and the estimate.
    pub(crate) total_estimate: f64,
    /// Index of the cell the best known route came from.
    pub(crate) predecessor: Option<usize>,
    /// Whether the maze carver has reached the cell.
    pub(crate) in_maze: bool,
    /// Passages carved out of the cell.
    pub(crate) open_directions: Directions,
}

impl Cell {
    /// Builds an open cell at the given coordinates.
    fn new(row: u16, col: u16, cell_size: u16) -> Self {
        let size = f64::from(cell_size);
        Self {
            row,
            col,
            position: DVec2::new(
                f64::from(col).mul_add(size, MARGIN),
                f64::from(row).mul_add(size, MARGIN),
            ),
            wall: false,
            endpoint: None,
            status: VisitStatus::Unvisited,
            cost_so_far: f64::INFINITY,
            heuristic: 0.,
            total_estimate: f64::INFINITY,
            predecessor: None,
            in_maze: false,
            open_directions: Directions::empty(),
        }
    }

    /// Row of the cell.
    #[must_use]
    pub const fn row(&self) -> u16 {
        self.row
    }

    /// Column of the cell.
    #[must_use]
    pub const fn col(&self) -> u16 {
        self.col
    }

    /// World position of the cell.
    #[must_use]
    pub const fn position(&self) -> DVec2 {
        self.position
    }

    /// Whether the cell blocks movement.
    #[must_use]
    pub const fn is_wall(&self) -> bool {
        self.wall
    }

    /// Whether the cell is the search origin.
    #[must_use]
    pub const fn is_start(&self) -> bool {
        matches!(self.endpoint, Some(Endpoint::Start | Endpoint::Both))
    }

    /// Whether the cell is the search target.
    #[must_use]
    pub const fn is_goal(&self) -> bool {
        matches!(self.endpoint, Some(Endpoint::Goal | Endpoint::Both))
    }

    /// Whether the cell is either endpoint.
    #[must_use]
    pub const fn is_endpoint(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Search status of the cell during or after the last search.
    #[must_use]
    pub const fn visit_status(&self) -> VisitStatus {
        self.status
    }

    /// Best known cost from the start, infinite when unreached.
    #[must_use]
    pub const fn cost_so_far(&self) -> f64 {
        self.cost_so_far
    }

    /// Heuristic estimate of the remaining distance to the goal.
    #[must_use]
    pub const fn heuristic(&self) -> f64 {
        self.heuristic
    }

    /// Known cost plus heuristic estimate.
    #[must_use]
    pub const fn total_estimate(&self) -> f64 {
        self.total_estimate
    }

    /// Index of the cell the best known route arrives from.
    #[must_use]
    pub const fn predecessor(&self) -> Option<usize> {
        self.predecessor
    }

    /// Whether the maze carver has reached the cell.
    #[must_use]
    pub const fn in_maze(&self) -> bool {
        self.in_maze
    }

    /// Passages carved out of the cell by the maze carver.
    #[must_use]
    pub const fn open_directions(&self) -> Directions {
        self.open_directions
    }

    /// Sets the wall flag unless the cell is an endpoint.
    pub(crate) fn set_wall(&mut self, wall: bool) {
        if !self.is_endpoint() {
            self.wall = wall;
        }
    }

    /// Clears the search scratch fields.
    fn reset_search(&mut self) {
        self.status = VisitStatus::Unvisited;
        self.cost_so_far = f64::INFINITY;
        self.heuristic = 0.;
        self.total_estimate = f64::INFINITY;
        self.predecessor = None;
    }

    /// Walls the cell off and clears the maze scratch fields.
    fn reset_maze(&mut self) {
        self.set_wall(true);
        self.in_maze = false;
        self.open_directions = Directions::empty();
    }
}

/// Rectangular grid of cells stored in row-major order.
///
/// The first cell is always the start and the last cell is always the goal. Neither can become a
/// wall.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    /// Number of columns.
    width: u16,
    /// Number of rows.
    height: u16,
    /// Side length of a cell in world units.
    cell_size: u16,
    /// Cells indexed by `row * width + col`.
    cells: Vec<Cell>,
}

impl Grid {
    /// Builds an open grid using [`DEFAULT_CELL_SIZE`].
    ///
    /// # Errors
    ///
    /// [`LayoutError::InvalidDimensions`] if either dimension is zero.
    pub fn new(width: u16, height: u16) -> Result<Self, LayoutError> {
        Self::with_cell_size(width, height, DEFAULT_CELL_SIZE)
    }

    /// Builds an open grid with the given cell size.
    ///
    /// Cells are allocated in row-major order and cell `0` becomes the start while the last cell
    /// becomes the goal.
    ///
    /// # Errors
    ///
    /// [`LayoutError::InvalidDimensions`] if either dimension or the cell size is zero.
    pub fn with_cell_size(width: u16, height: u16, cell_size: u16) -> Result<Self, LayoutError> {
        if width == 0 || height == 0 || cell_size == 0 {
            return Err(LayoutError::InvalidDimensions {
                width,
                height,
                cell_size,
            });
        }

        let mut cells = Vec::with_capacity(usize::from(width) * usize::from(height));
        for row in 0..height {
            for col in 0..width {
                cells.push(Cell::new(row, col, cell_size));
            }
        }

        let last = cells.len() - 1;
        if last == 0 {
            if let Some(cell) = cells.first_mut() {
                cell.endpoint = Some(Endpoint::Both);
            }
        } else {
            if let Some(cell) = cells.first_mut() {
                cell.endpoint = Some(Endpoint::Start);
            }
            if let Some(cell) = cells.last_mut() {
                cell.endpoint = Some(Endpoint::Goal);
            }
        }

        debug!("created {width}x{height} grid with cell size {cell_size}");

        Ok(Self {
            width,
            height,
            cell_size,
            cells,
        })
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Side length of a cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> u16 {
        self.cell_size
    }

    /// Number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`, a grid holds at least one cell.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Index of the start cell.
    #[must_use]
    pub const fn start(&self) -> usize {
        0
    }

    /// Index of the goal cell.
    #[must_use]
    pub fn goal(&self) -> usize {
        self.cells.len() - 1
    }

    /// Every cell, in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Read-only view of a cell.
    ///
    /// # Errors
    ///
    /// [`LayoutError::IndexOutOfBounds`] if the index lies outside of the grid.
    pub fn cell_at(&self, index: usize) -> Result<&Cell, LayoutError> {
        self.cells.get(index).ok_or(LayoutError::IndexOutOfBounds {
            index,
            len: self.cells.len(),
        })
    }

    /// Mutable access to a cell for the algorithms in this crate.
    pub(crate) fn cell_mut(&mut self, index: usize) -> Option<&mut Cell> {
        self.cells.get_mut(index)
    }

    /// Index of the cell at the given row and column, if it exists.
    #[must_use]
    pub fn index_of(&self, row: u16, col: u16) -> Option<usize> {
        (row < self.height && col < self.width)
            .then(|| usize::from(row) * usize::from(self.width) + usize::from(col))
    }

    /// Row and column of the cell at the given index, if it exists.
    #[must_use]
    pub fn coords_of(&self, index: usize) -> Option<(u16, u16)> {
        self.cells.get(index).map(|cell| (cell.row, cell.col))
    }

    /// Index of the cell reached by moving `steps` cells in `direction` from `index`.
    ///
    /// Moves are done on rows and columns, so leaving the grid on any side yields `None` rather than
    /// wrapping around to another row.
    #[must_use]
    pub fn offset(&self, index: usize, direction: Direction, steps: u16) -> Option<usize> {
        let (row, col) = self.coords_of(index)?;
        let (row_delta, col_delta) = direction.delta();
        let row = i32::from(row) + row_delta * i32::from(steps);
        let col = i32::from(col) + col_delta * i32::from(steps);
        self.index_of(u16::try_from(row).ok()?, u16::try_from(col).ok()?)
    }

    /// Open orthogonal neighbors of a cell.
    ///
    /// Neighbors are listed up, right, down, left, skipping anything outside of the grid or walled.
    /// An index outside of the grid has no neighbors.
    #[must_use]
    pub fn neighbors(&self, index: usize) -> Vec<usize> {
        [
            Direction::Up,
            Direction::Right,
            Direction::Down,
            Direction::Left,
        ]
        .into_iter()
        .filter_map(|direction| self.offset(index, direction, 1))
        .filter(|&neighbor| {
            self.cells
                .get(neighbor)
                .is_some_and(|cell| !cell.is_wall())
        })
        .collect()
    }

    /// Turns a cell into a wall or clears it.
    ///
    /// Requests targeting the start or the goal are ignored so that neither endpoint can be walled
    /// off.
    ///
    /// # Errors
    ///
    /// [`LayoutError::IndexOutOfBounds`] if the index lies outside of the grid.
    pub fn toggle_wall(&mut self, index: usize, make_wall: bool) -> Result<(), LayoutError> {
        let len = self.cells.len();
        let cell = self
            .cells
            .get_mut(index)
            .ok_or(LayoutError::IndexOutOfBounds { index, len })?;
        cell.set_wall(make_wall);

        Ok(())
    }

    /// Clears every wall.
    pub fn clear_walls(&mut self) {
        for cell in &mut self.cells {
            cell.set_wall(false);
        }
    }

    /// Number of walled cells.
    #[must_use]
    pub fn wall_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_wall()).count()
    }

    /// Clears the search scratch data of every cell.
    pub fn reset_search_state(&mut self) {
        for cell in &mut self.cells {
            cell.reset_search();
        }
    }

    /// Walls off every cell but the endpoints and clears the maze scratch data.
    pub fn reset_maze_state(&mut self) {
        for cell in &mut self.cells {
            cell.reset_maze();
        }
    }

    /// Index of the cell whose square contains the given world point.
    ///
    /// A cell covers the square of side [`Grid::cell_size`] whose corner sits one margin above and
    /// to the left of its position.
    #[must_use]
    pub fn cell_at_point(&self, point: DVec2) -> Option<usize> {
        let size = f64::from(self.cell_size);
        let col = u16::try_from(floor_index(point.x / size)?).ok()?;
        let row = u16::try_from(floor_index(point.y / size)?).ok()?;
        self.index_of(row, col)
    }

    /// Straight-line distance between two cells, measured in cells.
    #[must_use]
    pub fn grid_distance(&self, from: usize, to: usize) -> f64 {
        match (self.coords_of(from), self.coords_of(to)) {
            (Some((from_row, from_col)), Some((to_row, to_col))) => {
                let rows = f64::from(from_row) - f64::from(to_row);
                let cols = f64::from(from_col) - f64::from(to_col);
                rows.hypot(cols)
            }
            _ => f64::INFINITY,
        }
    }
}

/// Floors a non-negative coordinate into an integer cell offset.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "The value is checked to be a finite non-negative integer within range."
)]
fn floor_index(value: f64) -> Option<u32> {
    let floored = value.floor();
    (floored.is_finite() && floored >= 0. && floored <= f64::from(u32::MAX))
        .then_some(floored as u32)
}
