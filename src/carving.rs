//! Randomized depth-first maze carving.
//!
//! The carver works on a coarse lattice made of every second row and column, counted from the goal.
//! Lattice cells are connected by clearing the wall cell between them, which yields a perfect maze:
//! every open cell is reachable from the goal and the open cells form a tree.

use log::{debug, info, trace};
use rand::{seq::SliceRandom as _, Rng};

use crate::{
    grid::{Direction, Grid},
    stepping::{Progress, Stepwise},
};

/// Working state of a maze carving run.
///
/// The carver owns its random source so that a seeded source reproduces the same maze.
#[derive(Debug, Clone)]
pub struct MazeGenerator<R> {
    /// This field holds the cells on the current carving branch, the top being the cell carved
    /// from next. A cell is popped once none of its lattice neighbors is left to carve into, and
    /// the run is over when the stack is empty.
    stack: Vec<usize>,
    /// This field holds the source of the direction shuffles. It is used once per step to decide
    /// the order in which the four directions are tried.
    rng: R,
    /// This field counts the passages carved so far.
    carved: usize,
    /// This field holds the state reported by the latest step. Once it is no longer
    /// [`Progress::Running`], further steps leave the grid untouched and report it again.
    progress: Progress,
}

impl<R: Rng> MazeGenerator<R> {
    /// Starts a new carving run, walling off the whole grid but the endpoints.
    pub fn new(grid: &mut Grid, rng: R) -> Self {
        grid.reset_maze_state();

        let goal = grid.goal();
        if let Some(cell) = grid.cell_mut(goal) {
            cell.in_maze = true;
            cell.set_wall(false);
        }

        debug!("starting maze generation from cell {goal}");

        Self {
            stack: vec![goal],
            rng,
            carved: 0,
            progress: Progress::Running,
        }
    }

    /// Cells on the current carving branch, bottom first.
    #[must_use]
    pub fn stack(&self) -> &[usize] {
        &self.stack
    }

    /// Number of passages carved so far.
    #[must_use]
    pub const fn carved(&self) -> usize {
        self.carved
    }

    /// Carves from `current` towards the first free lattice cell in a shuffled direction.
    ///
    /// Returns whether a passage was carved.
    fn carve_from(&mut self, grid: &mut Grid, current: usize) -> bool {
        let mut directions = Direction::ALL;
        directions.shuffle(&mut self.rng);

        for direction in directions {
            let (Some(wall), Some(next)) = (
                grid.offset(current, direction, 1),
                grid.offset(current, direction, 2),
            ) else {
                continue;
            };
            let Ok(candidate) = grid.cell_at(next) else {
                continue;
            };
            if candidate.in_maze() {
                continue;
            }

            if let Some(cell) = grid.cell_mut(current) {
                cell.open_directions.insert(direction);
                cell.in_maze = true;
            }
            if let Some(cell) = grid.cell_mut(wall) {
                cell.set_wall(false);
            }
            if let Some(cell) = grid.cell_mut(next) {
                cell.open_directions.insert(direction.opposite());
                cell.in_maze = true;
                cell.set_wall(false);
            }

            self.carved += 1;
            trace!("carved {direction:?} from cell {current} to cell {next}");

            // The start is a dead end, the carver never branches out of it.
            if next != grid.start() {
                self.stack.push(next);
            }
            return true;
        }

        false
    }

    /// Opens the start's neighbor when the start sits off the lattice on both axes.
    fn finish(&mut self, grid: &mut Grid) {
        if grid.width() % 2 == 0 && grid.height() % 2 == 0 {
            if let Some(cell) = grid.cell_mut(1) {
                cell.set_wall(false);
            }
        }

        info!("maze generation carved {} passages", self.carved);
        self.progress = Progress::Finished;
    }
}

impl<R: Rng> Stepwise for MazeGenerator<R> {
    fn step(&mut self, grid: &mut Grid) -> Progress {
        if self.progress.is_done() {
            return self.progress;
        }

        if let Some(&current) = self.stack.last() {
            if !self.carve_from(grid, current) {
                let _ = self.stack.pop();
            }
        }

        if self.stack.is_empty() {
            self.finish(grid);
        }

        self.progress
    }

    fn abort(&mut self) {
        if !self.progress.is_done() {
            debug!("maze generation aborted after {} passages", self.carved);
            self.progress = Progress::Aborted;
        }
    }

    fn progress(&self) -> Progress {
        self.progress
    }
}

/// Carves a complete maze into the grid.
pub fn generate_maze<R: Rng>(grid: &mut Grid, rng: R) {
    let _ = MazeGenerator::new(grid, rng).run(grid);
}
