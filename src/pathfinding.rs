//! A* search from the start cell to the goal cell.
//!
//! This module contains a resumable A* search over a [`Grid`] and the reconstruction of the route it
//! finds. Every step of the search is one iteration of the classic open set loop, so a caller can
//! redraw the grid between steps to animate the search.

use log::{debug, info, trace};

use crate::{
    grid::{Cell, Grid, VisitStatus},
    path::Path,
    stepping::{Progress, Stepwise},
};

/// Cost of moving between two orthogonal neighbors.
pub const STEP_COST: f64 = 1.;

/// Working state of an A* search.
///
/// The per-cell scratch data (costs, estimates, predecessors, visit status) lives in the grid, the
/// rest lives here. Together they are everything needed to resume the search after any step.
#[derive(Debug, Clone)]
pub struct PathFinder {
    /// This field holds the indices of the open cells in the order they were opened. The order
    /// matters: among cells with the same total estimate, the earliest one is expanded first.
    open: Vec<usize>,
    /// This field holds the cell expanded by the latest step, if any. It is used by renderers to
    /// highlight the search front.
    current: Option<usize>,
    /// This field counts the steps taken so far, including the one that reached the goal.
    steps: usize,
    /// This field holds the state reported by the latest step. Once it is no longer
    /// [`Progress::Running`], further steps leave the grid untouched and report it again.
    progress: Progress,
}

impl PathFinder {
    /// Starts a new search, wiping any previous search data from the grid.
    pub fn new(grid: &mut Grid) -> Self {
        grid.reset_search_state();

        let start = grid.start();
        let heuristic = grid.grid_distance(start, grid.goal());
        if let Some(cell) = grid.cell_mut(start) {
            cell.status = VisitStatus::Open;
            cell.cost_so_far = 0.;
            cell.heuristic = heuristic;
            cell.total_estimate = heuristic;
        }

        debug!("starting search from cell {start} to cell {}", grid.goal());

        Self {
            open: vec![start],
            current: None,
            steps: 0,
            progress: Progress::Running,
        }
    }

    /// Indices of the open cells, in the order they were opened.
    #[must_use]
    pub fn open_set(&self) -> &[usize] {
        &self.open
    }

    /// Cell expanded by the latest step.
    #[must_use]
    pub const fn current(&self) -> Option<usize> {
        self.current
    }

    /// Number of steps taken so far.
    #[must_use]
    pub const fn steps(&self) -> usize {
        self.steps
    }

    /// Picks the open cell with the lowest total estimate.
    ///
    /// The comparison is strict, so the first of several equally promising cells in insertion order
    /// wins. Search results depend on this, keep it stable.
    fn lowest(&self, grid: &Grid) -> Option<(usize, usize)> {
        let mut lowest_total = f64::INFINITY;
        let mut lowest = None;

        for (position, &index) in self.open.iter().enumerate() {
            let Ok(cell) = grid.cell_at(index) else {
                continue;
            };
            if cell.total_estimate() < lowest_total || lowest.is_none() {
                lowest_total = cell.total_estimate();
                lowest = Some((position, index));
            }
        }

        lowest
    }

    /// Opens or improves every reachable neighbor of `current`.
    fn relax_neighbors(&mut self, grid: &mut Grid, current: usize) {
        let Ok(cell) = grid.cell_at(current) else {
            return;
        };
        let cost = cell.cost_so_far() + STEP_COST;
        let goal = grid.goal();

        for neighbor in grid.neighbors(current) {
            let heuristic = grid.grid_distance(neighbor, goal);
            let Some(cell) = grid.cell_mut(neighbor) else {
                continue;
            };
            if cost >= cell.cost_so_far {
                continue;
            }

            cell.status = VisitStatus::Open;
            cell.cost_so_far = cost;
            cell.heuristic = heuristic;
            cell.total_estimate = cost + heuristic;
            cell.predecessor = Some(current);

            if !self.open.contains(&neighbor) {
                self.open.push(neighbor);
            }
        }
    }

    /// Moves a cell from the open set to the closed set.
    fn close(&mut self, grid: &mut Grid, position: usize, index: usize) {
        if let Some(cell) = grid.cell_mut(index) {
            cell.status = VisitStatus::Closed;
        }
        let _ = self.open.remove(position);
    }
}

impl Stepwise for PathFinder {
    fn step(&mut self, grid: &mut Grid) -> Progress {
        if self.progress.is_done() {
            return self.progress;
        }

        let Some((position, current)) = self.lowest(grid) else {
            info!("search exhausted after {} steps, goal unreachable", self.steps);
            self.progress = Progress::Unreachable;
            return self.progress;
        };

        self.steps += 1;
        self.current = Some(current);
        trace!("step {}: expanding cell {current}", self.steps);

        if current == grid.goal() {
            self.close(grid, position, current);
            info!("search reached the goal after {} steps", self.steps);
            self.progress = Progress::Finished;
            return self.progress;
        }

        self.relax_neighbors(grid, current);
        self.close(grid, position, current);

        self.progress
    }

    fn abort(&mut self) {
        if !self.progress.is_done() {
            debug!("search aborted after {} steps", self.steps);
            self.progress = Progress::Aborted;
        }
    }

    fn progress(&self) -> Progress {
        self.progress
    }
}

/// Runs a complete search and returns the route from start to goal, if there is one.
pub fn find_path(grid: &mut Grid) -> Option<Path> {
    let mut finder = PathFinder::new(grid);
    match finder.run(grid) {
        Progress::Finished => reconstruct_path(grid),
        Progress::Running | Progress::Unreachable | Progress::Aborted => None,
    }
}

/// Rebuilds the route found by the latest search.
///
/// Predecessor links are followed back from the goal. The route exists only if that walk ends at
/// the start; a goal the search never reached has no predecessor and yields `None`.
#[must_use]
pub fn reconstruct_path(grid: &Grid) -> Option<Path> {
    let start = grid.start();
    let mut current = grid.goal();
    let mut indices = vec![current];

    while current != start {
        current = grid.cell_at(current).ok()?.predecessor()?;
        indices.push(current);
        if indices.len() > grid.len() {
            return None;
        }
    }

    let points = indices
        .iter()
        .rev()
        .map(|&index| grid.cell_at(index).map(Cell::position))
        .collect::<Result<Vec<_>, _>>()
        .ok()?;

    Path::from_points(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a grid with the given cells walled.
    fn walled_grid(width: u16, height: u16, walls: &[usize]) -> Grid {
        let mut grid = Grid::new(width, height).expect("grid should build");
        for &wall in walls {
            grid.toggle_wall(wall, true).expect("wall index is valid");
        }
        grid
    }

    #[test]
    fn test_open_grid_path_is_manhattan() {
        for (width, height) in [(2, 2), (3, 3), (5, 3), (1, 6), (8, 8)] {
            let mut grid = walled_grid(width, height, &[]);
            let path = find_path(&mut grid).expect("open grid has a path");

            let manhattan = usize::from(width - 1) + usize::from(height - 1);
            assert_eq!(path.len(), manhattan + 1);
            assert!(path
                .distances()
                .windows(2)
                .all(|pair| pair.first() < pair.last()));
            assert_eq!(path.first(), grid.cell_at(0).expect("start").position());
            assert_eq!(
                path.last(),
                grid.cell_at(grid.goal()).expect("goal").position()
            );
        }
    }

    #[test]
    fn test_three_by_three_scenario() {
        let mut grid = walled_grid(3, 3, &[]);
        let mut finder = PathFinder::new(&mut grid);

        assert_eq!(finder.run(&mut grid), Progress::Finished);
        assert!(finder.open_set().is_empty());
        assert_eq!(finder.current(), Some(8));

        let goal = grid.cell_at(8).expect("goal exists");
        assert!((goal.cost_so_far() - 4.).abs() < f64::EPSILON);
        assert_eq!(goal.visit_status(), VisitStatus::Closed);

        let path = reconstruct_path(&grid).expect("goal was reached");
        assert_eq!(path.len(), 5);
        assert!((path.total_distance() - 120.).abs() < 1e-9);
    }

    #[test]
    fn test_first_found_tie_break() {
        let mut grid = walled_grid(3, 3, &[]);
        let mut finder = PathFinder::new(&mut grid);
        let mut expanded = Vec::new();

        while finder.step(&mut grid) == Progress::Running {
            expanded.extend(finder.current());
        }
        expanded.extend(finder.current());

        assert_eq!(expanded, vec![0, 1, 3, 4, 2, 6, 5, 7, 8]);

        let path = reconstruct_path(&grid).expect("goal was reached");
        let route: Vec<_> = path
            .points()
            .iter()
            .map(|&point| grid.cell_at_point(point).expect("point lies on the grid"))
            .collect();
        assert_eq!(route, vec![0, 1, 4, 5, 8]);
    }

    #[test]
    fn test_enclosed_goal_has_no_path() {
        let mut grid = walled_grid(4, 4, &[11, 14]);
        let mut finder = PathFinder::new(&mut grid);

        assert_eq!(finder.run(&mut grid), Progress::Unreachable);
        assert!(finder.open_set().is_empty());
        assert_eq!(reconstruct_path(&grid), None);
        assert_eq!(find_path(&mut grid), None);
    }

    #[test]
    fn test_two_by_two_walled_scenario() {
        let mut grid = walled_grid(2, 2, &[1, 2]);

        assert_eq!(find_path(&mut grid), None);
    }

    #[test]
    fn test_two_by_two_single_wall_routes_around() {
        let mut grid = walled_grid(2, 2, &[1]);
        let path = find_path(&mut grid).expect("route through cell 2 exists");

        assert_eq!(path.len(), 3);
    }

    #[test]
    fn test_start_is_goal() {
        let mut grid = walled_grid(1, 1, &[]);
        let path = find_path(&mut grid).expect("single cell grid is trivially solved");

        assert_eq!(path.len(), 1);
        assert!(path.total_distance().abs() < f64::EPSILON);
    }

    #[test]
    fn test_reconstruct_without_search() {
        let grid = walled_grid(3, 3, &[]);

        assert_eq!(reconstruct_path(&grid), None);
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let mut grid = walled_grid(6, 5, &[1, 7, 13, 20, 21, 22, 16, 10]);

        let first = find_path(&mut grid);
        let first_cells = grid.cells().to_vec();
        let second = find_path(&mut grid);

        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(first_cells, grid.cells());
    }

    #[test]
    fn test_abort_then_rerun() {
        let mut grid = walled_grid(6, 5, &[8, 14, 15]);
        let expected = find_path(&mut grid);

        let mut finder = PathFinder::new(&mut grid);
        let _ = finder.step(&mut grid);
        let _ = finder.step(&mut grid);
        finder.abort();
        let snapshot = grid.cells().to_vec();

        assert_eq!(finder.step(&mut grid), Progress::Aborted);
        assert_eq!(snapshot, grid.cells());
        assert_eq!(find_path(&mut grid), expected);
    }

    #[test]
    fn test_path_avoids_walls() {
        let mut grid = walled_grid(5, 5, &[1, 6, 11, 16, 8, 13, 18, 23]);
        let path = find_path(&mut grid).expect("a winding route exists");

        for point in path.points() {
            let index = grid.cell_at_point(*point).expect("point lies on the grid");
            assert!(!grid.cell_at(index).expect("cell exists").is_wall());
        }
    }
}
