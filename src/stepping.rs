//! Resumable, step-driven execution of the grid algorithms.
//!
//! Both the search and the maze carver keep their whole working state in explicit structures so that
//! a caller can run them one outer-loop iteration at a time, redraw or poll input in between, and
//! resume exactly where they left off.

use crate::grid::Grid;

/// State of a step-driven algorithm after its latest step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// More steps remain.
    Running,
    /// The algorithm completed successfully.
    Finished,
    /// The search exhausted its open set without reaching the goal.
    Unreachable,
    /// The caller aborted the algorithm.
    Aborted,
}

impl Progress {
    /// Whether further steps would have no effect.
    #[must_use]
    pub const fn is_done(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// An algorithm over a [`Grid`] that can be suspended between steps.
pub trait Stepwise {
    /// Runs a single outer-loop iteration and reports where the algorithm stands.
    ///
    /// Once the algorithm is done, further calls leave the grid untouched and repeat the final
    /// state.
    fn step(&mut self, grid: &mut Grid) -> Progress;

    /// Stops the algorithm. Later steps report [`Progress::Aborted`] without touching the grid.
    fn abort(&mut self);

    /// State reported by the latest step.
    fn progress(&self) -> Progress;

    /// Steps the algorithm until it is done.
    fn run(&mut self, grid: &mut Grid) -> Progress {
        loop {
            let progress = self.step(grid);
            if progress.is_done() {
                return progress;
            }
        }
    }
}
