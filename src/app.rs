//! Core application state and logic for the pathfinding visualizer.

use std::io;

use color_eyre::eyre::{ensure, Result};
use log::info;
use rand::{rngs::StdRng, Rng as _, SeedableRng as _};
use ratatui::{layout::Rect, DefaultTerminal};

use crate::{
    animation::StepTimer,
    carving::MazeGenerator,
    config::{self, Config},
    events,
    follower::{self, Agent},
    grid::{Direction, Grid, LayoutError},
    path::Path,
    pathfinding::{self, PathFinder},
    stepping::{Progress, Stepwise},
    ui,
};

/// What the application is currently doing with the grid.
#[derive(Debug)]
pub(crate) enum Mode {
    /// The user paints walls; no algorithm runs.
    Editing,
    /// A maze is being carved into the grid.
    Generating(MazeGenerator<StdRng>),
    /// A search is looking for the goal.
    Searching(PathFinder),
    /// An agent travels along the route the search found.
    Following {
        /// Route from start to goal.
        path: Path,
        /// The travelling agent.
        agent: Agent,
        /// Cells the agent has passed through, in order.
        trail: Vec<usize>,
    },
    /// The latest search could not reach the goal.
    Unreachable,
}

/// Application state container for the pathfinding visualizer.
///
/// This structure owns the grid and whichever algorithm is currently animating over it. The UI
/// reads from it between steps and input events write to it.
#[derive(Debug)]
pub struct App {
    /// This field indicates whether the application should exit. It starts `false` and is set to
    /// `true` when the user quits.
    pub(crate) exit: bool,
    /// This field holds the options the application was started with. It is used to pick the
    /// delay of each animation and the steering limits of the agent.
    pub(crate) config: Config,
    /// This field holds the grid every algorithm runs over. Walls painted by the user and the
    /// scratch data of the running algorithm both live in it.
    pub(crate) grid: Grid,
    /// This field holds the index of the cell selected with the keyboard. It always points inside
    /// the grid and follows the mouse pointer when painting.
    pub(crate) cursor: usize,
    /// This field holds the current activity. At most one algorithm owns the grid at a time, and
    /// editing is refused while one does.
    pub(crate) mode: Mode,
    /// This field holds the pacing of the running animation. It is re-armed with the matching
    /// delay whenever a new algorithm starts.
    pub(crate) timer: StepTimer,
    /// This field holds the terminal area the grid was drawn into during the last redraw. It is
    /// used to map mouse events back to cells.
    pub(crate) grid_area: Rect,
    /// This field holds the source of the per-maze seeds. It is seeded from the configuration when
    /// a seed was given, so that the sequence of mazes is reproducible.
    rng: StdRng,
}

impl App {
    /// Creates the application state with an empty grid.
    ///
    /// # Errors
    ///
    /// - [`LayoutError::InvalidDimensions`] if the configured grid is empty
    /// - A steering limit that is not finite and positive
    pub fn new(config: Config) -> Result<Self> {
        ensure!(
            [config.max_speed, config.max_acceleration, config.lookahead]
                .into_iter()
                .all(config::is_positive_finite),
            "steering limits must be finite and positive"
        );
        let grid = Grid::with_cell_size(config.width, config.height, config.cell_size)?;
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        Ok(Self {
            exit: false,
            timer: StepTimer::new(config.search_delay()),
            config,
            cursor: grid.start(),
            grid,
            mode: Mode::Editing,
            grid_area: Rect::default(),
            rng,
        })
    }

    /// Runs the main loop of the application.
    ///
    /// This function redraws the grid, handles user input and advances the running animation. The
    /// loop continues until the user quits.
    ///
    /// # Errors
    ///
    /// - [`std::io::Error`]
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        while !self.exit {
            let _ = terminal.try_draw(|frame| {
                ui::draw(self, frame).map_err(|err| io::Error::new(io::ErrorKind::Other, err))
            })?;
            events::handle_events(self)?;
        }

        Ok(())
    }

    /// The grid every algorithm runs over.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Whether an algorithm currently owns the grid.
    pub(crate) const fn is_busy(&self) -> bool {
        matches!(self.mode, Mode::Generating(_) | Mode::Searching(_))
    }

    /// Whether something is waiting for its next animation step.
    pub(crate) fn is_animating(&self) -> bool {
        match &self.mode {
            Mode::Generating(_) | Mode::Searching(_) => true,
            Mode::Following { agent, .. } => !agent.is_finished(),
            Mode::Editing | Mode::Unreachable => false,
        }
    }

    /// Moves the keyboard cursor one cell, staying on the grid.
    pub(crate) fn move_cursor(&mut self, direction: Direction) {
        if let Some(index) = self.grid.offset(self.cursor, direction, 1) {
            self.cursor = index;
        }
    }

    /// Sets the wall state of a cell, unless an algorithm owns the grid.
    ///
    /// Editing invalidates the previous search, so its traces and route are dropped.
    pub(crate) fn paint(&mut self, index: usize, wall: bool) -> Result<(), LayoutError> {
        if self.is_busy() {
            return Ok(());
        }

        self.grid.toggle_wall(index, wall)?;
        self.back_to_editing();

        Ok(())
    }

    /// Flips the wall state of the cell under the cursor.
    pub(crate) fn flip_at_cursor(&mut self) -> Result<(), LayoutError> {
        let wall = self.grid.cell_at(self.cursor)?.is_wall();
        self.paint(self.cursor, !wall)
    }

    /// Removes every wall, unless an algorithm owns the grid.
    pub(crate) fn clear_walls(&mut self) {
        if self.is_busy() {
            return;
        }

        self.grid.clear_walls();
        self.back_to_editing();
    }

    /// Drops any search results and returns to editing.
    ///
    /// The search colors are wiped even when already editing, as an aborted run leaves them behind.
    fn back_to_editing(&mut self) {
        self.grid.reset_search_state();
        self.mode = Mode::Editing;
    }

    /// Starts an animated search, unless an algorithm already owns the grid.
    pub(crate) fn begin_search(&mut self) {
        if self.is_busy() {
            return;
        }

        info!("beginning search");
        self.mode = Mode::Searching(PathFinder::new(&mut self.grid));
        self.timer.rearm(self.config.search_delay());
    }

    /// Starts an animated maze generation, unless an algorithm already owns the grid.
    pub(crate) fn begin_maze(&mut self) {
        if self.is_busy() {
            return;
        }

        let seed = self.rng.gen();
        info!("beginning maze generation with seed {seed}");
        self.grid.reset_search_state();
        self.mode = Mode::Generating(MazeGenerator::new(
            &mut self.grid,
            StdRng::seed_from_u64(seed),
        ));
        self.timer.rearm(self.config.maze_delay());
    }

    /// Stops whatever is running and returns to editing.
    ///
    /// Scratch data left behind by an interrupted algorithm stays visible until the next edit or
    /// run wipes it.
    pub(crate) fn abort(&mut self) {
        match &mut self.mode {
            Mode::Generating(generator) => generator.abort(),
            Mode::Searching(finder) => finder.abort(),
            Mode::Following { .. } | Mode::Editing | Mode::Unreachable => {}
        }
        self.mode = Mode::Editing;
    }

    /// Aborts whatever is running and leaves the main loop.
    pub(crate) fn quit(&mut self) {
        self.abort();
        self.exit = true;
    }

    /// Advances the running animation if its next step is due.
    pub(crate) fn tick(&mut self) {
        if self.is_animating() && self.timer.ready() {
            self.advance();
        }
    }

    /// Advances the running animation by exactly one step.
    pub(crate) fn advance(&mut self) {
        let next = match &mut self.mode {
            Mode::Editing | Mode::Unreachable => None,
            Mode::Generating(generator) => match generator.step(&mut self.grid) {
                Progress::Running => None,
                Progress::Finished | Progress::Unreachable | Progress::Aborted => {
                    Some(Mode::Editing)
                }
            },
            Mode::Searching(finder) => match finder.step(&mut self.grid) {
                Progress::Running => None,
                Progress::Finished => Some(Self::follow(&self.grid, &self.config)),
                Progress::Unreachable => Some(Mode::Unreachable),
                Progress::Aborted => Some(Mode::Editing),
            },
            Mode::Following { path, agent, trail } => {
                let _ = follower::advance(agent, path);
                let center = ui::agent_center(&self.grid, agent.position());
                if let Some(index) = self.grid.cell_at_point(center) {
                    if trail.last() != Some(&index) {
                        trail.push(index);
                    }
                }
                None
            }
        };

        if let Some(mode) = next {
            if matches!(mode, Mode::Following { .. }) {
                self.timer.rearm(self.config.frame_delay());
            }
            self.mode = mode;
        }
    }

    /// Builds the follow mode for the route the finished search found.
    fn follow(grid: &Grid, config: &Config) -> Mode {
        let Some(path) = pathfinding::reconstruct_path(grid) else {
            return Mode::Unreachable;
        };

        info!("following a path of {} cells", path.len());
        let agent = Agent::for_path(
            &path,
            config.max_speed,
            config.max_acceleration,
            config.lookahead,
        );

        Mode::Following {
            path,
            agent,
            trail: vec![grid.start()],
        }
    }
}
