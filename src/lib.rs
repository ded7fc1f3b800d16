//! Grid pathfinding visualizer.
//!
//! The library models a rectangular grid of cells and three algorithms that run over it one step at
//! a time: [`carving::MazeGenerator`] carves a perfect maze, [`pathfinding::PathFinder`] searches
//! for a route from the start to the goal, and [`follower::advance`] steers an agent along the
//! route that was found. The binary animates all three in the terminal.

#![expect(
    clippy::cargo_common_metadata,
    reason = "Temporary allow during development."
)]

pub mod carving;
pub mod config;
pub mod follower;
pub mod grid;
pub mod path;
pub mod pathfinding;
pub mod stepping;

mod animation;
mod app;
mod events;
mod ui;

pub use app::App;
pub use config::Config;
