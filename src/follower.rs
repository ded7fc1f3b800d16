//! Follow-path steering.
//!
//! A small discrete-time integrator that moves an agent along a [`Path`] by seeking a point a fixed
//! fraction of the path ahead of its current progress.

use glam::DVec2;
use log::debug;

use crate::path::Path;

/// Steering limits of an agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steering {
    /// Largest distance covered in a single step.
    pub max_speed: f64,
    /// Largest change in velocity in a single step.
    pub max_acceleration: f64,
    /// Fraction of the path the agent looks ahead of its progress.
    pub path_offset: f64,
}

/// A point moving along a path.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    /// Current world position.
    position: DVec2,
    /// Current velocity, in world units per step.
    velocity: DVec2,
    /// Parameter of the furthest point of the path reached so far.
    progress: f64,
    /// Steering limits.
    steering: Steering,
}

impl Agent {
    /// Places a resting agent at the given position.
    #[must_use]
    pub const fn new(position: DVec2, steering: Steering) -> Self {
        Self {
            position,
            velocity: DVec2::ZERO,
            progress: 0.,
            steering,
        }
    }

    /// Places a resting agent at the start of a path.
    ///
    /// `lookahead` is measured in world units and converted into the fraction of the path the agent
    /// seeks ahead on every step.
    #[must_use]
    pub fn for_path(path: &Path, max_speed: f64, max_acceleration: f64, lookahead: f64) -> Self {
        let total = path.total_distance();
        let path_offset = if total > 0. { lookahead / total } else { 1. };

        Self::new(
            path.first(),
            Steering {
                max_speed,
                max_acceleration,
                path_offset,
            },
        )
    }

    /// Current world position.
    #[must_use]
    pub const fn position(&self) -> DVec2 {
        self.position
    }

    /// Current velocity.
    #[must_use]
    pub const fn velocity(&self) -> DVec2 {
        self.velocity
    }

    /// Parameter of the furthest point of the path reached so far.
    #[must_use]
    pub const fn progress(&self) -> f64 {
        self.progress
    }

    /// Steering limits.
    #[must_use]
    pub const fn steering(&self) -> Steering {
        self.steering
    }

    /// Whether the agent has reached the end of its path.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.progress >= 1.
    }
}

/// Moves the agent one step along the path and reports whether it has arrived.
pub fn advance(agent: &mut Agent, path: &Path) -> bool {
    if agent.is_finished() {
        return true;
    }

    let Steering {
        max_speed,
        max_acceleration,
        path_offset,
    } = agent.steering;

    if path.total_distance() <= 0. {
        arrive(agent, path);
        return true;
    }

    let window = path_offset.max(f64::EPSILON) * 2.;
    agent.progress = path
        .project(agent.position, agent.progress, agent.progress + window)
        .max(agent.progress);

    let target_param = (agent.progress + path_offset).min(1.);
    let target = path.position_at(target_param);

    if target_param >= 1. && agent.position.distance(target) <= max_speed {
        arrive(agent, path);
        return true;
    }

    let acceleration = (target - agent.position).normalize_or_zero() * max_acceleration;
    agent.position += agent.velocity;
    agent.velocity = (agent.velocity + acceleration).clamp_length_max(max_speed);

    agent.progress = path
        .project(agent.position, agent.progress, agent.progress + window)
        .max(agent.progress);

    agent.is_finished()
}

/// Snaps the agent onto the end of the path and stops it.
fn arrive(agent: &mut Agent, path: &Path) {
    agent.position = path.last();
    agent.velocity = DVec2::ZERO;
    agent.progress = 1.;
    debug!("agent arrived at {}", agent.position);
}
