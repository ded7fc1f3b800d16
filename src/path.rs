//! Polyline paths produced by the search and consumed by the path follower.

use glam::DVec2;

/// An ordered sequence of world points with the cumulative distance travelled to reach each one.
///
/// Paths are parameterized by the fraction of the total distance, so parameter `0` is the first
/// point and parameter `1` is the last one.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// World points from start to goal.
    points: Vec<DVec2>,
    /// Cumulative distance at every point, starting at zero.
    distances: Vec<f64>,
}

impl Path {
    /// Builds a path through the given points, or `None` if there are none.
    #[must_use]
    pub fn from_points(points: Vec<DVec2>) -> Option<Self> {
        let first = *points.first()?;

        let mut distances = Vec::with_capacity(points.len());
        let mut travelled = 0.;
        let mut previous = first;
        for &point in &points {
            travelled += previous.distance(point);
            distances.push(travelled);
            previous = point;
        }

        Some(Self { points, distances })
    }

    /// World points from start to goal.
    #[must_use]
    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    /// Cumulative distance at every point.
    #[must_use]
    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`, a path holds at least one point.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Length of the whole path.
    #[must_use]
    pub fn total_distance(&self) -> f64 {
        self.distances.last().copied().unwrap_or_default()
    }

    /// First point of the path.
    #[must_use]
    pub fn first(&self) -> DVec2 {
        self.points.first().copied().unwrap_or_default()
    }

    /// Last point of the path.
    #[must_use]
    pub fn last(&self) -> DVec2 {
        self.points.last().copied().unwrap_or_default()
    }

    /// Point at the given parameter, clamped to the path.
    #[must_use]
    pub fn position_at(&self, param: f64) -> DVec2 {
        let total = self.total_distance();
        if total <= 0. {
            return self.first();
        }

        let target = param.clamp(0., 1.) * total;
        for (points, distances) in self.points.windows(2).zip(self.distances.windows(2)) {
            let ([from, to], [from_distance, to_distance]) = (points, distances) else {
                continue;
            };
            if *to_distance < target {
                continue;
            }

            let length = to_distance - from_distance;
            if length <= 0. {
                return *to;
            }
            return from.lerp(*to, (target - from_distance) / length);
        }

        self.last()
    }

    /// Parameter of the point closest to `position`.
    ///
    /// Only segments overlapping the parameter window `from..=to` are considered, which keeps the
    /// projection from jumping to a far part of the path that happens to pass close by. Ties go to
    /// the earliest segment.
    #[must_use]
    pub fn project(&self, position: DVec2, from: f64, to: f64) -> f64 {
        let total = self.total_distance();
        if total <= 0. {
            return 1.;
        }

        let mut best: Option<(f64, f64)> = None;
        for (points, distances) in self.points.windows(2).zip(self.distances.windows(2)) {
            let ([start, end], [start_distance, end_distance]) = (points, distances) else {
                continue;
            };
            if end_distance / total < from || start_distance / total > to {
                continue;
            }

            let segment = *end - *start;
            let length_squared = segment.length_squared();
            let along = if length_squared > 0. {
                ((position - *start).dot(segment) / length_squared).clamp(0., 1.)
            } else {
                0.
            };
            let closest = start.lerp(*end, along);
            let gap = closest.distance_squared(position);

            let closer = match best {
                Some((best_gap, _)) => gap < best_gap,
                None => true,
            };
            if closer {
                let travelled = start_distance.mul_add(1. - along, end_distance * along);
                best = Some((gap, travelled / total));
            }
        }

        best.map_or_else(|| from.clamp(0., 1.), |(_, param)| param)
    }
}
