//! Nearest-neighbour ordering of delivery stops.
//!
//! The planner builds a single-driver tour greedily: from the current
//! position it always steps to the closest unvisited stop. The result is an
//! approximation with no backtracking or local improvement, so it is not
//! guaranteed to be the shortest tour.

use geo::Coord;
use log::{debug, warn};

use crate::distance::haversine_km;

/// Anything with a fixed WGS84 position (`x = longitude`, `y = latitude`).
pub trait Located {
    /// Position used when measuring distances to this value.
    fn location(&self) -> Coord<f64>;
}

impl Located for Coord<f64> {
    fn location(&self) -> Coord<f64> {
        *self
    }
}

impl<T: Located + ?Sized> Located for &T {
    fn location(&self) -> Coord<f64> {
        (**self).location()
    }
}

/// Order `deliveries` by repeatedly visiting the nearest unvisited stop,
/// starting from `start`.
///
/// The output is a permutation of the input. When two candidates are
/// equally close, the one appearing first in `deliveries` wins, so identical
/// input always yields identical output. If no candidate can be chosen (for
/// example because every remaining distance is NaN) the stops planned so far
/// are returned.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use mealdrop_core::optimize_route;
///
/// let b = Coord { x: 0.0, y: 1.0 };
/// let c = Coord { x: 0.0, y: 3.0 };
/// let route = optimize_route(&[c, b], Coord { x: 0.0, y: 0.0 });
///
/// assert_eq!(route, vec![b, c]);
/// ```
#[must_use]
pub fn optimize_route<T>(deliveries: &[T], start: Coord<f64>) -> Vec<T>
where
    T: Located + Clone,
{
    let mut visited = vec![false; deliveries.len()];
    let mut ordered = Vec::with_capacity(deliveries.len());
    let mut current = start;

    for _ in 0..deliveries.len() {
        let Some(next) = nearest_unvisited(deliveries, &visited, current) else {
            warn!(
                "route planning stopped after {} of {} stops",
                ordered.len(),
                deliveries.len()
            );
            break;
        };
        if let (Some(flag), Some(stop)) = (visited.get_mut(next), deliveries.get(next)) {
            *flag = true;
            current = stop.location();
            ordered.push(stop.clone());
        }
    }

    debug!("planned route through {} stops", ordered.len());
    ordered
}

fn nearest_unvisited<T: Located>(
    deliveries: &[T],
    visited: &[bool],
    from: Coord<f64>,
) -> Option<usize> {
    let mut best = None;
    let mut best_distance = f64::MAX;
    for (index, (stop, seen)) in deliveries.iter().zip(visited).enumerate() {
        if *seen {
            continue;
        }
        let distance = haversine_km(from, stop.location());
        // Strict comparison keeps the earliest candidate on ties.
        if distance < best_distance {
            best_distance = distance;
            best = Some(index);
        }
    }
    best
}

/// Total length in kilometres of visiting `stops` in order from `start`.
///
/// The return leg to `start` is not included.
#[must_use]
pub fn route_distance_km<T: Located>(stops: &[T], start: Coord<f64>) -> f64 {
    stops
        .iter()
        .fold((0.0, start), |(total, from), stop| {
            let to = stop.location();
            (total + haversine_km(from, to), to)
        })
        .0
}
