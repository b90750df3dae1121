//! Greedy one-step movement toward a destination cell.

use crate::grid::Position;

/// Candidate offsets, scanned row-major from (-1,-1) to (1,1).
const OFFSETS: [(i32, i32); 9] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 0),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Picks the neighbour (or the current cell) closest to `to` by Euclidean
/// distance. The first minimal candidate in scan order wins.
///
/// No obstacle awareness: on an open grid this reaches `to` in exactly
/// `from.chebyshev(to)` calls.
pub fn step(from: Position, to: Position) -> Position {
    if from == to {
        return to;
    }
    let mut best = from;
    let mut best_cost = f64::INFINITY;
    for (dx, dy) in OFFSETS {
        let candidate = from.offset(dx, dy);
        let cost = candidate.distance(to);
        if cost == 0.0 {
            return to;
        }
        if cost < best_cost {
            best_cost = cost;
            best = candidate;
        }
    }
    best
}
