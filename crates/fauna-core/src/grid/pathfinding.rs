//! A* pathfinding on the tile grid
//!
//! 4-neighborhood, unit step cost, Manhattan heuristic.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use super::GridPosition;

/// Node in the A* open set
#[derive(Debug, Clone, PartialEq, Eq)]
struct PathNode {
    cell: GridPosition,
    f_cost: i32,
    h_cost: i32,
}

impl Ord for PathNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap; ties go to the node nearer the goal,
        // then to the lower cell so expansion order never depends on hashing.
        other
            .f_cost
            .cmp(&self.f_cost)
            .then_with(|| other.h_cost.cmp(&self.h_cost))
            .then_with(|| other.cell.cmp(&self.cell))
    }
}

impl PartialOrd for PathNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find a shortest path from `start` to `goal`.
///
/// `passable` decides whether an intermediate cell can be entered. The goal
/// only needs `goal_ok`, so a path may end on an occupied tile. The returned
/// cells exclude `start`; an empty vec means unreachable (or already there).
pub fn find_path<P, G>(start: GridPosition, goal: GridPosition, passable: P, goal_ok: G) -> Vec<GridPosition>
where
    P: Fn(GridPosition) -> bool,
    G: Fn(GridPosition) -> bool,
{
    if start == goal || !goal_ok(goal) {
        return Vec::new();
    }

    let mut open_set = BinaryHeap::new();
    let mut came_from: HashMap<GridPosition, GridPosition> = HashMap::new();
    let mut g_scores: HashMap<GridPosition, i32> = HashMap::new();

    g_scores.insert(start, 0);
    let h = start.manhattan_distance(&goal);
    open_set.push(PathNode {
        cell: start,
        f_cost: h,
        h_cost: h,
    });

    while let Some(current) = open_set.pop() {
        if current.cell == goal {
            return reconstruct_path(&came_from, start, goal);
        }

        let current_g = g_scores.get(&current.cell).copied().unwrap_or(i32::MAX);
        // stale heap entry
        if current.f_cost - current.h_cost > current_g {
            continue;
        }

        for neighbor in current.cell.neighbors() {
            let enterable = if neighbor == goal {
                true
            } else {
                passable(neighbor)
            };
            if !enterable {
                continue;
            }

            let tentative_g = current_g + 1;
            let neighbor_g = g_scores.get(&neighbor).copied().unwrap_or(i32::MAX);

            if tentative_g < neighbor_g {
                came_from.insert(neighbor, current.cell);
                g_scores.insert(neighbor, tentative_g);

                let h_cost = neighbor.manhattan_distance(&goal);
                open_set.push(PathNode {
                    cell: neighbor,
                    f_cost: tentative_g + h_cost,
                    h_cost,
                });
            }
        }
    }

    Vec::new()
}

/// Walk `came_from` back from the goal; the start cell is left out.
fn reconstruct_path(
    came_from: &HashMap<GridPosition, GridPosition>,
    start: GridPosition,
    goal: GridPosition,
) -> Vec<GridPosition> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        if prev == start {
            break;
        }
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}
