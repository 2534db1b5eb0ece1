//! A* path search over the playable-area grid.

use std::{cmp::Ordering, collections::BinaryHeap};

use whispers_core::CellCoord;

use crate::grid::PlayableGrid;

/// Computes a shortest 4-connected path from `start` to `goal`.
///
/// Every step costs 1 and the Euclidean distance to the goal guides the
/// search. The returned path runs from `start` to `goal` inclusive and is
/// `[start]` when both coincide. An empty vector means no path exists,
/// including when either endpoint lies outside the grid or on a blocked cell.
///
/// Nodes with equal `f` leave the open set in insertion order.
#[must_use]
pub fn find_path(start: CellCoord, goal: CellCoord, grid: &PlayableGrid) -> Vec<CellCoord> {
    if !grid.is_walkable(start) || !grid.is_walkable(goal) {
        return Vec::new();
    }

    if start == goal {
        return vec![start];
    }

    let (Some(start_index), Some(_)) = (grid.index(start), grid.index(goal)) else {
        return Vec::new();
    };

    let cell_count = grid.cell_count();
    let mut best_cost = vec![u32::MAX; cell_count];
    let mut came_from: Vec<Option<CellCoord>> = vec![None; cell_count];
    let mut open = BinaryHeap::new();
    let mut sequence = 0_u64;

    best_cost[start_index] = 0;
    open.push(OpenNode {
        estimate: start.euclidean_distance(goal),
        cost: 0,
        sequence,
        cell: start,
    });

    while let Some(node) = open.pop() {
        if node.cell == goal {
            return reconstruct(goal, &came_from, grid);
        }

        let Some(index) = grid.index(node.cell) else {
            continue;
        };

        if node.cost > best_cost[index] {
            continue;
        }

        let next_cost = node.cost.saturating_add(1);
        for neighbor in grid.walkable_neighbors(node.cell) {
            let Some(neighbor_index) = grid.index(neighbor) else {
                continue;
            };

            if next_cost >= best_cost[neighbor_index] {
                continue;
            }

            best_cost[neighbor_index] = next_cost;
            came_from[neighbor_index] = Some(node.cell);
            sequence += 1;
            open.push(OpenNode {
                estimate: next_cost as f32 + neighbor.euclidean_distance(goal),
                cost: next_cost,
                sequence,
                cell: neighbor,
            });
        }
    }

    Vec::new()
}

fn reconstruct(
    goal: CellCoord,
    came_from: &[Option<CellCoord>],
    grid: &PlayableGrid,
) -> Vec<CellCoord> {
    let mut path = vec![goal];
    let mut current = goal;

    while let Some(previous) = grid
        .index(current)
        .and_then(|index| came_from.get(index).copied().flatten())
    {
        path.push(previous);
        current = previous;
    }

    path.reverse();
    path
}

#[derive(Clone, Copy, Debug)]
struct OpenNode {
    estimate: f32,
    cost: u32,
    sequence: u64,
    cell: CellCoord,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    // `BinaryHeap` is a max-heap: the smallest estimate and then the oldest
    // sequence number must compare greatest.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .total_cmp(&self.estimate)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}
