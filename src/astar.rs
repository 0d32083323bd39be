//! The per-route A* search: base distance, turn penalty, obstacle penalty,
//! proximity/group bias, and the crossing-vs-bus-sharing term, all folded
//! into one additive cost that the search minimizes exactly.

use crate::geom::Point;
use crate::grid::Grid;
use crate::heap::ScoreHeap;
use crate::options::RouterOptions;

/// Search one route's grid-aligned path against the current grid state.
///
/// `group_id` is this route's group; `obstacle_cost` is the router's current
/// scalar obstacle penalty. Returns the chain of grid node indices from start
/// to the node the search ended on (the goal node if reached, otherwise the
/// last node popped off the open heap) - never empty, since the start node
/// is always included.
///
/// Also updates the grid's persistent `group_count`/`groups` bookkeeping
/// along the returned chain, which is how later routes in the same `route()`
/// pass see this route's footprint.
pub fn search(
    grid: &mut Grid,
    start: Point,
    goal: Point,
    group_id: usize,
    opts: &RouterOptions,
    obstacle_cost: f64,
) -> Vec<u32> {
    grid.reset_search();

    let start_idx = grid.nearest(start);
    let goal_idx = grid.nearest(goal);
    let goal_point = point_of(grid, goal_idx);

    let node_count = (grid.columns * grid.rows).max(0) as usize;
    let mut f_scores = vec![f64::INFINITY; node_count];

    let start_point = point_of(grid, start_idx);
    let start_f = (opts.distance())(start_point, goal_point);
    {
        let n = grid.node_mut(start_idx);
        n.g = 0.0;
        n.f = start_f;
        n.visited = true;
    }
    f_scores[start_idx as usize] = start_f;

    let mut heap: ScoreHeap<u32> = ScoreHeap::new();
    heap.push(start_idx, &|idx: u32| f_scores[idx as usize]);

    let mut last_popped = start_idx;

    while !heap.is_empty() {
        let current = {
            let score = |idx: u32| f_scores[idx as usize];
            heap.pop(&score)
        };
        last_popped = current;
        if current == goal_idx {
            break;
        }
        grid.node_mut(current).closed = true;

        let current_point = point_of(grid, current);
        let current_g = grid.node(current).g;
        let current_parent = grid.node(current).parent;
        let parent_point = current_parent.map(|p| point_of(grid, p));

        for n_idx in grid.neighbours(current, opts.diagonal) {
            if grid.node(n_idx).closed {
                continue;
            }
            let n_point = point_of(grid, n_idx);

            let mut g = current_g + (opts.distance())(current_point, n_point);

            if let Some(pp) = parent_point {
                let cross = (current_point.x - pp.x) * (n_point.y - current_point.y)
                    - (current_point.y - pp.y) * (n_point.x - current_point.x);
                if cross != 0.0 {
                    g += opts.turn_cost;
                }
            }

            if grid.node(n_idx).obstacle {
                g += obstacle_cost;
            }

            for m_idx in grid.neighbours(n_idx, opts.diagonal) {
                let m = grid.node(m_idx);
                if !opts.bus || !m.groups.contains(group_id) {
                    g += opts.proximity_cost * m.group_count as f64;
                }
                if m.obstacle {
                    g += opts.proximity_cost;
                }
            }

            let n_in_group = grid.node(n_idx).groups.contains(group_id);
            if opts.bus && n_in_group {
                g -= opts.bus_gain;
            } else {
                g += opts.cross_cost * grid.node(n_idx).group_count as f64;
            }

            let n_visited = grid.node(n_idx).visited;
            let improves = !n_visited || g < grid.node(n_idx).g;
            if improves {
                let f = g + (opts.distance())(n_point, goal_point);
                {
                    let n = grid.node_mut(n_idx);
                    n.parent = Some(current);
                    n.g = g;
                    n.f = f;
                }
                f_scores[n_idx as usize] = f;
                if n_visited {
                    let score = |idx: u32| f_scores[idx as usize];
                    heap.rescore(n_idx, &score);
                } else {
                    grid.node_mut(n_idx).visited = true;
                    let score = |idx: u32| f_scores[idx as usize];
                    heap.push(n_idx, &score);
                }
            }
        }
    }

    let chain = walk_parents(grid, last_popped);
    mark_group(grid, &chain, group_id);
    log::trace!(
        "route group {} searched {} node chain (goal reached: {})",
        group_id,
        chain.len(),
        last_popped == goal_idx
    );
    chain
}

fn point_of(grid: &Grid, idx: u32) -> Point {
    let n = grid.node(idx);
    Point::new(n.x, n.y)
}

fn walk_parents(grid: &Grid, from: u32) -> Vec<u32> {
    let mut chain = vec![from];
    let mut cur = from;
    while let Some(p) = grid.node(cur).parent {
        chain.push(p);
        cur = p;
    }
    chain.reverse();
    chain
}

fn mark_group(grid: &mut Grid, chain: &[u32], group_id: usize) {
    for &idx in chain {
        let n = grid.node_mut(idx);
        if n.groups.insert(group_id) {
            n.group_count += 1;
        }
    }
}
