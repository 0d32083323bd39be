//! Group ("bus") resolution: DFS closure over the "shares an endpoint"
//! relation between routes, plus the compact per-node set of groups that have
//! crossed it during the current routing pass.

use crate::geom::Point;
use rustc_hash::FxHashSet;

/// Inline bitmask for the common case of few concurrently-tracked groups,
/// falling back to a hash set once a group id exceeds the mask width. This is
/// the representation the spec's design notes call for: "a compact bitmask
/// when the group count is small, or a small hash set otherwise".
#[derive(Clone, Debug, Default)]
pub struct GroupSet {
    mask: u64,
    overflow: Option<FxHashSet<usize>>,
}

const MASK_BITS: usize = 64;

impl GroupSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, group: usize) -> bool {
        if group < MASK_BITS {
            (self.mask & (1u64 << group)) != 0
        } else {
            self.overflow
                .as_ref()
                .is_some_and(|s| s.contains(&group))
        }
    }

    /// Insert `group`, returning `true` if it was newly added.
    pub fn insert(&mut self, group: usize) -> bool {
        if group < MASK_BITS {
            let bit = 1u64 << group;
            let was_set = self.mask & bit != 0;
            self.mask |= bit;
            !was_set
        } else {
            self.overflow.get_or_insert_with(FxHashSet::default).insert(group)
        }
    }

    pub fn clear(&mut self) {
        self.mask = 0;
        self.overflow = None;
    }
}

/// A route's endpoints, as seen by the group resolver: two live points plus
/// whichever group id (if any) was assigned on a previous pass.
pub struct RouteEndpoints {
    pub start: Point,
    pub goal: Point,
    pub group_id: Option<usize>,
}

fn same_point(a: Point, b: Point) -> bool {
    a.x == b.x && a.y == b.y
}

fn shares_endpoint(a: &RouteEndpoints, b: &RouteEndpoints) -> bool {
    same_point(a.start, b.start)
        || same_point(a.start, b.goal)
        || same_point(a.goal, b.start)
        || same_point(a.goal, b.goal)
}

/// Assign `group_id` to every route lacking one.
///
/// Iterates routes in their current order; for each route without a group id,
/// stamps it with its own index and then DFS-propagates that id to every
/// later, still-unassigned route sharing an endpoint, recursing into each
/// newly tagged route. Restricting propagation to the suffix from `r` onward
/// is safe because every earlier route already carries an id by the time `r`
/// is reached.
pub fn assign_groups(routes: &mut [RouteEndpoints]) {
    for i in 0..routes.len() {
        if routes[i].group_id.is_some() {
            continue;
        }
        let gid = i;
        routes[i].group_id = Some(gid);
        propagate(routes, i, gid);
    }
}

fn propagate(routes: &mut [RouteEndpoints], from: usize, gid: usize) {
    let mut stack = vec![from];
    while let Some(cur) = stack.pop() {
        for j in (cur + 1)..routes.len() {
            if routes[j].group_id.is_some() {
                continue;
            }
            let linked = shares_endpoint(&routes[cur], &routes[j]);
            if linked {
                routes[j].group_id = Some(gid);
                stack.push(j);
            }
        }
    }
}
