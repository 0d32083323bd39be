//! Orthogonal/diagonal multi-net router for 2D diagrams.
//!
//! Given a set of rectangular obstacles and a collection of start-goal
//! routes, computes an obstacle-avoiding polyline for every route: straight
//! runs are preferred, crossing other routes is discouraged, and routes
//! sharing an endpoint can optionally share segments ("bus" mode). The
//! canonical caller is a schematic/node-graph renderer: component rectangles
//! are obstacles, connector endpoints are route start/goal points, and the
//! router hands back a polyline per route through a callback.
//!
//! The router performs no I/O and owns no global state; every `Router` is an
//! independent value.

mod astar;
mod error;
mod geom;
mod grid;
mod group;
mod heap;
mod options;
mod polyline;

pub use error::RouterError;
pub use geom::{diagonal_distance, manhattan, Point, Rect};
pub use options::{DistanceFn, RouterOptions};

use grid::Grid;
use group::{assign_groups, RouteEndpoints};

/// What a route's `on_change` callback receives alongside its path: the
/// group id the router assigned (or the caller previously supplied).
#[derive(Clone, Copy, Debug)]
pub struct RouteInfo {
    pub group_id: usize,
}

struct RouteEntry {
    start: Box<dyn Fn() -> Point>,
    goal: Box<dyn Fn() -> Point>,
    on_change: Box<dyn FnMut(&RouteInfo, &[Point])>,
    group_id: Option<usize>,
}

/// A handle identifying a route previously registered with [`Router::add_route`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteId(usize);

/// The router's public surface: register obstacles and routes, grow the
/// exploration area as geometry moves, and trigger a full reroute pass.
pub struct Router {
    options: RouterOptions,
    limits: Option<Rect>,
    obstacles: Vec<Rect>,
    routes: Vec<RouteEntry>,
    obstacle_cost: f64,
    grid: Option<Grid>,
    allocate: bool,
}

impl Router {
    /// Build a router over a grid with `grid_step` spacing, with every other
    /// option at its default. Fails if `grid_step` is not positive; every
    /// other knob is adjusted afterwards through [`Router::options_mut`],
    /// since those can never fail.
    pub fn new(grid_step: f64) -> Result<Self, RouterError> {
        let options = RouterOptions::new(grid_step)?;
        Ok(Self {
            options,
            limits: None,
            obstacles: Vec::new(),
            routes: Vec::new(),
            obstacle_cost: 0.0,
            grid: None,
            allocate: false,
        })
    }

    /// Current options, mutable between `route()` passes (`diagonal`, `bus`
    /// in particular are meant to be changed by the caller at will; toggling
    /// `diagonal` alone re-derives the matching distance function unless
    /// `set_distance` has pinned one explicitly).
    pub fn options(&self) -> &RouterOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut RouterOptions {
        &mut self.options
    }

    /// Register an obstacle rectangle, growing the exploration area and
    /// refreshing the obstacle-traversal cost.
    pub fn add_obstacle(&mut self, rect: Rect) {
        self.obstacles.push(rect);
        self.extend_limits(rect);
        self.recompute_obstacle_cost();
    }

    /// Register a route. `start`/`goal` are re-read on every `route()` pass,
    /// so a route follows its endpoints if the caller's closures reflect
    /// geometry that moves (a dragged component, say).
    pub fn add_route(
        &mut self,
        start: impl Fn() -> Point + 'static,
        goal: impl Fn() -> Point + 'static,
        on_change: impl FnMut(&RouteInfo, &[Point]) + 'static,
    ) -> RouteId {
        let start = Box::new(start);
        let goal = Box::new(goal);
        let (s, g) = (start(), goal());
        self.extend_limits(Rect::new(
            s.x.min(g.x),
            s.y.min(g.y),
            s.x.max(g.x),
            s.y.max(g.y),
        ));
        let id = RouteId(self.routes.len());
        self.routes.push(RouteEntry {
            start,
            goal,
            on_change: Box::new(on_change),
            group_id: None,
        });
        id
    }

    /// Enlarge the exploration rectangle so it keeps at least `margin`
    /// clearance around `rect` on every side. A no-op if `rect` already sits
    /// that far inside the current limits.
    pub fn extend_limits(&mut self, rect: Rect) {
        let margin = self.options.margin;
        let grid_step = self.options.grid_step;
        match self.limits {
            None => {
                self.limits = Some(Rect::new(
                    rect.left - grid_step,
                    rect.top - margin,
                    rect.right + margin,
                    rect.bottom + margin,
                ));
                self.allocate = true;
            }
            Some(current) => {
                if !current.contains_with_margin(rect, margin) {
                    let expanded = Rect::new(
                        rect.left - grid_step,
                        rect.top - margin,
                        rect.right + margin,
                        rect.bottom + margin,
                    );
                    self.limits = Some(current.union(expanded));
                    self.allocate = true;
                }
            }
        }
    }

    fn recompute_obstacle_cost(&mut self) {
        let Some(limits) = self.limits else {
            return;
        };
        let grid_step = self.options.grid_step;
        let (w, h) = (limits.width(), limits.height());
        self.obstacle_cost = w * h / grid_step + w + h;
    }

    /// Run a full reroute pass: grow/allocate the grid as needed, mark
    /// obstacles, assign group ids, sort routes by endpoint distance, and
    /// run A* for each route against the grid state left behind by earlier
    /// routes in this same pass. Every route's `on_change` fires exactly
    /// once, in sorted order.
    pub fn route(&mut self) {
        if self.routes.is_empty() {
            return;
        }
        let Some(limits) = self.limits else {
            return;
        };
        let grid_step = self.options.grid_step;

        match &mut self.grid {
            None => {
                self.grid = Some(Grid::init(limits, grid_step, &self.obstacles));
                log::debug!("grid allocated");
            }
            Some(grid) => {
                if self.allocate {
                    log::debug!("grid reallocated (limits grew)");
                }
                grid.reinit(limits, grid_step, &self.obstacles);
            }
        }
        self.allocate = false;

        let mut endpoints: Vec<RouteEndpoints> = self
            .routes
            .iter()
            .map(|r| RouteEndpoints {
                start: (r.start)(),
                goal: (r.goal)(),
                group_id: r.group_id,
            })
            .collect();
        assign_groups(&mut endpoints);
        for (entry, ep) in self.routes.iter_mut().zip(endpoints.iter()) {
            entry.group_id = ep.group_id;
        }

        let distance = self.options.distance();
        let mut order: Vec<usize> = (0..self.routes.len()).collect();
        order.sort_by(|&a, &b| {
            let da = distance(endpoints[a].start, endpoints[a].goal);
            let db = distance(endpoints[b].start, endpoints[b].goal);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        });

        let grid = self.grid.as_mut().expect("grid initialized above");
        let options = &self.options;
        let obstacle_cost = self.obstacle_cost;

        for idx in order {
            let start = endpoints[idx].start;
            let goal = endpoints[idx].goal;
            let group_id = self.routes[idx]
                .group_id
                .expect("group assignment runs before routing");

            let chain = astar::search(grid, start, goal, group_id, options, obstacle_cost);
            let raw_points: Vec<Point> = chain
                .iter()
                .map(|&i| {
                    let n = grid.node(i);
                    Point::new(n.x, n.y)
                })
                .collect();
            let path = polyline::finish(raw_points, start, goal);

            let info = RouteInfo { group_id };
            (self.routes[idx].on_change)(&info, &path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn router(grid_step: f64) -> Router {
        Router::new(grid_step).unwrap()
    }

    #[test]
    fn s1_straight_shot() {
        let mut r = router(10.0);
        let captured = Rc::new(RefCell::new(Vec::new()));
        let out = captured.clone();
        r.add_route(
            || Point::new(0.0, 0.0),
            || Point::new(50.0, 0.0),
            move |_info, path| *out.borrow_mut() = path.to_vec(),
        );
        r.route();
        assert_eq!(
            *captured.borrow(),
            vec![Point::new(0.0, 0.0), Point::new(50.0, 0.0)]
        );
    }

    #[test]
    fn s2_around_a_box() {
        let mut r = router(10.0);
        r.add_obstacle(Rect::new(20.0, -20.0, 40.0, 20.0));
        let captured = Rc::new(RefCell::new(Vec::new()));
        let out = captured.clone();
        r.add_route(
            || Point::new(0.0, 0.0),
            || Point::new(60.0, 0.0),
            move |_info, path| *out.borrow_mut() = path.to_vec(),
        );
        r.route();
        let path = captured.borrow();
        assert_eq!(path.first().copied(), Some(Point::new(0.0, 0.0)));
        assert_eq!(path.last().copied(), Some(Point::new(60.0, 0.0)));
        assert_eq!(
            path.len(),
            4,
            "expected a single detour around the box, got {:?}",
            *path
        );
    }

    #[test]
    fn s3_bus_sharing() {
        let mut r = router(10.0);
        r.options_mut().bus = true;
        let first = Rc::new(RefCell::new(Vec::new()));
        let second = Rc::new(RefCell::new(Vec::new()));
        let first_info = Rc::new(RefCell::new(None));
        let second_info = Rc::new(RefCell::new(None));

        let (f_out, f_info) = (first.clone(), first_info.clone());
        r.add_route(
            || Point::new(0.0, 0.0),
            || Point::new(100.0, 0.0),
            move |info, path| {
                *f_out.borrow_mut() = path.to_vec();
                *f_info.borrow_mut() = Some(*info);
            },
        );
        let (s_out, s_info) = (second.clone(), second_info.clone());
        r.add_route(
            || Point::new(0.0, 0.0),
            || Point::new(100.0, 50.0),
            move |info, path| {
                *s_out.borrow_mut() = path.to_vec();
                *s_info.borrow_mut() = Some(*info);
            },
        );
        r.route();

        assert_eq!(
            first_info.borrow().unwrap().group_id,
            second_info.borrow().unwrap().group_id
        );
        let a = first.borrow();
        let b = second.borrow();
        assert!(a.len() >= 2 && b.len() >= 2);
        assert_eq!(a[0], b[0]);
        assert_eq!(a[1], b[1]);
    }

    #[test]
    fn s5_moving_endpoint_reroutes() {
        let mut r = router(10.0);
        let goal = Rc::new(RefCell::new(Point::new(50.0, 0.0)));
        let captured = Rc::new(RefCell::new(Vec::new()));
        let (out, goal_read) = (captured.clone(), goal.clone());
        r.add_route(
            || Point::new(0.0, 0.0),
            move || *goal_read.borrow(),
            move |_info, path| *out.borrow_mut() = path.to_vec(),
        );
        r.route();
        assert_eq!(
            captured.borrow().last().copied(),
            Some(Point::new(50.0, 0.0))
        );

        *goal.borrow_mut() = Point::new(50.0, 80.0);
        r.route();
        let path = captured.borrow();
        assert_eq!(path.last().copied(), Some(Point::new(50.0, 80.0)));
        for w in path.windows(2) {
            let dx = (w[1].x - w[0].x).abs();
            let dy = (w[1].y - w[0].y).abs();
            assert!(dx < 1e-9 || dy < 1e-9, "segment not axis-aligned: {:?}", w);
        }
    }

    #[test]
    fn s6_diagonal_mode() {
        let mut r = router(10.0);
        r.options_mut().diagonal = true;
        let captured = Rc::new(RefCell::new(Vec::new()));
        let out = captured.clone();
        r.add_route(
            || Point::new(0.0, 0.0),
            || Point::new(50.0, 50.0),
            move |_info, path| *out.borrow_mut() = path.to_vec(),
        );
        r.route();
        assert_eq!(
            *captured.borrow(),
            vec![Point::new(0.0, 0.0), Point::new(50.0, 50.0)]
        );
    }

    #[test]
    fn extend_limits_is_idempotent_well_inside_margin() {
        let mut r = router(10.0);
        r.add_obstacle(Rect::new(0.0, 0.0, 10.0, 10.0));
        let before = r.limits;
        r.extend_limits(Rect::new(5.0, 5.0, 6.0, 6.0));
        assert_eq!(r.limits, before);
    }

    #[test]
    fn every_route_callback_fires_exactly_once() {
        let mut r = router(10.0);
        let count = Rc::new(RefCell::new(0));
        for i in 0..3 {
            let c = count.clone();
            r.add_route(
                move || Point::new(i as f64 * 20.0, 0.0),
                move || Point::new(i as f64 * 20.0 + 10.0, 0.0),
                move |_info, _path| *c.borrow_mut() += 1,
            );
        }
        r.route();
        assert_eq!(*count.borrow(), 3);
    }
}
