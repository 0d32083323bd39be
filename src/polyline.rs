//! Turns a raw grid-aligned point chain into a clean polyline: collinear
//! interior points are dropped, then the path is anchored onto the live
//! start/goal coordinates without losing orthogonality.

use crate::geom::Point;

fn collinear(a: Point, b: Point, c: Point) -> bool {
    (b.x - a.x) * (c.y - b.y) == (b.y - a.y) * (c.x - b.x)
}

/// Repeatedly drop any point whose neighbours make it collinear.
pub fn eliminate_collinear(points: &mut Vec<Point>) {
    let mut i = 1;
    while i + 1 < points.len() {
        if collinear(points[i - 1], points[i], points[i + 1]) {
            points.remove(i);
        } else {
            i += 1;
        }
    }
}

/// Align the second/second-to-last point to the live endpoints' shared axis,
/// then overwrite the first/last point with the live endpoint coordinates.
pub fn anchor_endpoints(points: &mut [Point], start: Point, goal: Point) {
    let len = points.len();
    if len >= 2 {
        if points[1].x == points[0].x {
            points[1].x = start.x;
        } else if points[1].y == points[0].y {
            points[1].y = start.y;
        }
        let last = len - 1;
        if points[last - 1].x == points[last].x {
            points[last - 1].x = goal.x;
        } else if points[last - 1].y == points[last].y {
            points[last - 1].y = goal.y;
        }
    }
    if len >= 1 {
        points[0] = start;
        points[len - 1] = goal;
    }
}

/// Run both post-processing steps in order, as `route()` does per path.
///
/// A path that collapses to a single grid node (start and goal rounded to
/// the same cell) is widened back to two points first, so distinct live
/// endpoints are never silently merged into one.
pub fn finish(mut points: Vec<Point>, start: Point, goal: Point) -> Vec<Point> {
    eliminate_collinear(&mut points);
    if points.len() == 1 && start != goal {
        points.push(points[0]);
    }
    anchor_endpoints(&mut points, start, goal);
    points
}
