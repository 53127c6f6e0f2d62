use super::types::{Circle, Point};

const PARALLEL_EPSILON: f64 = 1e-4;

pub fn distance_squared(a: Point, b: Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

pub fn distance_squared_u16(ax: u16, ay: u16, bx: u16, by: u16) -> i32 {
    let dx = ax as i32 - bx as i32;
    let dy = ay as i32 - by as i32;
    dx * dx + dy * dy
}

/// Squared distance from `p` to the closest point of segment `v`-`w`.
pub fn distance_squared_to_segment(v: Point, w: Point, p: Point) -> f64 {
    let l2 = distance_squared(v, w);
    if l2 == 0.0 {
        return distance_squared(p, w);
    }
    let t = ((p.x - v.x) * (w.x - v.x) + (p.y - v.y) * (w.y - v.y)) / l2;
    let t = t.clamp(0.0, 1.0);
    distance_squared(
        p,
        Point {
            x: v.x + t * (w.x - v.x),
            y: v.y + t * (w.y - v.y),
        },
    )
}

/// Segment `p0`-`p1` against segment `p2`-`p3`. Near-parallel pairs never intersect.
pub fn segments_intersect(p0: Point, p1: Point, p2: Point, p3: Point) -> bool {
    let s1_x = p1.x - p0.x;
    let s1_y = p1.y - p0.y;
    let s2_x = p3.x - p2.x;
    let s2_y = p3.y - p2.y;

    let d = -s2_x * s1_y + s1_x * s2_y;
    if d.abs() <= PARALLEL_EPSILON {
        return false;
    }

    let s = (-s1_y * (p0.x - p2.x) + s1_x * (p0.y - p2.y)) / d;
    if !(0.0..=1.0).contains(&s) {
        return false;
    }
    let t = (s2_x * (p0.y - p2.y) - s2_y * (p0.x - p2.x)) / d;
    (0.0..=1.0).contains(&t)
}

pub fn point_in_circle(center: Point, p: Point, r: f64) -> bool {
    distance_squared(center, p) <= r * r
}

pub fn circles_intersect(a: Circle, b: Circle) -> bool {
    let reach = a.r + b.r;
    distance_squared(a.center(), b.center()) <= reach * reach
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let v = p(0.0, 0.0);
        let w = p(10.0, 0.0);
        assert_eq!(distance_squared_to_segment(v, w, p(5.0, 3.0)), 9.0);
        assert_eq!(distance_squared_to_segment(v, w, p(-4.0, 3.0)), 25.0);
        assert_eq!(distance_squared_to_segment(v, w, p(13.0, 4.0)), 25.0);
    }

    #[test]
    fn zero_length_segment_measures_to_the_point() {
        let v = p(2.0, 7.0);
        assert_eq!(distance_squared_to_segment(v, v, p(5.0, 11.0)), 25.0);
    }

    #[test]
    fn crossing_segments_intersect() {
        assert!(segments_intersect(
            p(0.0, 0.0),
            p(10.0, 10.0),
            p(0.0, 10.0),
            p(10.0, 0.0)
        ));
        assert!(segments_intersect(
            p(10.0, 10.0),
            p(0.0, 0.0),
            p(10.0, 0.0),
            p(0.0, 10.0)
        ));
    }

    #[test]
    fn parallel_and_short_segments_do_not_intersect() {
        assert!(!segments_intersect(
            p(0.0, 0.0),
            p(10.0, 0.0),
            p(0.0, 1.0),
            p(10.0, 1.0)
        ));
        assert!(!segments_intersect(
            p(0.0, 0.0),
            p(4.0, 4.0),
            p(0.0, 10.0),
            p(10.0, 0.0)
        ));
    }

    #[test]
    fn touching_circles_intersect() {
        let a = Circle::new(0.0, 0.0, 3.0);
        let b = Circle::new(5.0, 0.0, 2.0);
        let c = Circle::new(5.1, 0.0, 2.0);
        assert!(circles_intersect(a, b));
        assert!(!circles_intersect(a, c));
    }

    #[test]
    fn integer_distance_handles_reversed_order() {
        assert_eq!(distance_squared_u16(3, 4, 0, 0), 25);
        assert_eq!(distance_squared_u16(0, 0, 3, 4), 25);
    }
}
