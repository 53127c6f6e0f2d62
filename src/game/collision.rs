use super::config::WorldConfig;
use super::constants::{COLLISION_HEAD_LANDMARK, COLLISION_HEAD_PARTS};
use super::geometry::{distance_squared, distance_squared_to_segment, point_in_circle};
use super::types::{Circle, Point};

/// True once the head has reached the death radius.
pub fn outside_arena(head: Point, config: &WorldConfig) -> bool {
    let center = config.center();
    let death_radius = config.death_radius() as f64;
    distance_squared(head, Point::new(center, center)) >= death_radius * death_radius
}

/// Tests `probe` against a body drawn with parts of `body_part_radius`.
///
/// Long bodies are culled through landmark parts: the head span is only
/// examined when part 3 is near the probe, and each following window of
/// `tail_step` parts only when its middle part is.
pub fn body_intersects(
    parts: &[Point],
    body_part_radius: f64,
    probe: Circle,
    config: &WorldConfig,
) -> bool {
    let len = parts.len();
    if len < 2 {
        return parts
            .first()
            .is_some_and(|part| point_in_circle(probe.center(), *part, probe.r + body_part_radius));
    }

    let tail_step = config.tail_step();
    let half = (tail_step / 2).max(1);
    if len <= COLLISION_HEAD_PARTS + tail_step {
        return span_intersects(parts, 1, len, body_part_radius, probe, config);
    }

    let landmark_radius = config.sector_size as f64 / 2.0;
    let center = probe.center();
    if point_in_circle(center, parts[COLLISION_HEAD_LANDMARK], landmark_radius)
        && span_intersects(parts, 1, COLLISION_HEAD_PARTS + 1, body_part_radius, probe, config)
    {
        return true;
    }

    let mut landmark = COLLISION_HEAD_PARTS - 1 + half;
    while landmark - half < len {
        let start = landmark - half;
        let end = (landmark + half).min(len);
        if point_in_circle(center, parts[landmark.min(len - 1)], landmark_radius)
            && span_intersects(parts, start + 1, end, body_part_radius, probe, config)
        {
            return true;
        }
        landmark += tail_step;
    }
    false
}

/// Checks segments `parts[i - 1]..parts[i]` for `i` in `first..end`.
fn span_intersects(
    parts: &[Point],
    first: usize,
    end: usize,
    body_part_radius: f64,
    probe: Circle,
    config: &WorldConfig,
) -> bool {
    let center = probe.center();
    let near = config.move_step_distance as f64 * 2.0;
    let reach = probe.r + body_part_radius;
    for index in first.max(1)..end.min(parts.len()) {
        let current = parts[index];
        if !point_in_circle(center, current, near) {
            continue;
        }
        let previous = parts[index - 1];
        if distance_squared_to_segment(previous, current, center) <= reach * reach {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WorldConfig {
        WorldConfig::default()
    }

    /// A straight body along +x starting at `x0`, parts every 24px.
    fn line(x0: f64, len: usize) -> Vec<Point> {
        (0..len)
            .map(|index| Point::new(x0 + 24.0 * index as f64, 1000.0))
            .collect()
    }

    #[test]
    fn head_at_the_death_radius_is_outside() {
        let config = config();
        let center = config.center();
        let death = config.death_radius() as f64;
        assert!(outside_arena(Point::new(center + death, center), &config));
        assert!(!outside_arena(Point::new(center + death - 1.0, center), &config));
        assert!(outside_arena(Point::new(center, center - death - 5.0), &config));
    }

    #[test]
    fn short_body_is_checked_part_by_part() {
        let parts = line(1000.0, 10);
        let hit = Circle::new(1100.0, 1020.0, 14.5);
        let miss = Circle::new(1100.0, 1060.0, 14.5);
        assert!(body_intersects(&parts, 14.5, hit, &config()));
        assert!(!body_intersects(&parts, 14.5, miss, &config()));
    }

    #[test]
    fn long_body_is_found_through_landmarks() {
        let parts = line(1000.0, 120);
        for index in [2, 5, 19, 30, 64, 101, 119] {
            let part = parts[index];
            let probe = Circle::new(part.x + 5.0, part.y + 20.0, 14.5);
            assert!(
                body_intersects(&parts, 15.0, probe, &config()),
                "missed part {index}"
            );
        }
    }

    #[test]
    fn long_body_far_from_probe_misses() {
        let parts = line(1000.0, 120);
        let probe = Circle::new(2000.0, 1400.0, 14.5);
        assert!(!body_intersects(&parts, 15.0, probe, &config()));
    }

    #[test]
    fn tail_end_past_the_last_full_window_is_checked() {
        let parts = line(1000.0, 33);
        let tail = parts[32];
        let probe = Circle::new(tail.x + 10.0, tail.y, 14.5);
        assert!(body_intersects(&parts, 15.0, probe, &config()));
    }

    #[test]
    fn circle_between_parts_touches_the_segment() {
        let parts = vec![Point::new(1000.0, 1000.0), Point::new(1024.0, 1000.0)];
        let hit = Circle::new(1006.0, 1014.5, 5.0);
        assert!(body_intersects(&parts, 10.0, hit, &config()));
        let clear = Circle::new(1006.0, 1015.5, 5.0);
        assert!(!body_intersects(&parts, 10.0, clear, &config()));
    }

    #[test]
    fn single_part_body_uses_its_radius() {
        let parts = vec![Point::new(500.0, 500.0)];
        assert!(body_intersects(&parts, 15.0, Circle::new(525.0, 500.0, 14.5), &config()));
        assert!(!body_intersects(&parts, 15.0, Circle::new(535.0, 500.0, 14.5), &config()));
    }
}
