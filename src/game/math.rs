use std::f64::consts::PI;

pub const TWO_PI: f64 = PI * 2.0;

/// Wraps an angle into [0, 2π).
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle - TWO_PI * (angle / TWO_PI).floor();
    if wrapped >= TWO_PI {
        0.0
    } else {
        wrapped
    }
}

/// Shortest signed rotation from `from` to `to`, in (-π, π].
pub fn shortest_angle_delta(from: f64, to: f64) -> f64 {
    let delta = normalize_angle(to - from);
    if delta > PI {
        delta - TWO_PI
    } else {
        delta
    }
}

/// Rotates `current` toward `wanted` by at most `max_rotation` radians.
pub fn rotate_toward(current: f64, wanted: f64, max_rotation: f64) -> f64 {
    let delta = shortest_angle_delta(current, wanted);
    if delta.abs() <= max_rotation {
        normalize_angle(wanted)
    } else {
        normalize_angle(current + max_rotation * delta.signum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_angle_wraps_negative_and_large_values() {
        assert!((normalize_angle(-PI / 2.0) - 1.5 * PI).abs() < 1e-12);
        assert!((normalize_angle(5.0 * PI) - PI).abs() < 1e-12);
        assert_eq!(normalize_angle(0.0), 0.0);
    }

    #[test]
    fn delta_picks_the_short_way_round() {
        let delta = shortest_angle_delta(0.1, TWO_PI - 0.1);
        assert!((delta + 0.2).abs() < 1e-12);
        let delta = shortest_angle_delta(TWO_PI - 0.1, 0.1);
        assert!((delta - 0.2).abs() < 1e-12);
    }

    #[test]
    fn delta_of_half_turn_is_positive_pi() {
        assert!((shortest_angle_delta(0.0, PI) - PI).abs() < 1e-12);
    }

    #[test]
    fn rotate_toward_is_bounded() {
        let next = rotate_toward(0.0, 1.0, 0.25);
        assert!((next - 0.25).abs() < 1e-12);
        let next = rotate_toward(0.9, 1.0, 0.25);
        assert!((next - 1.0).abs() < 1e-12);
        let next = rotate_toward(0.1, TWO_PI - 0.5, 0.2);
        assert!((next - (TWO_PI - 0.1)).abs() < 1e-12);
    }
}
